//! Declarative parameter schemas for tools.
//!
//! A tool declares its parameters once as a [`ToolSchema`]; the registry checks
//! the declaration at registration time and [`ToolSchema::validate`] enforces it
//! on every call, so tool bodies only ever see well-typed, defaulted arguments.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::ProtocolVersion;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("missing required argument '{0}'")]
    Missing(String),
    #[error("unknown argument '{0}'")]
    Unknown(String),
    #[error("argument '{field}' must be {expected}")]
    WrongType { field: String, expected: String },
    #[error("argument '{field}' {reason}")]
    Constraint { field: String, reason: String },
}

/// Primitive shape of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
    StringArray,
    /// Array whose items are strings or `null`; the array itself may be `null`.
    NullableStringArray,
    Enum(Vec<&'static str>),
}

fn as_whole_number(value: &Value) -> Option<Value> {
    if value.is_i64() || value.is_u64() {
        return Some(value.clone());
    }
    let f = value.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    if f >= 0.0 && f <= u64::MAX as f64 {
        Some(json!(f as u64))
    } else if f >= i64::MIN as f64 {
        Some(json!(f as i64))
    } else {
        None
    }
}

impl ParamKind {
    fn expected(&self) -> String {
        match self {
            ParamKind::String => "a string".to_string(),
            ParamKind::Number => "a number".to_string(),
            ParamKind::Integer => "an integer".to_string(),
            ParamKind::Boolean => "a boolean".to_string(),
            ParamKind::StringArray => "an array of strings".to_string(),
            ParamKind::NullableStringArray => "an array of strings or nulls".to_string(),
            ParamKind::Enum(allowed) => format!("one of {}", allowed.join(", ")),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_number(),
            ParamKind::Integer => as_whole_number(value).is_some(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ParamKind::NullableStringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(|i| i.is_string() || i.is_null())),
            ParamKind::Enum(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
        }
    }

    /// Canonical form of an accepted value: integral floats such as `5.0`
    /// become integers so downstream accessors see `5`.
    fn normalize(&self, value: &Value) -> Value {
        match self {
            ParamKind::Integer => as_whole_number(value).unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        }
    }

    fn json_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        match self {
            ParamKind::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamKind::Number => {
                schema.insert("type".into(), json!("number"));
            }
            ParamKind::Integer => {
                schema.insert("type".into(), json!("integer"));
            }
            ParamKind::Boolean => {
                schema.insert("type".into(), json!("boolean"));
            }
            ParamKind::StringArray => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), json!({"type": "string"}));
            }
            ParamKind::NullableStringArray => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), json!({"type": ["string", "null"]}));
            }
            ParamKind::Enum(allowed) => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(allowed));
            }
        }
        schema
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub min_length: Option<usize>,
    pub max_items: Option<usize>,
    pub minimum: Option<f64>,
}

impl ParamField {
    fn new(kind: ParamKind, description: &'static str) -> Self {
        Self {
            kind,
            description,
            required: true,
            default: None,
            min_length: None,
            max_items: None,
            minimum: None,
        }
    }

    pub fn string(description: &'static str) -> Self {
        Self::new(ParamKind::String, description)
    }

    pub fn number(description: &'static str) -> Self {
        Self::new(ParamKind::Number, description)
    }

    pub fn integer(description: &'static str) -> Self {
        Self::new(ParamKind::Integer, description)
    }

    pub fn boolean(description: &'static str) -> Self {
        Self::new(ParamKind::Boolean, description)
    }

    pub fn string_array(description: &'static str) -> Self {
        Self::new(ParamKind::StringArray, description)
    }

    pub fn nullable_string_array(description: &'static str) -> Self {
        Self::new(ParamKind::NullableStringArray, description)
    }

    pub fn one_of(allowed: Vec<&'static str>, description: &'static str) -> Self {
        Self::new(ParamKind::Enum(allowed), description)
    }

    /// The `version` parameter every explorer tool carries.
    pub fn version() -> Self {
        Self::one_of(
            ProtocolVersion::ALL.iter().map(|v| v.as_str()).collect(),
            "Choose version of explorer API, default is V1",
        )
        .with_default(json!(ProtocolVersion::default().as_str()))
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks the field optional and fills it with `value` when absent.
    pub fn with_default(mut self, value: Value) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    fn check_value(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        if !self.kind.matches(value) {
            return Err(ValidationError::WrongType {
                field: name.to_string(),
                expected: self.kind.expected(),
            });
        }
        if let (Some(min), Some(s)) = (self.min_length, value.as_str()) {
            if s.chars().count() < min {
                return Err(ValidationError::Constraint {
                    field: name.to_string(),
                    reason: format!("must be at least {} character(s) long", min),
                });
            }
        }
        if let (Some(max), Some(items)) = (self.max_items, value.as_array()) {
            if items.len() > max {
                return Err(ValidationError::Constraint {
                    field: name.to_string(),
                    reason: format!("must contain at most {} item(s)", max),
                });
            }
        }
        if let (Some(min), Some(n)) = (self.minimum, value.as_f64()) {
            if n < min {
                return Err(ValidationError::Constraint {
                    field: name.to_string(),
                    reason: format!("must be greater than or equal to {}", min),
                });
            }
        }
        Ok(())
    }

    fn json_schema(&self) -> Value {
        let mut schema = self.kind.json_schema();
        schema.insert("description".into(), json!(self.description));
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        if let Some(min) = self.min_length {
            schema.insert("minLength".into(), json!(min));
        }
        if let Some(max) = self.max_items {
            schema.insert("maxItems".into(), json!(max));
        }
        if let Some(min) = self.minimum {
            schema.insert("minimum".into(), json!(min));
        }
        Value::Object(schema)
    }
}

/// Ordered set of declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    fields: Vec<(&'static str, ParamField)>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, field: ParamField) -> Self {
        self.fields.push((name, field));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamField> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, f)| f)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &ParamField)> {
        self.fields.iter().map(|(n, f)| (*n, f))
    }

    /// Checks the declaration itself: unique names, required fields without
    /// defaults, defaults that satisfy their own field.
    pub fn check(&self) -> Result<(), String> {
        for (i, (name, field)) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|(n, _)| n == name) {
                return Err(format!("parameter '{}' is declared twice", name));
            }
            match (&field.default, field.required) {
                (Some(_), true) => {
                    return Err(format!("required parameter '{}' declares a default", name))
                }
                (Some(default), false) => field
                    .check_value(name, default)
                    .map_err(|e| format!("default does not fit its declaration: {}", e))?,
                (None, _) => {}
            }
        }
        Ok(())
    }

    /// Validates raw invocation arguments and applies defaults.
    ///
    /// A missing or `null` argument object is treated as `{}`. Unknown keys are
    /// rejected. An explicit `null` for an optional field counts as absent.
    pub fn validate(&self, raw: &Value) -> Result<Map<String, Value>, ValidationError> {
        let args = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            Value::Array(_) => return Err(ValidationError::NotAnObject("an array".into())),
            Value::String(_) => return Err(ValidationError::NotAnObject("a string".into())),
            Value::Number(_) => return Err(ValidationError::NotAnObject("a number".into())),
            Value::Bool(_) => return Err(ValidationError::NotAnObject("a boolean".into())),
        };

        if let Some(unknown) = args.keys().find(|k| self.get(k).is_none()) {
            return Err(ValidationError::Unknown(unknown.clone()));
        }

        let mut validated = Map::new();
        for (name, field) in &self.fields {
            match args.get(*name).filter(|v| !v.is_null()) {
                Some(value) => {
                    field.check_value(name, value)?;
                    validated.insert(name.to_string(), field.kind.normalize(value));
                }
                None if field.required => {
                    return Err(ValidationError::Missing(name.to_string()));
                }
                None => {
                    if let Some(default) = &field.default {
                        validated.insert(name.to_string(), default.clone());
                    }
                }
            }
        }
        Ok(validated)
    }

    /// JSON Schema rendering used for `tools/list`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, field) in &self.fields {
            properties.insert(name.to_string(), field.json_schema());
            if field.required {
                required.push(json!(name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}
