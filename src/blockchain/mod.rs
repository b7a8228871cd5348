// src/blockchain/mod.rs

pub mod client;
pub use client::ExplorerClient;

pub mod models;
pub mod services;
pub mod timer;
