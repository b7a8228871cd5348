//! MCP host over a byte stream: newline-delimited JSON-RPC in, one flushed
//! line per response out.
//!
//! Each request is dispatched on its own task, so a slow explorer call only
//! delays its own response. Responses are funnelled through a channel to a
//! single writer task and may come out in a different order than the
//! requests came in; hosts correlate them by `id`.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::{Request, Response},
    },
    AppState,
};

/// Serves requests from `reader` until EOF, then waits for in-flight requests
/// to be answered. Returns an error only when the stream itself fails.
pub async fn serve<R, W>(mut reader: R, writer: W, state: AppState) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Response>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut line = Vec::new();
    let read_result = loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to read request: {}", e);
                break Err(e);
            }
        }

        if tx.is_closed() {
            warn!("Response writer is gone, no longer reading requests");
            break Ok(());
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        debug!("Received: {}", String::from_utf8_lossy(&line).trim_end());

        match serde_json::from_slice::<Request>(&line) {
            Ok(request) => {
                let tx = tx.clone();
                let state = state.clone();
                tokio::spawn(async move {
                    if let Some(response) = handle_mcp_request(request, state).await {
                        // A closed channel means the writer already failed and logged it.
                        let _ = tx.send(response);
                    }
                });
            }
            Err(parse_error) => {
                warn!("JSON parse error: {}", parse_error);
                let _ = tx.send(Response::parse_error(&parse_error));
            }
        }
    };

    // The writer drains once every in-flight task has dropped its sender.
    drop(tx);
    let write_result = writer_task.await.map_err(io::Error::other)?;
    info!("MCP server shutting down");
    read_result.and(write_result)
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Response>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut bytes = match serde_json::to_vec(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to serialize response {}: {}", response.id, e);
                continue;
            }
        };
        bytes.push(b'\n');

        if let Err(e) = write_line(&mut writer, &bytes).await {
            error!("Failed to write response: {}", e);
            return Err(e);
        }
        debug!("Sent response {}", response.id);
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await
}
