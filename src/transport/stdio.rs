//! Stdio transport: newline-delimited JSON-RPC on stdin/stdout.
//!
//! Each inbound message is handled on its own task so a slow upstream call
//! never blocks the read loop. A single writer task owns stdout; responses
//! are funneled through a channel, so interleaved completions still emit
//! whole lines. Responses may therefore arrive out of request order, which
//! JSON-RPC ids make safe.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::handle_message;
use crate::handlers::ServerState;

pub async fn run(state: Arc<ServerState>) -> anyhow::Result<()> {
    info!("stdio transport ready");

    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let state = state.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = handle_message(&state, &line).await {
                match serde_json::to_string(&response) {
                    Ok(encoded) => {
                        if tx.send(encoded).await.is_err() {
                            debug!("writer closed, dropping response");
                        }
                    }
                    Err(e) => error!("response encoding failed: {}", e),
                }
            }
        });
    }

    // Stdin closed: let in-flight responses drain, then stop the writer.
    drop(tx);
    writer.await.context("stdout writer")??;

    info!("stdin closed, shutting down");
    Ok(())
}
