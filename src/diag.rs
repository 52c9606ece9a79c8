//! Best-effort append-only diagnostic log
//!
//! Handlers note interesting events here. Write failures are swallowed and
//! never affect a tool Result. The file is never read back by the server.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::trace;

#[derive(Clone, Default)]
pub struct DiagLog {
    path: Arc<Option<PathBuf>>,
}

impl DiagLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    /// Disabled log; every note is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Append one timestamped line. Failures are logged at trace level and
    /// otherwise dropped.
    pub async fn note(&self, message: &str) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let line = format!("{} {}\n", chrono::Utc::now().to_rfc3339(), message);
        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(line.as_bytes()).await
        }
        .await;
        if let Err(e) = result {
            trace!("diag log write failed: {}", e);
        }
    }
}
