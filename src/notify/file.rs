//! Local sink: append the report to `<log_directory>/panics.log`.
//!
//! The file is opened, appended to, and closed on every report so that
//! external log rotation is picked up without coordination. Each entry is
//! handed to a single `write_all` on an `O_APPEND` handle. tokio splits
//! large writes into chunks, so entries from concurrent reports can
//! interleave once an entry grows past one chunk; keep the request dump
//! bounded with [`Options::max_dump_body`](crate::Options::max_dump_body).

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::PanicsError;
use crate::report::FormattedReport;

pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, report: &FormattedReport) -> Result<(), PanicsError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(report.log_entry().as_bytes()).await?;
        // tokio::fs::File completes writes in the background; flush before drop.
        file.flush().await?;
        Ok(())
    }
}
