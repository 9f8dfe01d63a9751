use super::BlockSink;
use crate::models::Block;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Render a block as its `bulk:` output line (without newline).
pub fn render(block: &Block) -> String {
    format!("bulk:{block}")
}

/// `bulk<unix-seconds>.log`
pub fn log_file_name(timestamp: DateTime<Utc>) -> String {
    format!("bulk{}.log", timestamp.timestamp())
}

/// Prints each block to the console and appends it to a per-timestamp log.
pub struct BulkSink<W: Write> {
    console: W,
    log_dir: PathBuf,
}

impl BulkSink<io::Stdout> {
    pub fn stdout(log_dir: impl Into<PathBuf>) -> Self {
        Self::new(io::stdout(), log_dir)
    }
}

impl<W: Write> BulkSink<W> {
    pub fn new(console: W, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            console,
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn into_console(self) -> W {
        self.console
    }

    fn append_log(&self, timestamp: DateTime<Utc>, line: &str) -> io::Result<PathBuf> {
        let path = self.log_dir.join(log_file_name(timestamp));
        // Opened per block; no handle outlives this call.
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{line}")?;
        Ok(path)
    }
}

impl<W: Write> BlockSink for BulkSink<W> {
    fn accept(&mut self, block: &Block) {
        let line = render(block);

        if let Err(e) = writeln!(self.console, "{line}").and_then(|_| self.console.flush()) {
            warn!(error = %e, "failed to write block to console");
        }

        let Some(timestamp) = block.timestamp() else {
            debug!("empty block has no timestamp, skipping log file");
            return;
        };

        match self.append_log(timestamp, &line) {
            Ok(path) => debug!(path = %path.display(), commands = block.len(), "block logged"),
            Err(e) => warn!(
                error = %e,
                dir = %self.log_dir.display(),
                "failed to append block to log file, dropping"
            ),
        }
    }
}
