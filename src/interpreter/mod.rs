//! Drives the segmenter over an input stream and hands completed blocks to a sink.

pub mod segmenter;

pub use segmenter::{Mode, Segmenter, Signal, CLOSE_MARKER, OPEN_MARKER};

use crate::config::Settings;
use crate::error::{BulkError, Result};
use crate::models::Block;
use crate::sink::BlockSink;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info};

/// What happened during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub blocks_emitted: usize,
    /// Input ended inside a dynamic block and pending content was dropped.
    pub aborted: bool,
}

pub struct Interpreter {
    segmenter: Segmenter,
    input: Option<PathBuf>,
}

impl Interpreter {
    pub fn new(settings: &Settings) -> Self {
        let segmenter = Segmenter::new(settings.batch_size);
        debug!(batch_size = segmenter.batch_size(), "static batch size");
        Self {
            segmenter,
            input: settings.input.clone(),
        }
    }

    /// Run over the configured input file, or stdin when none is set.
    ///
    /// An input file that cannot be opened fails before anything is emitted.
    pub fn execute(&self, sink: &mut impl BlockSink) -> Result<RunSummary> {
        match &self.input {
            Some(path) => {
                let file = File::open(path).map_err(|source| BulkError::OpenInput {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "reading commands from file");
                self.run(BufReader::new(file), sink)
            }
            None => self.run(io::stdin().lock(), sink),
        }
    }

    /// Segment `reader` into blocks, calling `sink` once per completed block.
    pub fn run<R: BufRead>(&self, reader: R, sink: &mut impl BlockSink) -> Result<RunSummary> {
        let mut lines = reader.lines();
        let mut mode = Mode::Static;
        let mut summary = RunSummary::default();

        loop {
            let block = Block::new();
            let signal = match mode {
                Mode::Static => self.segmenter.process_static(&mut lines, block)?,
                Mode::Dynamic => self.segmenter.process_dynamic(&mut lines, block)?,
            };
            debug!(?mode, signal = signal.as_str(), "block finished");

            let next = signal.next_mode();
            summary.aborted = matches!(signal, Signal::Unterminated);

            if let Some(block) = signal.into_block() {
                sink.accept(&block);
                summary.blocks_emitted += 1;
            }

            match next {
                Some(next) => mode = next,
                None => break,
            }
        }

        debug!(
            blocks = summary.blocks_emitted,
            aborted = summary.aborted,
            "run finished"
        );
        Ok(summary)
    }
}
