//! Line-by-line block segmentation.
//!
//! Static blocks end after `batch_size` commands, a blank line or end of
//! input. Dynamic blocks are delimited by `{` / `}` marker lines and may nest;
//! a dynamic block that never sees its closing marker is dropped together with
//! every block enclosing it.

use crate::error::Result;
use crate::models::{Block, Command};
use std::io;
use std::mem;
use tracing::{debug, trace, warn};

pub const OPEN_MARKER: &str = "{";
pub const CLOSE_MARKER: &str = "}";

/// Which parser builds the next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Static,
    Dynamic,
}

/// Outcome of building one block.
///
/// Signals that emit carry the completed block; the others carry nothing,
/// so a discarded block cannot reach the callback.
#[derive(Debug, PartialEq, Eq)]
pub enum Signal {
    /// Batch size reached, or blank line / end of input with pending commands.
    FlushAndContinueStatic(Block),
    /// `{` arrived while static commands were pending.
    FlushAndSwitchToDynamic(Block),
    /// Stray `}` arrived while static commands were pending.
    FlushAndStop(Block),
    /// A dynamic block was closed by its matching `}`.
    DynamicClosed(Block),
    /// Nothing pending and nothing more to read (or a stray `}`).
    StopNoFlush,
    /// Input ended inside a dynamic block.
    Unterminated,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::FlushAndContinueStatic(_) => "flush_and_continue_static",
            Signal::FlushAndSwitchToDynamic(_) => "flush_and_switch_to_dynamic",
            Signal::FlushAndStop(_) => "flush_and_stop",
            Signal::DynamicClosed(_) => "dynamic_closed",
            Signal::StopNoFlush => "stop_no_flush",
            Signal::Unterminated => "unterminated",
        }
    }

    /// Mode for the next block, or `None` when the run is over.
    pub fn next_mode(&self) -> Option<Mode> {
        match self {
            Signal::FlushAndContinueStatic(_) | Signal::DynamicClosed(_) => Some(Mode::Static),
            Signal::FlushAndSwitchToDynamic(_) => Some(Mode::Dynamic),
            Signal::FlushAndStop(_) | Signal::StopNoFlush | Signal::Unterminated => None,
        }
    }

    /// The block to emit, if this signal flushes one.
    pub fn into_block(self) -> Option<Block> {
        match self {
            Signal::FlushAndContinueStatic(block)
            | Signal::FlushAndSwitchToDynamic(block)
            | Signal::FlushAndStop(block)
            | Signal::DynamicClosed(block) => Some(block),
            Signal::StopNoFlush | Signal::Unterminated => None,
        }
    }
}

/// Classified input line.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Open,
    Close,
    Payload(String),
    /// Blank line or end of input.
    End,
}

fn read_line<I>(lines: &mut I) -> Result<Line>
where
    I: Iterator<Item = io::Result<String>>,
{
    let line = match lines.next() {
        Some(line) => line?,
        None => return Ok(Line::End),
    };
    trace!(line = %line, "read");

    Ok(match line.as_str() {
        "" => Line::End,
        OPEN_MARKER => Line::Open,
        CLOSE_MARKER => Line::Close,
        _ => Line::Payload(line),
    })
}

/// Splits a line stream into blocks.
///
/// Holds no per-block state: the block under construction is passed in and
/// handed back inside the returned [`Signal`].
#[derive(Debug, Clone)]
pub struct Segmenter {
    batch_size: usize,
}

impl Segmenter {
    /// Batch sizes below 1 are raised to 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fill `block` with up to `batch_size` commands.
    pub fn process_static<I>(&self, lines: &mut I, mut block: Block) -> Result<Signal>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        loop {
            match read_line(lines)? {
                Line::End => {
                    return Ok(if block.is_empty() {
                        Signal::StopNoFlush
                    } else {
                        Signal::FlushAndContinueStatic(block)
                    });
                }
                Line::Open => {
                    if block.is_empty() {
                        return self.process_dynamic(lines, block);
                    }
                    return Ok(Signal::FlushAndSwitchToDynamic(block));
                }
                Line::Close => {
                    warn!(pending = block.len(), "closing marker outside a dynamic block");
                    return Ok(if block.is_empty() {
                        Signal::StopNoFlush
                    } else {
                        Signal::FlushAndStop(block)
                    });
                }
                Line::Payload(text) => {
                    block.push(Command::new(text));
                    if block.len() >= self.batch_size {
                        return Ok(Signal::FlushAndContinueStatic(block));
                    }
                }
            }
        }
    }

    /// Fill `block` until its matching closing marker.
    ///
    /// The opening marker has already been consumed. Nested blocks are kept on
    /// an explicit stack; an empty nested block is dropped on close.
    pub fn process_dynamic<I>(&self, lines: &mut I, block: Block) -> Result<Signal>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let mut current = block;
        let mut parents: Vec<Block> = Vec::new();

        loop {
            match read_line(lines)? {
                Line::Open => {
                    parents.push(mem::take(&mut current));
                    trace!(depth = parents.len() + 1, "nested block opened");
                }
                Line::Close => {
                    let Some(parent) = parents.pop() else {
                        return Ok(Signal::DynamicClosed(current));
                    };
                    let nested = mem::replace(&mut current, parent);
                    if nested.is_empty() {
                        debug!("empty nested block discarded");
                    } else {
                        current.push(nested);
                    }
                }
                Line::Payload(text) => current.push(Command::new(text)),
                Line::End => {
                    warn!(
                        depth = parents.len() + 1,
                        "input ended inside a dynamic block, discarding it"
                    );
                    return Ok(Signal::Unterminated);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;

    fn lines(input: &[&str]) -> impl Iterator<Item = io::Result<String>> {
        input
            .iter()
            .map(|s| Ok(s.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn texts(block: &Block) -> Vec<String> {
        block
            .children()
            .iter()
            .map(|entry| match entry {
                Entry::Command(cmd) => cmd.text().to_string(),
                Entry::Block(nested) => format!("[{}]", texts(nested).join(",")),
            })
            .collect()
    }

    #[test]
    fn test_batch_size_clamped_to_one() {
        assert_eq!(Segmenter::new(0).batch_size(), 1);
        assert_eq!(Segmenter::new(5).batch_size(), 5);
    }

    #[test]
    fn test_static_flushes_at_batch_size() {
        let seg = Segmenter::new(3);
        let mut input = lines(&["a", "b", "c", "d"]);

        let signal = seg.process_static(&mut input, Block::new()).unwrap();
        assert_eq!(signal.next_mode(), Some(Mode::Static));
        let block = signal.into_block().unwrap();
        assert_eq!(texts(&block), vec!["a", "b", "c"]);

        // "d" is still unread
        assert_eq!(input.next().unwrap().unwrap(), "d");
    }

    #[test]
    fn test_static_blank_line_flushes_partial() {
        let seg = Segmenter::new(10);
        let mut input = lines(&["a", "b", "", "c"]);

        let signal = seg.process_static(&mut input, Block::new()).unwrap();
        assert!(matches!(signal, Signal::FlushAndContinueStatic(_)));
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_static_end_of_input_empty_stops() {
        let seg = Segmenter::new(3);
        let signal = seg.process_static(&mut lines(&[]), Block::new()).unwrap();
        assert_eq!(signal, Signal::StopNoFlush);
        assert_eq!(signal.next_mode(), None);
    }

    #[test]
    fn test_static_open_with_pending_switches() {
        let seg = Segmenter::new(3);
        let mut input = lines(&["x", "y", "{", "z", "}"]);

        let signal = seg.process_static(&mut input, Block::new()).unwrap();
        assert!(matches!(signal, Signal::FlushAndSwitchToDynamic(_)));
        assert_eq!(signal.next_mode(), Some(Mode::Dynamic));
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_static_open_on_empty_delegates_to_dynamic() {
        let seg = Segmenter::new(1);
        let mut input = lines(&["{", "x", "y", "}"]);

        let signal = seg.process_static(&mut input, Block::new()).unwrap();
        assert!(matches!(signal, Signal::DynamicClosed(_)));
        // batch size does not apply inside a dynamic block
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_static_stray_close_with_pending_flushes_and_stops() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_static(&mut lines(&["x", "y", "}"]), Block::new())
            .unwrap();
        assert!(matches!(signal, Signal::FlushAndStop(_)));
        assert_eq!(signal.next_mode(), None);
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_static_stray_close_without_pending_stops() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_static(&mut lines(&["}", "x"]), Block::new())
            .unwrap();
        assert_eq!(signal, Signal::StopNoFlush);
    }

    #[test]
    fn test_dynamic_discards_empty_nested() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_dynamic(&mut lines(&["x", "{", "}", "y", "}"]), Block::new())
            .unwrap();
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_dynamic_nests_blocks() {
        let seg = Segmenter::new(3);
        let input = ["a", "{", "b", "c", "}", "d", "}"];
        let signal = seg.process_dynamic(&mut lines(&input), Block::new()).unwrap();
        let block = signal.into_block().unwrap();

        assert_eq!(texts(&block), vec!["a", "[b,c]", "d"]);
        assert_eq!(block.to_string(), " a, b, c, d");
    }

    #[test]
    fn test_dynamic_deep_nesting() {
        let seg = Segmenter::new(3);
        let input = ["{", "{", "a", "}", "}", "b", "}"];
        let signal = seg.process_dynamic(&mut lines(&input), Block::new()).unwrap();
        assert_eq!(texts(&signal.into_block().unwrap()), vec!["[[a]]", "b"]);
    }

    #[test]
    fn test_dynamic_unterminated_at_eof() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_dynamic(&mut lines(&["a", "b"]), Block::new())
            .unwrap();
        assert_eq!(signal, Signal::Unterminated);
    }

    #[test]
    fn test_dynamic_unterminated_nested_drops_outer() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_dynamic(&mut lines(&["a", "{", "b"]), Block::new())
            .unwrap();
        assert_eq!(signal, Signal::Unterminated);
        assert_eq!(signal.into_block(), None);
    }

    #[test]
    fn test_dynamic_blank_line_is_unterminated() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_dynamic(&mut lines(&["a", "", "}"]), Block::new())
            .unwrap();
        assert_eq!(signal, Signal::Unterminated);
    }

    #[test]
    fn test_markers_must_match_exactly() {
        let seg = Segmenter::new(3);
        let signal = seg
            .process_static(&mut lines(&[" {", "} ", "{}"]), Block::new())
            .unwrap();
        assert_eq!(texts(&signal.into_block().unwrap()), vec![" {", "} ", "{}"]);
    }

    #[test]
    fn test_read_error_propagates() {
        let seg = Segmenter::new(3);
        let mut input = vec![
            Ok("a".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad utf-8")),
        ]
        .into_iter();
        assert!(seg.process_static(&mut input, Block::new()).is_err());
    }
}
