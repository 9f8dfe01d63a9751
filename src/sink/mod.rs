//! Block consumers.

mod bulk;

pub use bulk::{log_file_name, render, BulkSink};

use crate::models::Block;

/// Receives each completed block exactly once, in completion order.
pub trait BlockSink {
    fn accept(&mut self, block: &Block);
}

impl<F> BlockSink for F
where
    F: FnMut(&Block),
{
    fn accept(&mut self, block: &Block) {
        self(block)
    }
}
