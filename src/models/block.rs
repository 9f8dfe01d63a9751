use super::command::Command;
use chrono::{DateTime, Utc};
use std::fmt;

/// One element of a block: a plain command or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Command(Command),
    Block(Block),
}

impl Entry {
    /// Timestamp of the entry; nested blocks report their first command.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Entry::Command(cmd) => Some(cmd.captured_at()),
            Entry::Block(block) => block.timestamp(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Command(cmd) => fmt::Display::fmt(cmd, f),
            Entry::Block(block) => fmt::Display::fmt(block, f),
        }
    }
}

impl From<Command> for Entry {
    fn from(cmd: Command) -> Self {
        Entry::Command(cmd)
    }
}

impl From<Block> for Entry {
    fn from(block: Block) -> Self {
        Entry::Block(block)
    }
}

/// An ordered batch of commands and nested blocks.
///
/// Children keep arrival order, which is also the rendering order.
/// Rendering joins the children with `,`; each command supplies its own
/// leading space, so nested blocks render inline with their parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    children: Vec<Entry>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<Entry>) {
        self.children.push(entry.into());
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    /// Timestamp of the first command reached through first children,
    /// `None` when that path ends in an empty block.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let mut block = self;
        loop {
            match block.children.first()? {
                Entry::Command(cmd) => return Some(cmd.captured_at()),
                Entry::Block(nested) => block = nested,
            }
        }
    }
}

// Nesting depth is bounded only by the input, so rendering and dropping walk
// the tree with an explicit stack instead of recursing.

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.children.iter(), true)];
        while let Some((iter, first)) = stack.last_mut() {
            let Some(child) = iter.next() else {
                stack.pop();
                continue;
            };
            if !*first {
                f.write_str(",")?;
            }
            *first = false;
            match child {
                Entry::Command(cmd) => fmt::Display::fmt(cmd, f)?,
                Entry::Block(nested) => stack.push((nested.children.iter(), true)),
            }
        }
        Ok(())
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let mut pending: Vec<Block> = Vec::new();
        let mut children = std::mem::take(&mut self.children);
        loop {
            for entry in children.drain(..) {
                if let Entry::Block(nested) = entry {
                    pending.push(nested);
                }
            }
            match pending.pop() {
                Some(mut block) => children = std::mem::take(&mut block.children),
                None => break,
            }
        }
    }
}
