pub mod block;
pub mod command;

pub use block::{Block, Entry};
pub use command::Command;
