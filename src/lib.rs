pub mod config;
pub mod error;
pub mod interpreter;
pub mod logging;
pub mod models;
pub mod sink;

pub use config::{Config, Overrides, Settings};
pub use error::BulkError;
pub use interpreter::{Interpreter, RunSummary};
pub use models::{Block, Command, Entry};
pub use sink::{BlockSink, BulkSink};
