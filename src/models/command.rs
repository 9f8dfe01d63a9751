use chrono::{DateTime, Utc};
use std::fmt;

/// A single captured input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    captured_at: DateTime<Utc>,
}

impl Command {
    /// Capture `text` with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self::at(text, Utc::now())
    }

    /// Capture `text` with an explicit timestamp.
    pub fn at(text: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            captured_at,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Renders as a leading space followed by the raw text.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {}", self.text)
    }
}
