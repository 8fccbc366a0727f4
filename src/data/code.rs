//! Site-wide extension code.

use std::time::SystemTime;

/// Site-wide executable extension logic.
///
/// The content is opaque to the compilation core; only the timestamp
/// matters here, because changed extension code invalidates every
/// compiled output.
#[derive(Debug, Clone)]
pub struct Code {
    content: String,
    mtime: Option<SystemTime>,
}

impl Code {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mtime: None,
        }
    }

    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    pub fn set_mtime(&mut self, mtime: Option<SystemTime>) {
        self.mtime = mtime;
    }
}
