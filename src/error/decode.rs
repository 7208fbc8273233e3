//! Define the error for decoding a single key or value from its fixed width bytes.

use std::error::Error;
use std::fmt;

/// Error type for decoding fixed width bytes.
/// Contains a message and may wrap an underlying error.
#[derive(Debug)]
pub struct DecodeError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            None => None,
            Some(e) => Some(e.as_ref()),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl DecodeError {
    /// Create a new DecodeError with a message and optional source error.
    pub fn new(message: String, source: Option<Box<dyn Error + Send + Sync>>) -> Self {
        Self { message, source }
    }

    /// The message describing what failed to decode.
    pub fn message(&self) -> &str {
        &self.message
    }
}
