//! Script loader.
//!
//! Turns the stream a bundle handed out into something a backend can
//! consume: a buffered reader for the modern backend, or the fully drained
//! text for the legacy one. The underlying stream is owned by the returned
//! value (or dropped before returning), so it is released on every path.

use std::io::{BufReader, Read};

use crate::resource::ScriptStream;

/// Buffered reader over a script's content.
pub type ScriptReader = BufReader<ScriptStream>;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The locator resolved to no resource.
    #[error("Could not find {0}")]
    NotFound(String),

    /// Reading the stream failed.
    #[error("There was an error reading {name}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid UTF-8 text.
    #[error("There was an error reading {0}: content is not valid UTF-8")]
    Decode(String),
}

impl LoadError {
    /// Display name of the script the error refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound(name) | Self::Decode(name) => name,
            Self::Io { name, .. } => name,
        }
    }
}

/// Wrap `stream` for reading, failing with [`LoadError::NotFound`] if the
/// locator found nothing.
pub fn open(stream: Option<ScriptStream>, name: &str) -> Result<ScriptReader, LoadError> {
    let stream = stream.ok_or_else(|| LoadError::NotFound(name.to_string()))?;
    Ok(BufReader::new(stream))
}

/// Drain `stream` into a string. The stream is dropped before returning.
pub fn read_to_string(mut stream: ScriptStream, name: &str) -> Result<String, LoadError> {
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Io {
            name: name.to_string(),
            source,
        })?;
    drop(stream);
    String::from_utf8(bytes).map_err(|_| LoadError::Decode(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
