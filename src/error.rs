//! Error taxonomy for the mora timing pipeline.
//!
//! | Variant          | Recoverable | Raised by                              |
//! |------------------|-------------|----------------------------------------|
//! | `InvalidInput`   | no          | segmentation, allocation               |
//! | `AudioRead`      | no          | audio decoding, pitch sampling         |
//! | `MissingMapping` | yes         | annotation (logged, never returned)    |
//! | `Reconciliation` | no          | global duration reconciliation         |
//!
//! `Io` and `Json` wrap the file-level failures of config, mapping and
//! transcript loading.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoraError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("cannot read audio {}: {message}", .path.display())]
    AudioRead { path: PathBuf, message: String },

    #[error("no phonetic mapping for {symbol:?}")]
    MissingMapping { symbol: String },

    #[error("cannot reconcile durations: {message}")]
    Reconciliation { message: String },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl MoraError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub(crate) fn audio_read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::AudioRead { path: path.into(), message: err.to_string() }
    }

    pub(crate) fn reconciliation(message: impl Into<String>) -> Self {
        Self::Reconciliation { message: message.into() }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }
}

pub type Result<T> = std::result::Result<T, MoraError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_read_display() {
        let err = MoraError::audio_read("/tmp/missing.wav", "No such file");
        assert_eq!(err.to_string(), "cannot read audio /tmp/missing.wav: No such file");
    }

    #[test]
    fn test_missing_mapping_display() {
        let err = MoraError::MissingMapping { symbol: "ゔ".to_string() };
        assert_eq!(err.to_string(), "no phonetic mapping for \"ゔ\"");
    }

    #[test]
    fn test_io_keeps_source() {
        use std::error::Error as _;
        let err = MoraError::io(
            "read mapping",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error while read mapping"));
    }
}
