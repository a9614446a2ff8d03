use std::io;
use thiserror::Error;

/// Errors that can be returned from loader operations
#[derive(Error, Debug)]
pub enum LoaderError {
    /// No fetcher root contained the requested template
    #[error("unable to find template '{0}'")]
    TemplateNotFound(String),

    /// The compiler collaborator rejected the template
    #[error("failed to compile template '{key}': {message}")]
    Compile {
        /// The template key that was being compiled
        key: String,
        /// The compiler's diagnostic
        message: String,
    },

    /// A filesystem operation failed
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Persisted bytecode failed to encode or decode
    #[error(transparent)]
    Codec(#[from] washi_bytecode::CodecError),

    /// A cache key escaped the file cache's root directory
    #[error("cache key '{0}' does not map to a cacheable path")]
    UncacheableKey(String),
}

impl LoaderError {
    /// Makes a compile error for the given template key
    pub fn compile(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Compile {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// The Result type used by the washi loader
pub type Result<T> = std::result::Result<T, LoaderError>;
