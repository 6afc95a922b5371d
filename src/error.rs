use thiserror::Error;

/// Result type for jfront operations
pub type Result<T> = std::result::Result<T, Error>;

/// Out-of-band failures of the front end.
///
/// Problems found in the compiled source are never reported through this type;
/// they are `Diagnostic`s. An `Error` means the pipeline could not run at all.
#[derive(Error, Debug)]
pub enum Error {
    /// Source text could not be read (the `IOFailure` signal)
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Java source level: {level}")]
    InvalidLanguageLevel { level: String },

    #[error("Unknown diagnostic category: {name}")]
    UnknownCategory { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
