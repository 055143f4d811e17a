//! Error types for starq-core

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for starq-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the engine a format conversion failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Converting the job's input into the engine's JSON input
    Input,
    /// Converting the engine's JSON output into the job's output format
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Errors that can occur in starq-core
#[derive(Error, Debug)]
pub enum Error {
    /// Transformer config file could not be read
    #[error("failed to read config file '{}': {source}", .path.display())]
    ConfigRead {
        /// Absolute path of the config file
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Transformer config file is not a valid config document
    #[error("failed to parse transformer config file '{}': {source}", .path.display())]
    ConfigParse {
        /// Absolute path of the config file
        path: PathBuf,
        /// Underlying parse failure
        source: serde_yaml::Error,
    },

    /// Config file path could not be made absolute
    #[error("failed to resolve absolute path to config file '{}': {source}", .path.display())]
    ConfigPath {
        /// Path as given
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Configured `input.file` could not be opened
    #[error("failed to read config input.file at '{}': {source}", .path.display())]
    OpenInput {
        /// Resolved path of the input file
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Configured `output.file` could not be opened
    #[error("failed to open config output.file at '{}': {source}", .path.display())]
    OpenOutput {
        /// Resolved path of the output file
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Configured `errors.file` could not be opened
    #[error("failed to open config errors.file at '{}': {source}", .path.display())]
    OpenErrors {
        /// Resolved path of the errors file
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Parent directory of an output file could not be created
    #[error("failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// JSON/YAML bridging failed
    #[error("failed to convert {direction}: {message}")]
    Conversion {
        /// Which side of the engine failed
        direction: Direction,
        /// Description of the failure
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn conversion(direction: Direction, err: impl fmt::Display) -> Self {
        Error::Conversion {
            direction,
            message: err.to_string(),
        }
    }
}

/// Every failure collected while closing a group of streams, in close order.
#[derive(Debug, Default)]
pub struct CloseErrors(Vec<io::Error>);

impl CloseErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, err: io::Error) {
        self.0.push(err);
    }

    /// Underlying failures in the order they occurred
    pub fn errors(&self) -> &[io::Error] {
        &self.0
    }

    /// Whether nothing failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise the whole collection wrapped as one `io::Error`
    pub fn into_result(self) -> io::Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(io::Error::other(self))
        }
    }

    /// Recover the collection from an error produced by [`CloseErrors::into_result`]
    pub fn from_io(err: &io::Error) -> Option<&CloseErrors> {
        err.get_ref()?.downcast_ref::<CloseErrors>()
    }
}

impl fmt::Display for CloseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_errors_empty_is_ok() {
        assert!(CloseErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_close_errors_joins_messages() {
        let mut errors = CloseErrors::new();
        errors.push(io::Error::other("one failed"));
        errors.push(io::Error::other("two failed"));

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.to_string(), "one failed\ntwo failed");

        let recovered = CloseErrors::from_io(&err).unwrap();
        assert_eq!(recovered.errors().len(), 2);
    }

    #[test]
    fn test_conversion_error_names_direction() {
        let err = Error::conversion(Direction::Output, "bad json");
        assert_eq!(err.to_string(), "failed to convert output: bad json");
    }
}
