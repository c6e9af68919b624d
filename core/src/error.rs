//! Error types for registration, parsing and spec loading.
//!
//! [`ArgError`] covers everything a parser can report: malformed
//! registrations, usage errors on the command line, help requests and
//! internal invariant violations. [`SpecError`] wraps the I/O and
//! deserialization failures of loading a [`ParserSpec`](crate::ParserSpec).

use thiserror::Error;

use crate::validate::RegistrationError;

/// Exit status for usage errors, matching argparse and clap.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit status for programming defects (`EX_SOFTWARE`).
pub const SOFTWARE_EXIT_CODE: i32 = 70;

/// Broad category of an [`ArgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The parser was set up incorrectly.
    Registration,
    /// The command line does not match the registered flags.
    Usage,
    /// `--help` was requested; the error carries the rendered help text.
    DisplayHelp,
    /// An internal invariant was violated.
    Internal,
}

/// Errors that can occur while registering flags or parsing tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    /// Malformed registration.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A flag did not receive enough values.
    #[error("argument {flag}: {expected}")]
    MissingValue { flag: String, expected: String },

    /// A value could not be coerced into the flag's type.
    #[error("argument {flag}: invalid {kind} value: '{value}'")]
    InvalidValue {
        flag: String,
        kind: &'static str,
        value: String,
    },

    /// A value-less flag was given an attached value (`--verbose=yes`).
    #[error("argument {flag}: ignored explicit argument '{value}'")]
    IgnoredExplicitValue { flag: String, value: String },

    /// Required flags that never appeared.
    #[error("the following arguments are required: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// A process argument that is not valid UTF-8 (shown lossily).
    #[error("invalid UTF-8 in argument: {0:?}")]
    InvalidUtf8(String),

    /// Tokens left over after a strict parse.
    #[error("unrecognized arguments: {}", .0.join(" "))]
    UnrecognizedArguments(Vec<String>),

    /// Help was requested; holds the rendered help text.
    #[error("{0}")]
    DisplayHelp(String),

    /// Broken internal invariant (parser state out of sync with its own
    /// registrations).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ArgError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArgError::Registration(_) => ErrorKind::Registration,
            ArgError::DisplayHelp(_) => ErrorKind::DisplayHelp,
            ArgError::Internal(_) => ErrorKind::Internal,
            ArgError::MissingValue { .. }
            | ArgError::InvalidValue { .. }
            | ArgError::IgnoredExplicitValue { .. }
            | ArgError::MissingRequired(_)
            | ArgError::InvalidUtf8(_)
            | ArgError::UnrecognizedArguments(_) => ErrorKind::Usage,
        }
    }

    /// Process exit status conventionally used for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use argpass::ArgError;
    ///
    /// let err = ArgError::UnrecognizedArguments(vec!["--bogus".into()]);
    /// assert_eq!(err.exit_code(), 2);
    /// assert_eq!(err.to_string(), "unrecognized arguments: --bogus");
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::DisplayHelp => 0,
            ErrorKind::Usage => USAGE_EXIT_CODE,
            ErrorKind::Registration | ErrorKind::Internal => SOFTWARE_EXIT_CODE,
        }
    }

    /// Tokens reported by an [`ArgError::UnrecognizedArguments`] error.
    pub fn unrecognized(&self) -> Option<&[String]> {
        match self {
            ArgError::UnrecognizedArguments(tokens) => Some(tokens),
            _ => None,
        }
    }
}

/// Errors that can occur while loading a parser spec.
#[derive(Debug, Error)]
pub enum SpecError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The spec deserialized but describes an invalid parser.
    #[error("invalid parser spec: {0}")]
    Argument(#[from] ArgError),
}

/// Convenience alias for results with [`ArgError`].
pub type Result<T> = std::result::Result<T, ArgError>;
