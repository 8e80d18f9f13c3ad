//! Process exit codes and the failures that happen outside the library.
//!
//! Library failures arrive as [`ErrorEnvelope`]s and are rendered on stdout.
//! [`CliError`] covers what is left: reading the request input and rendering
//! the response.

use dashboard_shared::{ErrorEnvelope, ErrorKind};
use std::{fmt, io};

/// Exit status reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Caller mistakes exit with 2, everything else with 1.
    #[must_use]
    pub const fn for_envelope(error: &ErrorEnvelope) -> Self {
        match error.kind {
            ErrorKind::Expected => Self::InvalidInput,
            ErrorKind::Unexpected => Self::Internal,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    /// `validate-request` got nothing but whitespace.
    EmptyRequest,
    /// Reading the request from stdin failed.
    ReadInput(io::Error),
    /// The response could not be rendered as JSON.
    Render(serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::EmptyRequest => ExitCode::InvalidInput,
            Self::ReadInput(_) => ExitCode::Io,
            Self::Render(_) => ExitCode::Internal,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequest => formatter.write_str("request input is empty"),
            Self::ReadInput(error) => write!(formatter, "failed to read request input: {error}"),
            Self::Render(error) => write!(formatter, "failed to render output: {error}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyRequest => None,
            Self::ReadInput(error) => Some(error),
            Self::Render(error) => Some(error),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(error: io::Error) -> Self {
        Self::ReadInput(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Render(error)
    }
}
