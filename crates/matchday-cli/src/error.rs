//! CLI error types.

use std::fmt;

use matchday_core::ParseError;
use matchday_providers::ProviderError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced to the operator.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// A fixture failed to normalize; the whole run is aborted.
    Parse(ParseError),
    /// A boundary (source page or calendar) failed.
    Provider(ProviderError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Parse(err) => write!(f, "fixture parse error: {}", err),
            Self::Provider(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
