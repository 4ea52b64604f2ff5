//! CLI error types.

use std::fmt;
use std::process::ExitCode;

use demonlist::{ConfigError, LoadError, TransportError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be read.
    Config(ConfigError),

    /// The HTTP client could not be created.
    Client(TransportError),

    /// A list failed to load.
    Load(LoadError),

    /// The probe reported the host as unavailable.
    Unreachable { url: String, code: u16 },

    /// Failed to create the Tokio runtime.
    Runtime(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Load(_) | CliError::Unreachable { .. } => ExitCode::from(1),
            CliError::Config(_) => ExitCode::from(2),
            CliError::Client(_) | CliError::Runtime(_) => ExitCode::from(3),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Client(e) => write!(f, "{}", e),
            CliError::Load(e) if e.is_reported() => write!(f, "{} (code {})", e, e.code()),
            CliError::Load(e) => write!(f, "{}", e),
            CliError::Unreachable { url, code } => {
                write!(f, "{} is not reachable (code {})", url, code)
            }
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Load(e) => Some(e),
            CliError::Unreachable { .. } | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Client(e)
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::Load(e)
    }
}
