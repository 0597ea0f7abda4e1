/*!
 * Error types for the Apex control layer
 */

use apex_core_interface::EngineError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, ApexError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum ApexError {
    /// A call into the remote engine failed (transport or remote exception)
    Remote(EngineError),

    /// Application id read, or kill attempted, before a successful launch
    UninitializedState { name: String },

    /// No registered application carries this id
    NotFound { app_id: String },

    /// Operation only valid before launch was called on a launched application
    AlreadyLaunched { name: String, app_id: String },

    /// Operation on an application that has been killed
    Terminated { name: String },

    /// Configuration error
    Config(String),

    /// Unparseable shell command
    InvalidCommand(String),

    /// I/O error
    Io(io::Error),
}

impl ApexError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Nothing can work without a reachable gateway and valid config
            ApexError::Config(_) => EXIT_FATAL,
            ApexError::Remote(err) if err.operation() == "connect" => EXIT_FATAL,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApexError::NotFound { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApexError::Remote(_) => ErrorCategory::Remote,
            ApexError::UninitializedState { .. }
            | ApexError::AlreadyLaunched { .. }
            | ApexError::Terminated { .. } => ErrorCategory::Lifecycle,
            ApexError::NotFound { .. } => ErrorCategory::Lookup,
            ApexError::Config(_) => ErrorCategory::Configuration,
            ApexError::InvalidCommand(_) => ErrorCategory::Usage,
            ApexError::Io(_) => ErrorCategory::IoError,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Failures reported by or on the way to the engine
    Remote,
    /// Operation not allowed in the application's current phase
    Lifecycle,
    /// Identifier lookups that matched nothing
    Lookup,
    Configuration,
    /// Malformed user input
    Usage,
    IoError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Remote => write!(f, "remote"),
            ErrorCategory::Lifecycle => write!(f, "lifecycle"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::IoError => write!(f, "io"),
        }
    }
}

impl fmt::Display for ApexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApexError::Remote(err) => write!(f, "{}", err),
            ApexError::UninitializedState { name } => {
                write!(f, "Application '{}' has not been launched", name)
            }
            ApexError::NotFound { app_id } => write!(f, "App not found: {}", app_id),
            ApexError::AlreadyLaunched { name, app_id } => {
                write!(
                    f,
                    "Application '{}' is already launched as {}",
                    name, app_id
                )
            }
            ApexError::Terminated { name } => {
                write!(f, "Application '{}' has been killed", name)
            }
            ApexError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ApexError::InvalidCommand(msg) => write!(f, "Invalid command: {}", msg),
            ApexError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ApexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApexError::Remote(err) => Some(err),
            ApexError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for ApexError {
    fn from(err: EngineError) -> Self {
        ApexError::Remote(err)
    }
}

impl From<apex_connect::ConnectError> for ApexError {
    fn from(err: apex_connect::ConnectError) -> Self {
        ApexError::Remote(err.into())
    }
}

impl From<io::Error> for ApexError {
    fn from(err: io::Error) -> Self {
        ApexError::Io(err)
    }
}

impl From<toml::de::Error> for ApexError {
    fn from(err: toml::de::Error) -> Self {
        ApexError::Config(format!("TOML parse error: {}", err))
    }
}
