/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Access operation result
pub type AccessResult<T> = Result<T, AccessError>;

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Caller-visible access failures
///
/// None of these terminate a request: the mediator renders each one into
/// the text result it returns.
#[derive(Error, Debug, Diagnostic)]
pub enum AccessError {
    #[error("File outside allowed directory: {}", .0.display())]
    #[diagnostic(
        code(access::sandbox_violation),
        help("Only paths inside the configured sandbox root can be read.")
    )]
    SandboxViolation(PathBuf),

    #[error("Not found: {}", .0.display())]
    #[diagnostic(
        code(access::not_found),
        help("The path does not exist or is not the expected kind of entry.")
    )]
    NotFound(PathBuf),

    #[error("Filesystem error on {}: {source}", .path.display())]
    #[diagnostic(code(access::filesystem))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AccessError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AccessError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Collector delivery failures
///
/// Logged by the emitter and never surfaced to the caller.
#[derive(Error, Debug, Diagnostic)]
pub enum DeliveryError {
    #[error("collector returned status {0}")]
    #[diagnostic(code(delivery::rejected))]
    Rejected(u16),

    #[error("collector unreachable: {0}")]
    #[diagnostic(
        code(delivery::unreachable),
        help("Check that the collector is running at the configured URL.")
    )]
    Unreachable(String),

    #[error("failed to build HTTP client: {0}")]
    #[diagnostic(code(delivery::client))]
    Client(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Unreachable(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: &'static str, value: String },

    #[error("sensitivity pattern list is empty")]
    #[diagnostic(
        code(config::empty_patterns),
        help("Provide at least one comma-separated pattern in SSF_SENSITIVE_PATTERNS.")
    )]
    EmptyPatterns,
}

/// Tool shell errors, reported as protocol errors rather than text results
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    #[diagnostic(code(tool::unknown))]
    UnknownTool(String),

    #[error("Missing required argument: {0}")]
    #[diagnostic(code(tool::missing_argument))]
    MissingArgument(&'static str),

    #[error("Invalid arguments: {0}")]
    #[diagnostic(code(tool::invalid_arguments))]
    InvalidArguments(String),
}
