//! Error types for pagestore
//!
//! Two layers of errors live here:
//! - [`Error`] is the crate-level error returned by fallible setup APIs
//!   (configuration loading, store construction, CLI fixtures).
//! - [`FetchError`] is the normalized descriptor a failed page fetch is turned
//!   into before it is published in [`ViewState::Failed`](crate::state::ViewState).
//!   Observers never see the fetcher's own error type.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error accepted from fetch closures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for pagestore
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Runtime Errors
    // ============================================================================
    #[error("No tokio runtime available: {message}")]
    NoRuntime { message: String },

    #[error("Fetch timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Fetch(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for pagestore
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

// ============================================================================
// FetchError
// ============================================================================

/// Normalized failure of a single page fetch
///
/// Carries a human-readable message and, when available, the original cause.
/// Cloning is cheap: the cause is shared.
#[derive(Clone)]
pub struct FetchError {
    message: String,
    cause: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
    transient: bool,
}

impl FetchError {
    /// Create a fetch error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            transient: false,
        }
    }

    /// Create a fetch error that retry layers are allowed to retry
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            transient: true,
            ..Self::new(message)
        }
    }

    /// Wrap an arbitrary error, keeping it as the cause
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(err))
    }

    /// Normalize a boxed error
    ///
    /// A boxed `FetchError` is unwrapped rather than nested.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<FetchError>() {
            Ok(fetch) => *fetch,
            Err(other) => match other.downcast::<Error>() {
                Ok(error) => Self::from(*error),
                Err(other) => Self {
                    message: other.to_string(),
                    cause: Some(Arc::from(other)),
                    transient: false,
                },
            },
        }
    }

    /// Mark this error as transient (or not)
    #[must_use]
    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Prefix the message with context, keeping cause and transience
    #[must_use]
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original error, if one was captured
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Whether retry layers may retry this failure
    pub fn is_retryable(&self) -> bool {
        self.transient
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchError")
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .field("transient", &self.transient)
            .finish()
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Two fetch errors are equal when they describe the same failure;
/// causes are not compared.
impl PartialEq for FetchError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.transient == other.transient
    }
}

impl Eq for FetchError {}

impl From<Error> for FetchError {
    fn from(err: Error) -> Self {
        if let Error::Fetch(fetch) = err {
            return fetch;
        }
        Self {
            message: err.to_string(),
            transient: err.is_retryable(),
            cause: Some(Arc::new(err)),
        }
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_boxed(err.into())
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_value("timeout_ms", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'timeout_ms': must be positive"
        );

        let err = Error::timeout(250);
        assert_eq!(err.to_string(), "Fetch timed out after 250ms");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::timeout(1000).is_retryable());
        assert!(Error::Fetch(FetchError::transient("flaky")).is_retryable());

        assert!(!Error::config("test").is_retryable());
        assert!(!Error::Fetch(FetchError::new("fatal")).is_retryable());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }

    #[test]
    fn test_fetch_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "socket closed");
        let err = FetchError::from_error(io);

        assert_eq!(err.message(), "socket closed");
        assert!(err.cause().is_some());
        assert_eq!(err.source().unwrap().to_string(), "socket closed");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_fetch_error_from_boxed_unwraps_fetch_error() {
        let boxed: BoxError = Box::new(FetchError::transient("try again"));
        let err = FetchError::from_boxed(boxed);

        assert_eq!(err.message(), "try again");
        assert!(err.is_retryable());
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_fetch_error_from_crate_error() {
        let err = FetchError::from(Error::timeout(100));
        assert_eq!(err.message(), "Fetch timed out after 100ms");
        assert!(err.is_retryable());

        let inner = FetchError::new("boom");
        assert_eq!(FetchError::from(Error::Fetch(inner.clone())), inner);
    }

    #[test]
    fn test_fetch_error_from_strings() {
        let boxed: BoxError = "plain message".into();
        assert_eq!(FetchError::from_boxed(boxed).message(), "plain message");
        assert_eq!(FetchError::from("x").message(), "x");
        assert_eq!(FetchError::from(String::from("y")).message(), "y");
    }

    #[test]
    fn test_fetch_error_context_and_eq() {
        let err = FetchError::transient("reset").context("after 3 attempts");
        assert_eq!(err.to_string(), "after 3 attempts: reset");
        assert!(err.is_retryable());

        assert_eq!(FetchError::new("a"), FetchError::new("a"));
        assert_ne!(FetchError::new("a"), FetchError::transient("a"));
    }
}
