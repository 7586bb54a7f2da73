//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the domain only decides the category and the message.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{TraceId, Username};

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The username does not resolve to a known user.
    UnknownUser,
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// An unexpected error occurred inside the domain or its adapters.
    InternalError,
}

/// Domain error payload.
///
/// Captures the ambient [`TraceId`] on construction so adapters can echo it.
///
/// # Examples
/// ```
/// use user_preferences::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_request("bad");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.message(), "bad");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error in the current trace scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured when the error was raised.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach an explicit trace identifier.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// The username has no matching user. The message is the JSON object
    /// `{"user": <username>}` so clients can tell which name was rejected.
    ///
    /// # Examples
    /// ```
    /// use user_preferences::domain::{Error, Username};
    ///
    /// let username = Username::new("test-user").expect("valid username");
    /// let err = Error::unknown_user(&username);
    /// assert_eq!(err.message(), r#"{"user":"test-user"}"#);
    /// ```
    pub fn unknown_user(username: &Username) -> Self {
        Self::unknown_user_name(username.as_ref())
    }

    /// Same as [`Error::unknown_user`] for a raw path segment that never
    /// became a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use user_preferences::domain::Error;
    ///
    /// let err = Error::unknown_user_name(" ghost");
    /// assert_eq!(err.message(), r#"{"user":" ghost"}"#);
    /// ```
    pub fn unknown_user_name(name: &str) -> Self {
        Self::new(ErrorCode::UnknownUser, json!({ "user": name }).to_string())
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
