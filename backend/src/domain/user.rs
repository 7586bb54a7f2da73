//! User identity model.
//!
//! Users are read-only here: the service checks that a username exists and
//! resolves it to the internal identifier the preferences table references.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameValidationError {
    /// The name has no characters at all.
    #[error("username must not be empty")]
    Empty,
}

/// External user identity taken from the request path.
///
/// The only invariant is that the name is non-empty. `users.username` is
/// unbounded text, so padded or very long names are passed through and
/// resolved by the store like any other.
///
/// # Examples
/// ```
/// use user_preferences::domain::Username;
///
/// let name = Username::new("test-user").expect("valid username");
/// assert_eq!(name.as_ref(), "test-user");
/// assert!(Username::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from borrowed input.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UsernameValidationError> {
        Self::from_owned(name.as_ref().to_owned())
    }

    fn from_owned(name: String) -> Result<Self, UsernameValidationError> {
        if name.is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Internal user identifier used as the preferences foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap a UUID read from storage.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
