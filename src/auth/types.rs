//! Request and response types for the auth endpoints plus the uniform outcome
//! returned to entry pages. Passwords and tokens travel through these types, so
//! their `Debug` output is redacted.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Unexpected response from the server. Please try again.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Profile fields a page may change locally. Identity and role are owned by the
/// backend and cannot be patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl UserPatch {
    /// Applies the patch, returning true when any field changed.
    pub fn apply(self, user: &mut User) -> bool {
        let before = user.clone();
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        *user != before
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: UserEnvelope,
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("success", &self.success)
            .field("message", &self.message)
            .field("data", &self.data)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: UserEnvelope,
}

/// Field name to server-side validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with a non-2xx status.
    Rejected { status: u16 },
    /// The server answered 2xx but the body was not the expected payload.
    Malformed,
    /// No usable response: unreachable host, timeout, invalid URL.
    Network,
}

/// Normalized failure of an auth call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

impl AuthFailure {
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            kind: FailureKind::Rejected { status },
            message: message.into(),
            errors,
        }
    }

    #[must_use]
    pub fn malformed() -> Self {
        Self {
            kind: FailureKind::Malformed,
            message: MALFORMED_RESPONSE_MESSAGE.to_string(),
            errors: None,
        }
    }

    #[must_use]
    pub fn network() -> Self {
        Self {
            kind: FailureKind::Network,
            message: NETWORK_ERROR_MESSAGE.to_string(),
            errors: None,
        }
    }
}

/// Settled result of a login or signup call. Exactly one variant is produced
/// per call and the session's loading flag is already cleared when it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { user: User, message: Option<String> },
    Failure(AuthFailure),
}

impl AuthOutcome {
    pub(crate) fn success(user: User, message: &str) -> Self {
        let message = message.trim();
        AuthOutcome::Success {
            user,
            message: (!message.is_empty()).then(|| message.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthOutcome::Success { user, .. } => Some(user),
            AuthOutcome::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success { message, .. } => message.as_deref(),
            AuthOutcome::Failure(failure) => Some(&failure.message),
        }
    }
}
