//! Login and signup form input with the constraints the entry pages enforce
//! before any request is made.

use crate::validation::{ValidationErrors, normalize_email};
use std::fmt;

pub const MIN_LOGIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_SIGNUP_PASSWORD_LENGTH: usize = 8;
pub const MIN_NAME_LENGTH: usize = 2;

#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// # Errors
    /// Returns the per-field failures when any constraint is unmet.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.email("email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_LOGIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_LOGIN_PASSWORD_LENGTH} characters"),
            );
        }
        errors.into_result()
    }

    #[must_use]
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// # Errors
    /// Returns the per-field failures when any constraint is unmet.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars(
            "name",
            &self.name,
            MIN_NAME_LENGTH,
            "Name must be at least 2 characters",
        );
        errors.email("email", &self.email);
        if self.password.chars().count() < MIN_SIGNUP_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_SIGNUP_PASSWORD_LENGTH} characters"),
            );
        }
        if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords do not match");
        }
        errors.into_result()
    }

    #[must_use]
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}
