//! Entry page flows: validate the form, call the session store, and decide
//! where the visitor goes next and what notice they see.

use crate::{
    auth::{
        client::AuthTransport,
        forms::{LoginForm, SignupForm},
        guards::Navigator,
        state::SessionContext,
        types::{AuthOutcome, Role},
    },
    routes::{Area, EntryPage, dashboard_for, paths},
    validation::ValidationErrors,
};
use std::fmt;
use tracing::{debug, info};

pub const LOGIN_SUCCESS: &str = "Login successful";
pub const ADMIN_LOGIN_SUCCESS: &str = "Admin login successful!";
pub const NOT_ADMIN: &str = "You do not have admin privileges";
pub const SIGNUP_SUCCESS: &str = "Account created successfully!";
pub const LOGOUT_SUCCESS: &str = "Logged out successfully";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast-style message shown after an entry action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Form failed local validation; nothing was sent.
    Invalid(ValidationErrors),
    /// The backend refused or could not be reached; stay on the page.
    Rejected(Notice),
    /// Signed in, but not allowed through this entry.
    Denied { notice: Notice, redirect: String },
    Redirect { to: String, notice: Notice },
}

impl EntryOutcome {
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            EntryOutcome::Denied { redirect, .. } | EntryOutcome::Redirect { to: redirect, .. } => {
                Some(redirect.as_str())
            }
            EntryOutcome::Invalid(_) | EntryOutcome::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            EntryOutcome::Rejected(notice)
            | EntryOutcome::Denied { notice, .. }
            | EntryOutcome::Redirect { notice, .. } => Some(notice),
            EntryOutcome::Invalid(_) => None,
        }
    }
}

/// Logs in from `page`. The admin entry only lets admins through; a client who
/// signs in there keeps the session and is sent to the client dashboard.
pub async fn login_entry<T: AuthTransport>(
    context: &SessionContext<T>,
    page: EntryPage,
    form: &LoginForm,
) -> EntryOutcome {
    if let Err(errors) = form.validate() {
        return EntryOutcome::Invalid(errors);
    }

    let user = match context.login(&form.normalized_email(), &form.password).await {
        AuthOutcome::Success { user, .. } => user,
        AuthOutcome::Failure(failure) => {
            return EntryOutcome::Rejected(Notice::error(failure.message));
        }
    };

    match (page, user.role) {
        (EntryPage::AdminLogin, Role::Admin) => EntryOutcome::Redirect {
            to: paths::ADMIN_DASHBOARD.to_string(),
            notice: Notice::success(ADMIN_LOGIN_SUCCESS),
        },
        (EntryPage::AdminLogin, role) => {
            debug!(%role, "non-admin signed in through admin entry");
            EntryOutcome::Denied {
                notice: Notice::error(NOT_ADMIN),
                redirect: dashboard_for(role).to_string(),
            }
        }
        (_, role) => EntryOutcome::Redirect {
            to: dashboard_for(role).to_string(),
            notice: Notice::success(LOGIN_SUCCESS),
        },
    }
}

/// Creates an account and sends the visitor to the login page. The session is
/// not authenticated by signup.
pub async fn signup_entry<T: AuthTransport>(
    context: &SessionContext<T>,
    form: &SignupForm,
) -> EntryOutcome {
    if let Err(errors) = form.validate() {
        return EntryOutcome::Invalid(errors);
    }

    match context
        .signup(form.name.trim(), &form.normalized_email(), &form.password)
        .await
    {
        AuthOutcome::Success { .. } => EntryOutcome::Redirect {
            to: paths::LOGIN.to_string(),
            notice: Notice::success(SIGNUP_SUCCESS),
        },
        AuthOutcome::Failure(failure) => EntryOutcome::Rejected(Notice::error(failure.message)),
    }
}

/// Logs out from `area` and navigates to its login entry.
pub fn logout_from<T>(
    context: &SessionContext<T>,
    area: Area,
    navigator: &dyn Navigator,
) -> Notice {
    context.logout();
    let to = area.login_entry().path();
    info!(to, "logged out");
    navigator.navigate(to);
    Notice::success(LOGOUT_SUCCESS)
}
