//! Scripted auth transport and fixtures shared by the unit tests.

use crate::auth::{
    client::AuthTransport,
    types::{
        AuthFailure, LoginRequest, LoginResponse, Role, SignupRequest, SignupResponse, User,
        UserEnvelope,
    },
};
use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

pub(crate) fn admin() -> User {
    User {
        id: "1".to_string(),
        name: "Root".to_string(),
        email: "root@acme.com".to_string(),
        role: Role::Admin,
        status: "active".to_string(),
        avatar: None,
    }
}

pub(crate) fn client() -> User {
    User {
        id: "2".to_string(),
        name: "Ada".to_string(),
        email: "ada@acme.com".to_string(),
        role: Role::Client,
        status: "active".to_string(),
        avatar: None,
    }
}

enum Script {
    Login(VecDeque<Result<LoginResponse, AuthFailure>>),
    Signup(Result<SignupResponse, AuthFailure>),
    Hanging,
}

/// Transport that replays canned results in order.
pub(crate) struct ScriptedTransport {
    script: Mutex<Script>,
    emails: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn login_response(user: User, token: Option<&str>) -> LoginResponse {
        LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            data: UserEnvelope { user },
            token: token.map(str::to_string),
        }
    }

    fn scripted(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            emails: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sequence(results: Vec<Result<LoginResponse, AuthFailure>>) -> Self {
        Self::scripted(Script::Login(results.into()))
    }

    pub(crate) fn login_ok(user: User, token: Option<&str>) -> Self {
        Self::sequence(vec![Ok(Self::login_response(user, token))])
    }

    pub(crate) fn login_err(failure: AuthFailure) -> Self {
        Self::sequence(vec![Err(failure)])
    }

    pub(crate) fn signup_ok(user: User) -> Self {
        Self::scripted(Script::Signup(Ok(SignupResponse {
            success: true,
            message: "Account created".to_string(),
            data: UserEnvelope { user },
        })))
    }

    /// Never settles; used to model a request abandoned mid-flight.
    pub(crate) fn hanging() -> Self {
        Self::scripted(Script::Hanging)
    }

    /// Emails of every request received, in order.
    pub(crate) fn sent_emails(&self) -> Vec<String> {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, email: &str) {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.to_string());
    }

    fn next_login(&self) -> Option<Result<LoginResponse, AuthFailure>> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *script {
            Script::Login(queue) => Some(
                queue
                    .pop_front()
                    .unwrap_or_else(|| Err(AuthFailure::network())),
            ),
            Script::Signup(_) => Some(Err(AuthFailure::network())),
            Script::Hanging => None,
        }
    }

    fn next_signup(&self) -> Option<Result<SignupResponse, AuthFailure>> {
        let script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        match &*script {
            Script::Signup(result) => Some(result.clone()),
            Script::Login(_) => Some(Err(AuthFailure::network())),
            Script::Hanging => None,
        }
    }
}

impl AuthTransport for ScriptedTransport {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthFailure> {
        self.record(&request.email);
        match self.next_login() {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse, AuthFailure> {
        self.record(&request.email);
        match self.next_signup() {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
