//! Client wrappers for the auth endpoints. Every failure (server rejection,
//! malformed body, unreachable host) is folded into an [`AuthFailure`] here so
//! the session store never sees a transport error. Request bodies carry
//! passwords and must never be logged.

use crate::{
    api::ApiClient,
    auth::types::{
        AuthFailure, FieldErrors, LOGIN_FAILED_MESSAGE, LoginRequest, LoginResponse,
        SIGNUP_FAILED_MESSAGE, SignupRequest, SignupResponse,
    },
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";

/// Boundary to the remote auth endpoints.
pub trait AuthTransport: Send + Sync {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, AuthFailure>> + Send;

    fn signup(
        &self,
        request: &SignupRequest,
    ) -> impl Future<Output = Result<SignupResponse, AuthFailure>> + Send;
}

/// Auth transport over HTTP JSON.
#[derive(Clone, Debug)]
pub struct HttpAuthTransport {
    api: ApiClient,
}

impl HttpAuthTransport {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn post<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T, AuthFailure>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.api.post_json(path, body, None).await.map_err(|err| {
            warn!(path, error = %err, "auth request failed");
            AuthFailure::network()
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            warn!(path, error = %err, "failed to read auth response body");
            AuthFailure::network()
        })?;

        if status.is_success() {
            serde_json::from_slice::<T>(&bytes).map_err(|err| {
                warn!(path, error = %err, "auth response did not match the expected payload");
                AuthFailure::malformed()
            })
        } else {
            let failure = rejection(status.as_u16(), &bytes, fallback);
            debug!(
                path,
                status = status.as_u16(),
                message = %failure.message,
                "auth request rejected"
            );
            Err(failure)
        }
    }
}

impl AuthTransport for HttpAuthTransport {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthFailure> {
        self.post(LOGIN_PATH, request, LOGIN_FAILED_MESSAGE).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse, AuthFailure> {
        self.post(SIGNUP_PATH, request, SIGNUP_FAILED_MESSAGE).await
    }
}

/// Builds the failure for a non-2xx response, reading `message`/`errors` from a
/// JSON body when there is one.
fn rejection(status: u16, body: &[u8], fallback: &str) -> AuthFailure {
    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return AuthFailure::rejected(status, fallback, None);
    };

    let message = json
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback);
    let errors = json
        .get("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok());

    AuthFailure::rejected(status, message, errors)
}
