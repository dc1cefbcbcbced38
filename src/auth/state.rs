//! Session state and the context object that owns it. The context is created
//! once per process from a storage port and an auth transport, rehydrates the
//! persisted session on open, and notifies subscribers synchronously after
//! every change. Tokens stay in memory and in the storage record only; they are
//! never logged.

use crate::auth::{
    client::AuthTransport,
    storage::SessionStorage,
    types::{AuthOutcome, LoginRequest, Role, SignupRequest, User, UserPatch},
};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError, Weak},
};
use tracing::{debug, info, warn};

/// The current process's authentication state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
    is_authenticated: bool,
    is_loading: bool,
}

impl Session {
    /// Session established by a successful login.
    #[must_use]
    pub fn authenticated(user: User, token: Option<String>) -> Self {
        Self {
            user: Some(user),
            token,
            is_authenticated: true,
            is_loading: false,
        }
    }

    /// Rebuilds a persisted session. Authentication without a user is dropped.
    pub(crate) fn restore(
        user: Option<User>,
        token: Option<String>,
        is_authenticated: bool,
    ) -> Self {
        let is_authenticated = is_authenticated && user.is_some();
        Self {
            user,
            token,
            is_authenticated,
            is_loading: false,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role() == Some(Role::Client)
    }

    fn clear(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Registration returned by [`SessionContext::subscribe`]. Dropping it stops
/// notifications.
#[must_use = "dropping a subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<Observers>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Owner of the session: the only writer of the session and its storage record.
pub struct SessionContext<T> {
    transport: T,
    storage: Box<dyn SessionStorage>,
    session: Mutex<Session>,
    /// Held across mutate, persist and notify so changes land in order.
    writer: Mutex<()>,
    observers: Arc<Mutex<Observers>>,
}

impl<T> SessionContext<T> {
    /// Opens the context, rehydrating whatever the storage port holds. An
    /// unreadable record is discarded and the session starts empty.
    pub fn open(storage: impl SessionStorage + 'static, transport: T) -> Self {
        let session = match storage.load() {
            Ok(Some(session)) => {
                debug!(
                    authenticated = session.is_authenticated(),
                    "rehydrated persisted session"
                );
                session
            }
            Ok(None) => Session::default(),
            Err(err) => {
                warn!(error = %err, "discarding unreadable persisted session");
                Session::default()
            }
        };

        Self {
            transport,
            storage: Box::new(storage),
            session: Mutex::new(session),
            writer: Mutex::new(()),
            observers: Arc::new(Mutex::new(Observers::default())),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock_session().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock_session().user.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock_session().token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_session().is_authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock_session().is_loading
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.lock_session().is_admin()
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.lock_session().is_client()
    }

    /// Registers `listener` to run after every session change with the new
    /// session. Listeners run on the mutating thread after the change is
    /// persisted; they may read the context but must not mutate it.
    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> Subscription {
        let mut observers = self.lock_observers();
        observers.next_id += 1;
        let id = observers.next_id;
        observers.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    /// Clears the session. No network call; calling it again changes nothing.
    pub fn logout(&self) {
        let changed = self.update(Session::clear);
        if changed {
            info!("session cleared");
        }
    }

    /// Merges `patch` into the current user. No-op when logged out.
    pub fn update_user(&self, patch: UserPatch) {
        self.update(|session| {
            if let Some(user) = session.user.as_mut() {
                patch.apply(user);
            }
        });
    }

    /// Logs out, persists the empty session and drops every subscriber.
    pub fn destroy(self) {
        self.logout();
        self.lock_observers().listeners.clear();
        debug!("session context destroyed");
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Observers> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` as one atomic change. When the session actually
    /// changed it is persisted and every subscriber is notified before the
    /// next change may start. Returns whether anything changed.
    fn update(&self, mutate: impl FnOnce(&mut Session)) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut session = self.lock_session();
            let before = session.clone();
            mutate(&mut session);
            if *session == before {
                return false;
            }
            session.clone()
        };

        if let Err(err) = self.storage.save(&snapshot) {
            warn!(error = %err, "failed to persist session");
        }

        let listeners: Vec<Listener> = self
            .lock_observers()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    fn begin_loading(&self) -> LoadingGuard<'_, T> {
        self.update(|session| session.is_loading = true);
        LoadingGuard { context: self }
    }
}

impl<T: AuthTransport> SessionContext<T> {
    /// Authenticates against the backend. On success the user, token and
    /// authentication flag are set in one change; on any failure the session is
    /// left as it was. The loading flag is cleared on every path, including when
    /// the returned future is dropped before it settles.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let _loading = self.begin_loading();
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.transport.login(&request).await {
            Ok(response) => {
                let user = response.data.user;
                let token = response.token.filter(|token| !token.is_empty());
                let established = Session::authenticated(user.clone(), token);
                self.update(|session| *session = established);
                info!(user_id = %user.id, role = %user.role, "session established");
                AuthOutcome::success(user, &response.message)
            }
            Err(failure) => {
                debug!(message = %failure.message, "login failed");
                AuthOutcome::Failure(failure)
            }
        }
    }

    /// Creates an account. Success only confirms the account; the session is not
    /// authenticated and the returned user is for display.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let _loading = self.begin_loading();
        let request = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.transport.signup(&request).await {
            Ok(response) => {
                info!(user_id = %response.data.user.id, "account created");
                AuthOutcome::success(response.data.user, &response.message)
            }
            Err(failure) => {
                debug!(message = %failure.message, "signup failed");
                AuthOutcome::Failure(failure)
            }
        }
    }
}

impl<T> fmt::Debug for SessionContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session", &*self.lock_session())
            .field("observers", &self.lock_observers().listeners.len())
            .finish_non_exhaustive()
    }
}

/// Clears the loading flag when the in-flight call settles or is dropped.
struct LoadingGuard<'a, T> {
    context: &'a SessionContext<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.context.update(|session| session.is_loading = false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        guards::{GuardConfig, GuardState, HistoryNavigator, RouteGuard},
        storage::{MemoryStorage, StorageError, decode},
        test_support::{ScriptedTransport, admin, client},
        types::{AuthFailure, FailureKind},
    };
    use std::{sync::Arc, time::Duration};

    fn open(transport: ScriptedTransport) -> SessionContext<ScriptedTransport> {
        SessionContext::open(MemoryStorage::new(), transport)
    }

    #[tokio::test]
    async fn login_success_establishes_session() {
        let context = open(ScriptedTransport::login_ok(admin(), Some("t1")));

        let outcome = context.login("a@b.com", "x").await;

        assert_eq!(outcome.user().map(|u| u.role), Some(Role::Admin));
        assert!(context.is_authenticated());
        assert!(!context.is_loading());
        assert_eq!(context.token().as_deref(), Some("t1"));
        assert!(context.is_admin());
        assert!(!context.is_client());
    }

    #[tokio::test]
    async fn login_failure_leaves_session_empty() {
        let context = open(ScriptedTransport::login_err(AuthFailure::rejected(
            401,
            "Invalid credentials",
            None,
        )));

        let outcome = context.login("a@b.com", "x").await;

        assert_eq!(outcome.message(), Some("Invalid credentials"));
        assert!(!outcome.is_success());
        assert!(!context.is_authenticated());
        assert!(!context.is_loading());
        assert_eq!(context.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn every_login_attempt_settles_with_loading_cleared() {
        let context = open(ScriptedTransport::sequence(vec![
            Err(AuthFailure::network()),
            Err(AuthFailure::malformed()),
            Ok(ScriptedTransport::login_response(client(), None)),
        ]));

        for _ in 0..3 {
            let outcome = context.login("a@b.com", "x").await;
            assert!(!context.is_loading());
            assert!(outcome.is_success() != outcome.user().is_none());
        }
        assert!(context.is_client());
        assert_eq!(context.token(), None);
    }

    #[tokio::test]
    async fn subscribers_see_loading_bracket() {
        let context = open(ScriptedTransport::login_err(AuthFailure::network()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = context.subscribe(move |session| {
            sink.lock().unwrap().push(session.is_loading());
        });

        let outcome = context.login("a@b.com", "x").await;

        assert!(matches!(
            outcome,
            AuthOutcome::Failure(AuthFailure {
                kind: FailureKind::Network,
                ..
            })
        ));
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn dropped_login_does_not_leave_loading_stuck() {
        let context = open(ScriptedTransport::hanging());

        let result =
            tokio::time::timeout(Duration::from_millis(20), context.login("a@b.com", "x")).await;

        assert!(result.is_err());
        assert!(!context.is_loading());
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn signup_does_not_authenticate() {
        let context = open(ScriptedTransport::signup_ok(client()));

        let outcome = context.signup("Ada", "ada@acme.com", "longenough").await;

        assert_eq!(outcome.user(), Some(&client()));
        assert!(!context.is_authenticated());
        assert_eq!(context.user(), None);
        assert!(!context.is_loading());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let context = open(ScriptedTransport::login_ok(client(), Some("t1")));
        context.login("a@b.com", "x").await;

        context.logout();
        let once = context.snapshot();
        context.logout();

        assert_eq!(context.snapshot(), once);
        assert_eq!(once, Session::default());
        assert!(!context.is_admin());
        assert!(!context.is_client());
    }

    #[test]
    fn logout_twice_notifies_once() {
        let storage = MemoryStorage::new();
        storage
            .save(&Session::authenticated(client(), None))
            .unwrap();
        let context = SessionContext::open(storage, ScriptedTransport::hanging());
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let _subscription = context.subscribe(move |_| *counter.lock().unwrap() += 1);

        context.logout();
        context.logout();

        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn update_user_merges_into_current_user() {
        let context = open(ScriptedTransport::login_ok(client(), Some("t1")));
        context.update_user(UserPatch {
            name: Some("ignored".to_string()),
            ..UserPatch::default()
        });
        assert_eq!(context.user(), None);

        context.login("a@b.com", "x").await;
        context.update_user(UserPatch {
            name: Some("Ada Lovelace".to_string()),
            ..UserPatch::default()
        });

        let user = context.user().unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.role, Role::Client);
        assert_eq!(context.token().as_deref(), Some("t1"));
        assert!(context.is_authenticated());
    }

    #[tokio::test]
    async fn every_change_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let context = SessionContext::open(
            SharedStorage(Arc::clone(&storage)),
            ScriptedTransport::login_ok(admin(), Some("t1")),
        );

        context.login("a@b.com", "x").await;
        let stored = decode(&storage.record().unwrap()).unwrap();
        assert!(stored.is_authenticated());
        assert_eq!(stored.token(), Some("t1"));

        context.logout();
        let stored = decode(&storage.record().unwrap()).unwrap();
        assert_eq!(stored, Session::default());
    }

    #[test]
    fn open_rehydrates_and_discards_garbage() {
        let storage = MemoryStorage::new();
        storage
            .save(&Session::authenticated(admin(), Some("t9".to_string())))
            .unwrap();
        let context = SessionContext::open(storage, ScriptedTransport::hanging());
        assert!(context.is_admin());
        assert_eq!(context.token().as_deref(), Some("t9"));

        let context = SessionContext::open(
            MemoryStorage::with_record("garbage"),
            ScriptedTransport::hanging(),
        );
        assert_eq!(context.snapshot(), Session::default());
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let storage = MemoryStorage::new();
        storage
            .save(&Session::authenticated(client(), None))
            .unwrap();
        let context = SessionContext::open(storage, ScriptedTransport::hanging());
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let subscription = context.subscribe(move |_| *counter.lock().unwrap() += 1);
        drop(subscription);

        context.logout();

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn credentials_are_sent_as_given() {
        let context = open(ScriptedTransport::login_ok(client(), None));

        context.login(" Ada@Acme.com ", "x").await;

        assert_eq!(
            context.transport().sent_emails(),
            vec![" Ada@Acme.com ".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn logout_during_slow_save_is_persisted_last() {
        let storage = Arc::new(MemoryStorage::new());
        let context = Arc::new(SessionContext::open(
            SlowStorage(Arc::clone(&storage)),
            ScriptedTransport::login_ok(admin(), Some("t1")),
        ));
        let navigator = Arc::new(HistoryNavigator::new());
        let mut guard = RouteGuard::new(GuardConfig::authenticated(), navigator);
        guard.mount(context.as_ref());

        let pending = Arc::clone(&context);
        let login = tokio::spawn(async move { pending.login("a@b.com", "x").await });
        while !context.is_authenticated() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let closing = Arc::clone(&context);
        tokio::task::spawn_blocking(move || closing.logout())
            .await
            .unwrap();
        login.await.unwrap();

        assert!(!context.is_authenticated());
        let stored = decode(&storage.record().unwrap()).unwrap();
        assert_eq!(stored, Session::default());
        assert_eq!(guard.state(), GuardState::Unauthenticated);
    }

    #[test]
    fn destroy_persists_empty_session_and_releases_listeners() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(&Session::authenticated(client(), Some("t1".to_string())))
            .unwrap();
        let context = SessionContext::open(
            SharedStorage(Arc::clone(&storage)),
            ScriptedTransport::hanging(),
        );
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let subscription = context.subscribe(move |_| *counter.lock().unwrap() += 1);

        context.destroy();

        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(Arc::strong_count(&calls), 1);
        let stored = decode(&storage.record().unwrap()).unwrap();
        assert_eq!(stored, Session::default());
        drop(subscription);
    }

    #[test]
    fn debug_redacts_token() {
        let session = Session::authenticated(admin(), Some("secret-token".to_string()));
        assert!(!format!("{session:?}").contains("secret-token"));
    }

    struct SharedStorage(Arc<MemoryStorage>);

    impl SessionStorage for SharedStorage {
        fn load(&self) -> Result<Option<Session>, crate::auth::storage::StorageError> {
            self.0.load()
        }

        fn save(&self, session: &Session) -> Result<(), crate::auth::storage::StorageError> {
            self.0.save(session)
        }
    }

    /// Takes its time writing authenticated sessions.
    struct SlowStorage(Arc<MemoryStorage>);

    impl SessionStorage for SlowStorage {
        fn load(&self) -> Result<Option<Session>, StorageError> {
            self.0.load()
        }

        fn save(&self, session: &Session) -> Result<(), StorageError> {
            if session.is_authenticated() {
                std::thread::sleep(Duration::from_millis(200));
            }
            self.0.save(session)
        }
    }
}
