//! Route guards for protected page shells and entry pages. A guard starts in
//! `Initializing`, makes its first decision on mount, and re-decides on every
//! session change through a [`Subscription`]. Content is only produced once a
//! decision allows it.
//!
//! Guards are UX only; real access control must live on the API.

use crate::{
    auth::state::{Session, SessionContext, Subscription},
    routes::{dashboard_for, paths},
};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;

/// Client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that records every navigation, newest last.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.history().last().cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    pub require_admin: bool,
    pub require_client: bool,
    pub redirect_to: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            require_admin: false,
            require_client: false,
            redirect_to: paths::LOGIN.to_string(),
        }
    }
}

impl GuardConfig {
    /// Any authenticated session passes.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn admin() -> Self {
        Self {
            require_admin: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn client() -> Self {
        Self {
            require_client: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }

    fn role_allowed(&self, session: &Session) -> bool {
        if self.require_admin && !session.is_admin() {
            return false;
        }
        !self.require_client || session.is_client()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Initializing,
    Unauthenticated,
    Authorized,
    Forbidden,
}

impl GuardState {
    #[must_use]
    pub fn redirects(self) -> bool {
        matches!(self, GuardState::Unauthenticated | GuardState::Forbidden)
    }
}

/// Decision for `session` under `config`. A session with a login in flight is
/// not decided yet.
#[must_use]
pub fn evaluate(config: &GuardConfig, session: &Session) -> GuardState {
    if session.is_loading() {
        GuardState::Initializing
    } else if !session.is_authenticated() {
        GuardState::Unauthenticated
    } else if config.role_allowed(session) {
        GuardState::Authorized
    } else {
        GuardState::Forbidden
    }
}

/// What a guarded shell shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered<V> {
    /// Neutral loading indicator; nothing protected is visible.
    Loading,
    /// Redirect pending; render nothing.
    Nothing,
    Content(V),
}

/// Shared state/subscription plumbing for both guard kinds.
struct Watch<S> {
    state: Arc<Mutex<S>>,
    subscription: Option<Subscription>,
}

impl<S: Copy + PartialEq + fmt::Debug + Send + 'static> Watch<S> {
    fn new(initial: S) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
            subscription: None,
        }
    }

    fn get(&self) -> S {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes first so no change between the first decision and the
    /// registration is missed, then decides on the current snapshot.
    fn mount<T, F>(&mut self, context: &SessionContext<T>, navigator: Arc<dyn Navigator>, decide: F)
    where
        F: Fn(&Session) -> (S, Option<String>) + Send + Sync + 'static,
    {
        let decide = Arc::new(decide);
        let state = Arc::clone(&self.state);
        let listener_navigator = Arc::clone(&navigator);
        let listener_decide = Arc::clone(&decide);
        self.subscription = Some(context.subscribe(move |session| {
            transition(&state, listener_navigator.as_ref(), (*listener_decide)(session));
        }));

        transition(&self.state, navigator.as_ref(), (*decide)(&context.snapshot()));
    }

    fn unmount(&mut self) {
        self.subscription = None;
    }
}

/// Stores the new state and navigates when entering a redirecting state.
fn transition<S: Copy + PartialEq + fmt::Debug>(
    state: &Mutex<S>,
    navigator: &dyn Navigator,
    (next, redirect): (S, Option<String>),
) {
    let previous = {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, next)
    };
    if previous == next {
        return;
    }
    debug!(?previous, ?next, "guard transition");
    if let Some(path) = redirect {
        navigator.navigate(&path);
    }
}

/// Guard wrapped around a protected subtree.
pub struct RouteGuard {
    config: GuardConfig,
    navigator: Arc<dyn Navigator>,
    watch: Watch<GuardState>,
}

impl RouteGuard {
    pub fn new(config: GuardConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            config,
            navigator,
            watch: Watch::new(GuardState::Initializing),
        }
    }

    /// Runs the first evaluation and keeps re-evaluating on session changes
    /// until unmounted or dropped.
    pub fn mount<T>(&mut self, context: &SessionContext<T>) {
        let config = self.config.clone();
        self.watch
            .mount(context, Arc::clone(&self.navigator), move |session| {
                let state = evaluate(&config, session);
                let redirect = state.redirects().then(|| config.redirect_to.clone());
                (state, redirect)
            });
    }

    pub fn unmount(&mut self) {
        self.watch.unmount();
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.watch.get()
    }

    /// Produces `content` only when the session is authorized.
    pub fn render<V>(&self, content: impl FnOnce() -> V) -> Rendered<V> {
        match self.state() {
            GuardState::Initializing => Rendered::Loading,
            GuardState::Unauthenticated | GuardState::Forbidden => Rendered::Nothing,
            GuardState::Authorized => Rendered::Content(content()),
        }
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    Initializing,
    /// Visitor is signed out; the entry page is shown.
    Open,
    /// Already signed in; forwarded to the role's dashboard.
    SignedIn,
}

/// Guard for login/signup pages: signed-in sessions are sent to their dashboard.
pub struct EntryGuard {
    navigator: Arc<dyn Navigator>,
    watch: Watch<EntryState>,
}

impl EntryGuard {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            watch: Watch::new(EntryState::Initializing),
        }
    }

    pub fn mount<T>(&mut self, context: &SessionContext<T>) {
        self.watch
            .mount(context, Arc::clone(&self.navigator), |session| {
                match session.role().filter(|_| session.is_authenticated()) {
                    Some(role) => (EntryState::SignedIn, Some(dashboard_for(role).to_string())),
                    None => (EntryState::Open, None),
                }
            });
    }

    pub fn unmount(&mut self) {
        self.watch.unmount();
    }

    #[must_use]
    pub fn state(&self) -> EntryState {
        self.watch.get()
    }

    pub fn render<V>(&self, page: impl FnOnce() -> V) -> Rendered<V> {
        match self.state() {
            EntryState::Initializing => Rendered::Loading,
            EntryState::SignedIn => Rendered::Nothing,
            EntryState::Open => Rendered::Content(page()),
        }
    }
}

impl fmt::Debug for EntryGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryGuard")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        storage::{MemoryStorage, SessionStorage},
        test_support::{ScriptedTransport, admin, client},
        types::User,
    };

    fn context_with(user: Option<User>) -> SessionContext<ScriptedTransport> {
        let storage = MemoryStorage::new();
        if let Some(user) = user {
            storage.save(&Session::authenticated(user, None)).unwrap();
        }
        SessionContext::open(storage, ScriptedTransport::hanging())
    }

    fn guard(config: GuardConfig) -> (RouteGuard, Arc<HistoryNavigator>) {
        let navigator = Arc::new(HistoryNavigator::new());
        (RouteGuard::new(config, navigator.clone()), navigator)
    }

    #[test]
    fn initializing_before_mount_renders_loading() {
        let (guard, navigator) = guard(GuardConfig::default());
        assert_eq!(guard.state(), GuardState::Initializing);
        assert_eq!(guard.render(|| "secret"), Rendered::Loading);
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn empty_session_redirects_to_login() {
        let context = context_with(None);
        let (mut guard, navigator) = guard(GuardConfig::default());
        let mut rendered_content = false;

        guard.mount(&context);
        let view = guard.render(|| rendered_content = true);

        assert_eq!(guard.state(), GuardState::Unauthenticated);
        assert_eq!(view, Rendered::Nothing);
        assert!(!rendered_content);
        assert_eq!(navigator.history(), vec![paths::LOGIN.to_string()]);
    }

    #[test]
    fn client_on_admin_guard_is_forbidden() {
        let context = context_with(Some(client()));
        let (mut guard, navigator) = guard(GuardConfig::admin().redirect_to(paths::ADMIN_LOGIN));

        guard.mount(&context);

        assert_eq!(guard.state(), GuardState::Forbidden);
        assert_eq!(guard.render(|| "admin"), Rendered::Nothing);
        assert_eq!(navigator.current().as_deref(), Some(paths::ADMIN_LOGIN));
    }

    #[test]
    fn admin_on_admin_guard_renders() {
        let context = context_with(Some(admin()));
        let (mut guard, navigator) = guard(GuardConfig::admin().redirect_to(paths::ADMIN_LOGIN));

        guard.mount(&context);

        assert_eq!(guard.state(), GuardState::Authorized);
        assert_eq!(guard.render(|| "admin"), Rendered::Content("admin"));
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn admin_on_client_guard_is_forbidden() {
        let context = context_with(Some(admin()));
        let (mut guard, _) = guard(GuardConfig::client());
        guard.mount(&context);
        assert_eq!(guard.state(), GuardState::Forbidden);
    }

    #[test]
    fn external_logout_collapses_every_mounted_guard() {
        let context = context_with(Some(admin()));
        let (mut portal, portal_nav) = guard(GuardConfig::authenticated());
        let (mut admin_area, admin_nav) =
            guard(GuardConfig::admin().redirect_to(paths::ADMIN_LOGIN));
        portal.mount(&context);
        admin_area.mount(&context);
        assert_eq!(portal.state(), GuardState::Authorized);
        assert_eq!(admin_area.state(), GuardState::Authorized);

        context.logout();

        assert_eq!(portal.state(), GuardState::Unauthenticated);
        assert_eq!(admin_area.state(), GuardState::Unauthenticated);
        assert_eq!(portal_nav.history(), vec![paths::LOGIN.to_string()]);
        assert_eq!(admin_nav.history(), vec![paths::ADMIN_LOGIN.to_string()]);
    }

    #[tokio::test]
    async fn login_in_flight_holds_guard_in_initializing() {
        let context = Arc::new(context_with(None));
        let (mut guard, navigator) = guard(GuardConfig::authenticated());
        guard.mount(context.as_ref());
        assert_eq!(navigator.history().len(), 1);

        let pending = Arc::clone(&context);
        let task = tokio::spawn(async move { pending.login("a@b.com", "x").await });
        tokio::task::yield_now().await;
        while !context.is_loading() {
            tokio::task::yield_now().await;
        }

        assert_eq!(guard.state(), GuardState::Initializing);
        assert_eq!(guard.render(|| "secret"), Rendered::Loading);

        task.abort();
        let _ = task.await;
        assert_eq!(guard.state(), GuardState::Unauthenticated);
        assert_eq!(navigator.history().len(), 2);
    }

    #[test]
    fn unchanged_decisions_do_not_navigate_again() {
        let context = context_with(Some(client()));
        let (mut guard, navigator) = guard(GuardConfig::admin());
        guard.mount(&context);

        context.update_user(crate::auth::types::UserPatch {
            name: Some("Ada L.".to_string()),
            ..Default::default()
        });

        assert_eq!(navigator.history().len(), 1);
    }

    #[test]
    fn unmounted_guard_ignores_changes() {
        let context = context_with(Some(client()));
        let (mut guard, navigator) = guard(GuardConfig::authenticated());
        guard.mount(&context);
        guard.unmount();

        context.logout();

        assert_eq!(guard.state(), GuardState::Authorized);
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn entry_guard_forwards_signed_in_sessions() {
        let context = context_with(Some(admin()));
        let navigator = Arc::new(HistoryNavigator::new());
        let mut entry = EntryGuard::new(navigator.clone());
        assert_eq!(entry.render(|| "form"), Rendered::Loading);

        entry.mount(&context);

        assert_eq!(entry.state(), EntryState::SignedIn);
        assert_eq!(entry.render(|| "form"), Rendered::Nothing);
        assert_eq!(navigator.current().as_deref(), Some(paths::ADMIN_DASHBOARD));

        context.logout();
        assert_eq!(entry.state(), EntryState::Open);
        assert_eq!(entry.render(|| "form"), Rendered::Content("form"));
    }

    #[test]
    fn entry_guard_shows_page_when_signed_out() {
        let context = context_with(None);
        let navigator = Arc::new(HistoryNavigator::new());
        let mut entry = EntryGuard::new(navigator.clone());
        entry.mount(&context);
        assert_eq!(entry.state(), EntryState::Open);
        assert!(navigator.history().is_empty());
    }
}
