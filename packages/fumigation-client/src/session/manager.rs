//! Authentication context: who is signed in, and keeping their token fresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::router::{guard, landing_route, Guarded, Route};
use super::TokenStore;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{ApiClient, ApiResponse};
use crate::types::{Credentials, LoginResponse, User};

pub const ME_PATH: &str = "/users/me";

/// Where the session stands.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Startup verification has not finished.
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Owns the login/logout lifecycle and the background token refresh.
///
/// Create one per process, call [`init`](Self::init) once, share it behind an
/// `Arc`, and call [`teardown`](Self::teardown) (or drop it) on shutdown.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<TokenStore>,
    refresh_interval: Duration,
    state_tx: Arc<watch::Sender<AuthState>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    mirror_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, config: &ClientConfig) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Loading);
        Self {
            store: api.store().clone(),
            api,
            refresh_interval: config.refresh_interval,
            state_tx: Arc::new(state_tx),
            refresh_task: Mutex::new(None),
            mirror_task: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Verify any stored session against the server.
    ///
    /// `Loading` becomes `Authenticated` when a stored token and user exist and
    /// `GET /users/me` succeeds; otherwise the session is cleared and the state
    /// becomes `Unauthenticated`.
    pub async fn init(&self) -> AuthState {
        self.start_mirror();

        if !self.store.is_authenticated() {
            self.store.clear();
            tracing::info!("No stored session");
            return self.transition(AuthState::Unauthenticated);
        }

        match self.api.get::<User>(ME_PATH).await {
            Ok(ApiResponse::Success(user)) => {
                self.store.update_user(&user);
                self.start_refresh();
                tracing::info!(email = %user.email, "Stored session verified");
                self.transition(AuthState::Authenticated(user))
            }
            Ok(ApiResponse::Failure(failure)) => {
                tracing::info!(error = %failure, "Stored session rejected; signing out");
                self.store.clear();
                self.transition(AuthState::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read the current user; signing out");
                self.store.clear();
                self.transition(AuthState::Unauthenticated)
            }
        }
    }

    /// Stop background work. Storage is left as is.
    pub fn teardown(&self) {
        abort_slot(&self.refresh_task);
        abort_slot(&self.mirror_task);
    }

    /// Adopt a login answer: store the normalized user and token, start the
    /// refresh timer.
    pub fn login(&self, data: LoginResponse, remember_me: bool) -> Result<User> {
        let user = data.user.ok_or_else(|| {
            ClientError::decode(crate::http::LOGIN_PATH, "login response has no user")
        })?;

        self.store
            .set(&data.token, data.token_type.as_deref(), &user, remember_me);
        self.store.set_refresh_token(data.refresh_token.as_deref());
        self.start_refresh();

        tracing::info!(email = %user.email, "Signed in");
        self.transition(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Call `POST /auth/login` and adopt the answer.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<ApiResponse<User>> {
        let credentials = Credentials::new(email, password);
        match self.api.login(&credentials).await? {
            ApiResponse::Success(data) => match self.login(data, remember_me) {
                Ok(user) => Ok(ApiResponse::Success(user)),
                Err(e) => {
                    self.api.forget_credentials();
                    Err(e)
                }
            },
            ApiResponse::Failure(failure) => Ok(ApiResponse::Failure(failure)),
        }
    }

    pub fn logout(&self) {
        abort_slot(&self.refresh_task);
        self.store.clear();
        self.api.forget_credentials();
        tracing::info!("Signed out");
        self.transition(AuthState::Unauthenticated);
    }

    /// Current state, read from the token store so a session cleared by the
    /// HTTP layer is seen immediately.
    pub fn state(&self) -> AuthState {
        if *self.state_tx.borrow() == AuthState::Loading {
            return AuthState::Loading;
        }
        match (self.store.token(), self.store.user()) {
            (Some(_), Some(user)) => AuthState::Authenticated(user),
            _ => AuthState::Unauthenticated,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// True if the signed-in user holds at least one of `candidates`.
    pub fn has_role<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        self.user()
            .map(|user| user.has_role(candidates))
            .unwrap_or(false)
    }

    /// Gate `children` behind authentication and `required` roles.
    pub fn guard<S, T, F>(&self, required: &[S], children: F) -> Guarded<T>
    where
        S: AsRef<str>,
        F: FnOnce(&User) -> T,
    {
        guard(&self.state(), required, children)
    }

    pub fn landing_route(&self) -> Route {
        landing_route(self.user().as_ref())
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_task
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }

    fn transition(&self, state: AuthState) -> AuthState {
        self.state_tx.send_replace(state.clone());
        state
    }

    fn start_refresh(&self) {
        let api = self.api.clone();
        let store = self.store.clone();
        let period = self.refresh_interval;
        if period.is_zero() {
            tracing::warn!("Refresh interval is zero; background token refresh disabled");
            abort_slot(&self.refresh_task);
            return;
        }

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !store.is_authenticated() {
                    tracing::debug!("Session gone; stopping token refresh");
                    break;
                }
                if api.cached_credential().is_none() {
                    tracing::debug!("No credential to renew with; skipping token refresh");
                    continue;
                }
                match api.refresh_session().await {
                    Ok(_) => tracing::debug!("Background token refresh succeeded"),
                    Err(failure) => {
                        tracing::warn!(error = %failure, "Background token refresh failed")
                    }
                }
            }
        });

        replace_slot(&self.refresh_task, task);
    }

    /// Forward token store changes (including a forced sign-out by the HTTP
    /// layer) to subscribers.
    fn start_mirror(&self) {
        let mut rx = self.store.subscribe();
        let state_tx = self.state_tx.clone();

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let user = rx.borrow_and_update().clone();
                state_tx.send_if_modified(|state| {
                    if *state == AuthState::Loading {
                        return false;
                    }
                    let next = match user {
                        Some(user) => AuthState::Authenticated(user),
                        None => AuthState::Unauthenticated,
                    };
                    if *state == next {
                        return false;
                    }
                    *state = next;
                    true
                });
            }
        });

        replace_slot(&self.mirror_task, task);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn replace_slot(slot: &Mutex<Option<JoinHandle<()>>>, task: JoinHandle<()>) {
    match slot.lock() {
        Ok(mut guard) => {
            if let Some(previous) = guard.replace(task) {
                previous.abort();
            }
        }
        Err(_) => task.abort(),
    }
}

fn abort_slot(slot: &Mutex<Option<JoinHandle<()>>>) {
    if let Ok(mut guard) = slot.lock() {
        if let Some(task) = guard.take() {
            task.abort();
        }
    }
}
