//! Persistent token and user profile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::storage::{
    FileStorage, MemoryStorage, SessionStorage, REFRESH_TOKEN_KEY, TOKEN_KEY, TOKEN_TYPE_KEY,
    USER_KEY,
};
use crate::config::{AuthHeaderStyle, ClientConfig, Platform};
use crate::types::User;

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// An authenticated session as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub token_type: String,
    pub user: User,
    pub remember_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Token store over a durable and a session-scoped backend.
///
/// Storage failures never reach the caller: they are logged and the value is
/// treated as absent.
pub struct TokenStore {
    durable: Arc<dyn SessionStorage>,
    scoped: Arc<dyn SessionStorage>,
    platform: Platform,
    header_style: AuthHeaderStyle,
    user_tx: watch::Sender<Option<User>>,
    generation: AtomicU64,
}

impl TokenStore {
    pub fn new(
        durable: Arc<dyn SessionStorage>,
        scoped: Arc<dyn SessionStorage>,
        platform: Platform,
        header_style: AuthHeaderStyle,
    ) -> Self {
        let (user_tx, _) = watch::channel(None);
        let store = Self {
            durable,
            scoped,
            platform,
            header_style,
            user_tx,
            generation: AtomicU64::new(0),
        };
        store.user_tx.send_replace(store.read_user());
        store
    }

    /// File-backed durable storage under `config.storage_dir`, in-memory session storage.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(FileStorage::in_dir(&config.storage_dir)),
            Arc::new(MemoryStorage::new()),
            config.platform,
            config.auth_header,
        )
    }

    /// Both backends in memory; nothing outlives the process.
    pub fn in_memory(platform: Platform) -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
            platform,
            AuthHeaderStyle::default(),
        )
    }

    pub fn with_header_style(mut self, style: AuthHeaderStyle) -> Self {
        self.header_style = style;
        self
    }

    /// Store a fresh session, replacing whatever was there.
    ///
    /// Mobile always writes durable storage; web writes durable storage only when
    /// `remember_me` is set.
    pub fn set(&self, token: &str, token_type: Option<&str>, user: &User, remember_me: bool) {
        let durable = remember_me || self.platform == Platform::Mobile;
        let (target, other) = if durable {
            (&self.durable, &self.scoped)
        } else {
            (&self.scoped, &self.durable)
        };

        let token_type = token_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOKEN_TYPE);

        swallow("clear", other.clear());
        swallow("write token", target.set(TOKEN_KEY, token));
        swallow("write token type", target.set(TOKEN_TYPE_KEY, token_type));
        match serde_json::to_string(user) {
            Ok(json) => swallow("write user", target.set(USER_KEY, &json)),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize user for session storage"),
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.user_tx.send_replace(Some(user.clone()));
    }

    /// Store or drop the server-issued refresh token alongside the session.
    pub fn set_refresh_token(&self, refresh_token: Option<&str>) {
        let Some(backend) = self.active_backend() else {
            return;
        };
        match refresh_token {
            Some(token) => swallow("write refresh token", backend.set(REFRESH_TOKEN_KEY, token)),
            None => swallow("remove refresh token", backend.remove(REFRESH_TOKEN_KEY)),
        }
    }

    /// Replace the stored user, keeping the token.
    pub fn update_user(&self, user: &User) {
        let Some(backend) = self.active_backend() else {
            return;
        };
        match serde_json::to_string(user) {
            Ok(json) => swallow("write user", backend.set(USER_KEY, &json)),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize user for session storage"),
        }
        self.user_tx.send_replace(Some(user.clone()));
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    pub fn token_type(&self) -> String {
        self.read(TOKEN_TYPE_KEY)
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Value for the `Authorization` header, if a token is stored.
    pub fn auth_header(&self) -> Option<String> {
        let token = self.token()?;
        Some(match self.header_style {
            AuthHeaderStyle::Prefixed => format!("{} {}", self.token_type(), token),
            AuthHeaderStyle::Raw => token,
        })
    }

    pub fn user(&self) -> Option<User> {
        self.read_user()
    }

    /// Token AND user both present.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user().is_some()
    }

    pub fn session(&self) -> Option<Session> {
        let scoped_holds_token = matches!(self.scoped.get(TOKEN_KEY), Ok(Some(_)));
        Some(Session {
            token: self.token()?,
            token_type: self.token_type(),
            user: self.user()?,
            remember_me: !scoped_holds_token,
            refresh_token: self.refresh_token(),
        })
    }

    pub fn clear(&self) {
        swallow("clear durable", self.durable.clear());
        swallow("clear session", self.scoped.clear());
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.user_tx.send_replace(None);
    }

    /// Bumped on every `set` and `clear`; lets callers detect a session swap.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Watch the current user; `None` once the session is gone.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    fn active_backend(&self) -> Option<&Arc<dyn SessionStorage>> {
        [&self.scoped, &self.durable]
            .into_iter()
            .find(|backend| matches!(backend.get(TOKEN_KEY), Ok(Some(_))))
    }

    fn read(&self, key: &str) -> Option<String> {
        let backend = self.active_backend()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Session storage read failed; treating as absent");
                None
            }
        }
    }

    fn read_user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user is unreadable; treating as absent");
                None
            }
        }
    }
}

fn swallow(action: &str, result: Result<(), crate::error::StorageError>) {
    if let Err(e) = result {
        tracing::warn!(action, error = %e, "Session storage write failed");
    }
}
