//! HTTP client wrapper.
//!
//! Attaches the stored token, renews it once on a 401, and turns every outcome
//! into an [`ApiResponse`].

pub mod response;
pub mod retry;
pub mod transport;

pub use response::{ApiResponse, Failure, FailureKind};
pub use retry::RetryPolicy;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use std::sync::{Arc, Mutex};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{ClientConfig, Locale};
use crate::error::Result;
use crate::session::TokenStore;
use crate::types::{Credentials, LoginResponse, RefreshCredential};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Session-aware REST client.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<TokenStore>,
    policy: RetryPolicy,
    locale: Locale,
    cache_password: bool,
    password: Mutex<Option<Credentials>>,
    /// Held while a re-authentication is in flight.
    reauth_lock: tokio::sync::Mutex<()>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<TokenStore>, config: &ClientConfig) -> Self {
        Self {
            transport,
            store,
            policy: RetryPolicy::default(),
            locale: config.locale,
            cache_password: config.cache_password,
            password: Mutex::new(None),
            reauth_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Client over a real `reqwest` transport.
    pub fn from_config(config: &ClientConfig, store: Arc<TokenStore>) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), store, config))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    // ------------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------------

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResponse<Value> {
        self.request_with_query(method, path, Vec::new(), body).await
    }

    /// Send a request, renewing the session once if the server answers 401.
    ///
    /// Never fails: every outcome is an [`ApiResponse`].
    pub async fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> ApiResponse<Value> {
        let mut reauths = 0u32;
        let mut resends = 0u32;

        loop {
            let generation = self.store.generation();
            let authorization = self.store.auth_header();
            let had_token = authorization.is_some();

            let request = HttpRequest::new(method.clone(), path)
                .with_query(query.clone())
                .with_body(body.clone())
                .with_authorization(authorization);

            tracing::debug!(method = %method, path, "API request");

            match self.transport.send(request).await {
                Ok(response) if response.status == 401 => {
                    if had_token && reauths < self.policy.reauth_attempts {
                        reauths += 1;
                        if self.reauthenticate_after(generation).await {
                            continue;
                        }
                    }
                    if had_token {
                        tracing::info!(path, "Session rejected by the server; signing out");
                        self.store.clear();
                        self.forget_credentials();
                    }
                    return ApiResponse::Failure(Failure::unauthorized(self.locale));
                }
                Ok(response) => return self.envelope(path, response),
                Err(error) => {
                    if resends < self.policy.transient_retries {
                        let delay = self.policy.backoff(resends);
                        resends += 1;
                        tracing::debug!(path, error = %error, ?delay, "Retrying after transport error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(path, error = %error, "API request did not complete");
                    return ApiResponse::Failure(Failure::transport(self.locale, &error));
                }
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.request(Method::GET, path, None).await.decode(path)
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<ApiResponse<T>> {
        self.request_with_query(Method::GET, path, query, None)
            .await
            .decode(path)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await.decode(path)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(body)).await.decode(path)
    }

    pub async fn delete(&self, path: &str) -> ApiResponse<()> {
        self.request(Method::DELETE, path, None).await.discard()
    }

    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------

    /// `POST /auth/login`. Does not touch the token store; on success the
    /// password is kept in memory for silent renewal unless the server issued a
    /// refresh token or password caching is disabled.
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiResponse<LoginResponse>> {
        let body = serde_json::to_value(credentials)?;
        let request = HttpRequest::new(Method::POST, LOGIN_PATH).with_body(Some(body));

        let envelope = match self.transport.send(request).await {
            Ok(response) if response.status == 401 => {
                tracing::debug!("Login rejected");
                ApiResponse::Failure(Failure::unauthorized(self.locale))
            }
            Ok(response) => self.envelope(LOGIN_PATH, response),
            Err(error) => ApiResponse::Failure(Failure::transport(self.locale, &error)),
        };

        let decoded = envelope.decode::<LoginResponse>(LOGIN_PATH)?;
        if let ApiResponse::Success(response) = &decoded {
            if self.cache_password && response.refresh_token.is_none() {
                self.cache_password(credentials.clone());
            } else {
                self.forget_credentials();
            }
        }
        Ok(decoded)
    }

    /// Renew the token now. Used by the background refresh timer.
    ///
    /// On success the new token is already stored. Failure leaves the session
    /// untouched.
    pub async fn refresh_session(&self) -> std::result::Result<LoginResponse, Failure> {
        let _guard = self.reauth_lock.lock().await;
        self.renew().await
    }

    /// The credential a renewal would replay, if any.
    pub fn cached_credential(&self) -> Option<RefreshCredential> {
        if let Some(token) = self.store.refresh_token() {
            return Some(RefreshCredential::RefreshToken(token));
        }
        self.cached_password().map(RefreshCredential::Password)
    }

    pub fn forget_credentials(&self) {
        if let Ok(mut slot) = self.password.lock() {
            *slot = None;
        }
    }

    fn cache_password(&self, credentials: Credentials) {
        if let Ok(mut slot) = self.password.lock() {
            *slot = Some(credentials);
        }
    }

    fn cached_password(&self) -> Option<Credentials> {
        self.password.lock().ok().and_then(|slot| slot.clone())
    }

    /// Renew after a 401 on a request sent under `seen_generation`.
    ///
    /// Concurrent callers queue on the lock; whoever finds the session already
    /// swapped reuses that result instead of logging in again.
    async fn reauthenticate_after(&self, seen_generation: u64) -> bool {
        let _guard = self.reauth_lock.lock().await;
        if self.store.generation() != seen_generation {
            return self.store.is_authenticated();
        }
        match self.renew().await {
            Ok(_) => true,
            Err(failure) => {
                tracing::debug!(kind = ?failure.kind, "Silent re-authentication failed");
                false
            }
        }
    }

    /// Try the refresh token first, then the cached password.
    async fn renew(&self) -> std::result::Result<LoginResponse, Failure> {
        let mut last = Failure::unauthorized(self.locale);

        if let Some(refresh_token) = self.store.refresh_token() {
            match self
                .exchange(REFRESH_PATH, json!({ "refreshToken": refresh_token }))
                .await
            {
                Ok(response) => {
                    self.adopt(&response);
                    return Ok(response);
                }
                Err(failure) => last = failure,
            }
        }

        if let Some(credentials) = self.cached_password() {
            let body = serde_json::to_value(&credentials)
                .map_err(|e| Failure::server(self.locale, 0, e.to_string()))?;
            match self.exchange(LOGIN_PATH, body).await {
                Ok(response) => {
                    self.adopt(&response);
                    return Ok(response);
                }
                Err(failure) => last = failure,
            }
        }

        Err(last)
    }

    async fn exchange(&self, path: &str, body: Value) -> std::result::Result<LoginResponse, Failure> {
        let request = HttpRequest::new(Method::POST, path).with_body(Some(body));
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Failure::transport(self.locale, &e))?;

        if response.status == 401 {
            return Err(Failure::unauthorized(self.locale));
        }
        if !response.is_success() {
            return Err(Failure::server(self.locale, response.status, response.body));
        }
        serde_json::from_str(&response.body)
            .map_err(|e| Failure::server(self.locale, response.status, e.to_string()))
    }

    /// Store a renewed token, keeping the current user when the server omits it.
    fn adopt(&self, response: &LoginResponse) {
        let current = self.store.session();
        let user = response
            .user
            .clone()
            .or_else(|| current.as_ref().map(|session| session.user.clone()));
        let Some(user) = user else {
            tracing::warn!("Renewed token came without a user and none is stored");
            return;
        };
        let remember_me = current.map(|session| session.remember_me).unwrap_or(false);

        self.store
            .set(&response.token, response.token_type.as_deref(), &user, remember_me);
        if let Some(refresh_token) = &response.refresh_token {
            self.store.set_refresh_token(Some(refresh_token));
        }
        tracing::debug!("Session token renewed");
    }

    fn envelope(&self, path: &str, response: HttpResponse) -> ApiResponse<Value> {
        if response.is_success() {
            return ApiResponse::Success(parse_body(&response.body));
        }
        if response.status == 401 {
            return ApiResponse::Failure(Failure::unauthorized(self.locale));
        }
        tracing::warn!(path, status = response.status, "API request failed");
        tracing::debug!(path, body = %response.body, "Failed response body");
        ApiResponse::Failure(Failure::server(self.locale, response.status, response.body))
    }
}

/// Empty bodies become `null`; non-JSON bodies become a JSON string so the
/// typed decode reports them.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_body_handles_empty_and_text() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  "), Value::Null);
        assert_eq!(parse_body("[1]"), json!([1]));
        assert_eq!(parse_body("ok"), json!("ok"));
    }
}
