//! Testing utilities including a scripted transport.
//!
//! These let applications built on the client exercise login, 401 handling
//! and the resource services without a backend.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Value};

use crate::config::{ClientConfig, Platform};
use crate::http::{ApiClient, HttpRequest, HttpResponse, Transport, TransportError};
use crate::session::TokenStore;
use crate::types::{Role, User};

type Reply = Result<HttpResponse, TransportError>;

/// A transport that answers from a script and records every request.
///
/// Replies are queued per `(method, path)`. Each call pops the next reply;
/// the last one is repeated once the queue is down to a single entry.
/// Unscripted routes answer 404.
#[derive(Default, Clone)]
pub struct MockTransport {
    /// Scripted replies by route
    routes: Arc<RwLock<HashMap<(Method, String), VecDeque<Reply>>>>,

    /// Artificial latency per request
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with a raw body.
    pub fn with_response(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a JSON reply.
    pub fn with_json(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.push(method, path, Ok(HttpResponse::new(status, body.to_string())));
        self
    }

    /// Queue a transport failure.
    pub fn with_error(self, method: Method, path: &str, error: TransportError) -> Self {
        self.push(method, path, Err(error));
        self
    }

    /// Sleep this long before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a reply on an already shared transport.
    pub fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .write()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// All recorded requests, oldest first.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests sent to `method path`.
    pub fn call_count(&self, method: &Method, path: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| &call.method == method && call.path == path)
            .count()
    }

    /// Authorization headers sent to `method path`, in order.
    pub fn authorizations(&self, method: &Method, path: &str) -> Vec<Option<String>> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| &call.method == method && call.path == path)
            .map(|call| call.authorization.clone())
            .collect()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn next_reply(&self, method: &Method, path: &str) -> Reply {
        let mut routes = self.routes.write().unwrap();
        match routes.get_mut(&(method.clone(), path.to_string())) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            None => Ok(HttpResponse::new(
                404,
                json!({ "message": format!("no mock route for {} {}", method, path) }).to_string(),
            )),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (method, path) = (request.method.clone(), request.path.clone());
        self.calls.write().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply(&method, &path)
    }
}

/// A user with the given role names.
pub fn mock_user(email: &str, roles: &[&str]) -> User {
    User {
        id: Some(1.into()),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        roles: roles.iter().map(Role::new).collect(),
    }
}

/// A `POST /auth/login` answer body.
pub fn login_body(token: &str, user: &User) -> Value {
    json!({ "token": token, "tokenType": "Bearer", "user": user })
}

/// An [`ApiClient`] over `transport` with an in-memory web session.
pub fn mock_client(transport: &MockTransport) -> ApiClient {
    let config = ClientConfig::new("http://mock.local");
    let store = Arc::new(TokenStore::in_memory(Platform::Web));
    ApiClient::new(Arc::new(transport.clone()), store, &config)
}
