//! The uniform result envelope returned by every request.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::transport::TransportError;
use crate::config::Locale;
use crate::error::{ClientError, Result};

/// Why a request did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401: bad credentials or a session that could not be renewed
    Unauthorized,
    /// Any other non-2xx status
    Server,
    /// The connection failed
    Network,
    /// The per-request deadline passed
    Timeout,
}

impl FailureKind {
    /// Worth retrying by the user (connection problems).
    pub fn is_transient(&self) -> bool {
        matches!(self, FailureKind::Network | FailureKind::Timeout)
    }
}

/// A failed request, with a message fit for the user.
///
/// `body` keeps the raw server response for diagnostics; it is never part of
/// `message`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl Failure {
    pub fn unauthorized(locale: Locale) -> Self {
        Failure {
            kind: FailureKind::Unauthorized,
            message: messages::incorrect_credentials(locale).to_string(),
            status: Some(401),
            body: None,
        }
    }

    pub fn server(locale: Locale, status: u16, body: String) -> Self {
        Failure {
            kind: FailureKind::Server,
            message: messages::server_error(locale, status),
            status: Some(status),
            body: Some(body).filter(|b| !b.is_empty()),
        }
    }

    pub fn transport(locale: Locale, error: &TransportError) -> Self {
        match error {
            TransportError::Timeout => Failure {
                kind: FailureKind::Timeout,
                message: messages::timeout(locale).to_string(),
                status: None,
                body: None,
            },
            TransportError::Connection(detail) => Failure {
                kind: FailureKind::Network,
                message: if detail.trim().is_empty() {
                    messages::connection_error(locale).to_string()
                } else {
                    detail.clone()
                },
                status: None,
                body: None,
            },
        }
    }
}

/// Outcome of a request: data on success, a [`Failure`] otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(Failure),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success(data) => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResponse::Success(data) => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure(failure) => Some(&failure.message),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        match self {
            ApiResponse::Success(data) => ApiResponse::Success(f(data)),
            ApiResponse::Failure(failure) => ApiResponse::Failure(failure),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, Failure> {
        match self {
            ApiResponse::Success(data) => Ok(data),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }
}

impl ApiResponse<Value> {
    /// Decode the success payload. A payload of the wrong shape is a
    /// [`ClientError::Decode`], not a failure envelope.
    pub fn decode<T: DeserializeOwned>(self, path: &str) -> Result<ApiResponse<T>> {
        match self {
            ApiResponse::Success(value) => serde_json::from_value(value)
                .map(ApiResponse::Success)
                .map_err(|e| ClientError::decode(path, e)),
            ApiResponse::Failure(failure) => Ok(ApiResponse::Failure(failure)),
        }
    }

    /// Drop the payload; for endpoints whose answer carries nothing useful.
    pub fn discard(self) -> ApiResponse<()> {
        self.map(|_| ())
    }
}

pub mod messages {
    use crate::config::Locale;

    pub fn incorrect_credentials(locale: Locale) -> &'static str {
        match locale {
            Locale::En => "incorrect username or password",
            Locale::Es => "usuario o contraseña incorrectos",
        }
    }

    pub fn server_error(locale: Locale, status: u16) -> String {
        match locale {
            Locale::En => format!("server error: {}", status),
            Locale::Es => format!("error del servidor: {}", status),
        }
    }

    pub fn connection_error(locale: Locale) -> &'static str {
        match locale {
            Locale::En => "connection error",
            Locale::Es => "error de conexión",
        }
    }

    pub fn timeout(locale: Locale) -> &'static str {
        match locale {
            Locale::En => "request timed out, please try again",
            Locale::Es => "tiempo de espera agotado, intente de nuevo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unauthorized_message_has_no_server_text() {
        let failure = Failure::unauthorized(Locale::En);
        assert_eq!(failure.message, "incorrect username or password");
        assert_eq!(failure.body, None);
        assert_eq!(Failure::unauthorized(Locale::Es).message, "usuario o contraseña incorrectos");
    }

    #[test]
    fn server_failure_keeps_body_out_of_message() {
        let failure = Failure::server(Locale::En, 503, "upstream exploded".into());
        assert_eq!(failure.message, "server error: 503");
        assert_eq!(failure.body.as_deref(), Some("upstream exploded"));
    }

    #[test]
    fn connection_failure_falls_back_to_generic_text() {
        let failure = Failure::transport(Locale::En, &TransportError::Connection(String::new()));
        assert_eq!(failure.message, "connection error");
        assert!(failure.kind.is_transient());

        let failure = Failure::transport(Locale::En, &TransportError::Connection("dns".into()));
        assert_eq!(failure.message, "dns");
    }

    #[test]
    fn decode_distinguishes_bad_shape_from_failure() {
        let ok: ApiResponse<Value> = ApiResponse::Success(json!([1, 2]));
        let decoded: ApiResponse<Vec<u8>> = ok.decode("/x").unwrap();
        assert_eq!(decoded.into_data(), Some(vec![1, 2]));

        let bad: ApiResponse<Value> = ApiResponse::Success(json!({"a": 1}));
        assert!(matches!(
            bad.decode::<Vec<u8>>("/x"),
            Err(ClientError::Decode { .. })
        ));

        let failed: ApiResponse<Value> = ApiResponse::Failure(Failure::unauthorized(Locale::En));
        let still_failed = failed.decode::<Vec<u8>>("/x").unwrap();
        assert_eq!(still_failed.message(), Some("incorrect username or password"));
    }
}
