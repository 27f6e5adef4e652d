use serde::{Deserialize, Serialize};
use std::fmt;

use super::User;

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Answer of `POST /auth/login` and `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    #[serde(default, alias = "type", alias = "token_type")]
    pub token_type: Option<String>,
    #[serde(default, alias = "usuario")]
    pub user: Option<User>,
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// What the client can replay to renew an expired token.
#[derive(Clone, PartialEq, Eq)]
pub enum RefreshCredential {
    /// Server-issued refresh token, persisted with the session.
    RefreshToken(String),
    /// The login password, held in memory only.
    Password(Credentials),
}

impl fmt::Debug for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshCredential::RefreshToken(_) => f.write_str("RefreshToken(<redacted>)"),
            RefreshCredential::Password(credentials) => {
                f.debug_tuple("Password").field(credentials).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn debug_never_prints_secrets() {
        let credentials = Credentials::new("a@b.com", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));
        let refresh = RefreshCredential::RefreshToken("secret-rt".into());
        assert!(!format!("{:?}", refresh).contains("secret-rt"));
    }

    #[test]
    fn login_response_accepts_alternate_names() {
        let response: LoginResponse = serde_json::from_value(json!({
            "accessToken": "abc",
            "type": "Bearer",
            "usuario": {"nombre": "Eva", "rol": "ADMIN"}
        }))
        .unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));
        assert_eq!(response.user.unwrap().first_name, "Eva");
    }
}
