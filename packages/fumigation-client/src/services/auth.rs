use serde_json::json;

use crate::error::Result;
use crate::http::{ApiClient, ApiResponse, REFRESH_PATH};
use crate::session::manager::ME_PATH;
use crate::types::{Credentials, LoginResponse, User};

/// `/auth` and `/users/me`.
pub struct Auth<'a> {
    api: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a token. The session is not changed; see
    /// [`SessionManager::sign_in`](crate::session::SessionManager::sign_in).
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse<LoginResponse>> {
        self.api.login(&Credentials::new(email, password)).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<ApiResponse<LoginResponse>> {
        self.api
            .post(REFRESH_PATH, &json!({ "refreshToken": refresh_token }))
            .await
    }

    pub async fn me(&self) -> Result<ApiResponse<User>> {
        self.api.get(ME_PATH).await
    }
}
