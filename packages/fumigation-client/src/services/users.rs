use std::fmt;

use serde::Serialize;
use serde_json::json;

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, ApiResponse};
use crate::types::{EntityId, Listing, PageRequest, Role, User};

const BASE: &str = "/users";

/// Body of `POST /users`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// User administration.
pub struct Users<'a> {
    api: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(
        &self,
        page: PageRequest,
        role: Option<&str>,
    ) -> Result<ApiResponse<Listing<User>>> {
        let mut query = page.to_query();
        if let Some(role) = role {
            query.push(("role".to_string(), Role::new(role).name));
        }
        self.api.get_with_query(BASE, query).await
    }

    pub async fn get(&self, id: &EntityId) -> Result<ApiResponse<User>> {
        self.api.get(&format!("{}/{}", BASE, id)).await
    }

    pub async fn technicians(&self) -> Result<ApiResponse<Vec<User>>> {
        let response: ApiResponse<Listing<User>> =
            self.api.get(&format!("{}/technicians", BASE)).await?;
        Ok(response.map(Listing::into_items))
    }

    pub async fn create(&self, user: &NewUser) -> Result<ApiResponse<User>> {
        if user.email.trim().is_empty() || !user.email.contains('@') {
            return Err(ClientError::Validation("a valid email is required".to_string()));
        }
        if user.password.is_empty() {
            return Err(ClientError::Validation("a password is required".to_string()));
        }
        if user.roles.is_empty() {
            return Err(ClientError::Validation("at least one role is required".to_string()));
        }
        let mut body = user.clone();
        body.email = body.email.trim().to_string();
        body.roles = canonical_roles(&user.roles);
        self.api.post(BASE, &body).await
    }

    pub async fn update(&self, id: &EntityId, changes: &UpdateUser) -> Result<ApiResponse<User>> {
        self.api.put(&format!("{}/{}", BASE, id), changes).await
    }

    /// Replace the user's roles.
    pub async fn set_roles<S: AsRef<str>>(
        &self,
        id: &EntityId,
        roles: &[S],
    ) -> Result<ApiResponse<User>> {
        if roles.is_empty() {
            return Err(ClientError::Validation("at least one role is required".to_string()));
        }
        self.api
            .put(
                &format!("{}/{}/roles", BASE, id),
                &json!({ "roles": canonical_roles(roles) }),
            )
            .await
    }

    pub async fn delete(&self, id: &EntityId) -> ApiResponse<()> {
        self.api.delete(&format!("{}/{}", BASE, id)).await
    }
}

fn canonical_roles<S: AsRef<str>>(roles: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for role in roles {
        let name = Role::new(role).name;
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_canonical_and_unique() {
        let roles = canonical_roles(&["admin", "ROLE_ADMIN", "tecnico"]);
        assert_eq!(roles, vec!["ROLE_ADMIN", "ROLE_TECHNICIAN"]);
    }

    #[test]
    fn new_user_debug_hides_password() {
        let user = NewUser {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            email: "ana@example.com".into(),
            password: "hunter2".into(),
            roles: vec!["ROLE_CLIENT".into()],
        };
        assert!(!format!("{:?}", user).contains("hunter2"));
    }
}
