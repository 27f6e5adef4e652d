use serde_json::json;

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, ApiResponse};
use crate::types::{CreateApplication, EntityId, FumigationApplication, Listing, PageRequest};

const BASE: &str = "/fumigation-applications";

/// Fumigation applications submitted by clients.
pub struct Applications<'a> {
    api: &'a ApiClient,
}

impl<'a> Applications<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Every application (admin).
    pub async fn list(&self, page: PageRequest) -> Result<ApiResponse<Listing<FumigationApplication>>> {
        self.api.get_with_query(BASE, page.to_query()).await
    }

    /// Applications of the signed-in client.
    pub async fn mine(&self) -> Result<ApiResponse<Vec<FumigationApplication>>> {
        let path = format!("{}/mine", BASE);
        let response: ApiResponse<Listing<FumigationApplication>> = self.api.get(&path).await?;
        Ok(response.map(Listing::into_items))
    }

    pub async fn get(&self, id: &EntityId) -> Result<ApiResponse<FumigationApplication>> {
        self.api.get(&format!("{}/{}", BASE, id)).await
    }

    pub async fn create(
        &self,
        application: &CreateApplication,
    ) -> Result<ApiResponse<FumigationApplication>> {
        if application.location.trim().is_empty() {
            return Err(ClientError::Validation("location is required".to_string()));
        }
        if application.lots.is_empty() {
            return Err(ClientError::Validation(
                "an application needs at least one lot".to_string(),
            ));
        }
        if let Some(lot) = application.lots.iter().find(|lot| !(lot.tons > 0.0)) {
            return Err(ClientError::Validation(format!(
                "lot '{}' must weigh more than zero tons",
                lot.code
            )));
        }
        self.api.post(BASE, application).await
    }

    pub async fn approve(&self, id: &EntityId) -> Result<ApiResponse<FumigationApplication>> {
        self.api
            .put(&format!("{}/{}/approve", BASE, id), &json!({}))
            .await
    }

    /// Reject with a reason shown to the client. The reason may not be blank.
    pub async fn reject(
        &self,
        id: &EntityId,
        reason: &str,
    ) -> Result<ApiResponse<FumigationApplication>> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::Validation(
                "a rejection needs a reason".to_string(),
            ));
        }
        self.api
            .put(&format!("{}/{}/reject", BASE, id), &json!({ "reason": reason }))
            .await
    }
}
