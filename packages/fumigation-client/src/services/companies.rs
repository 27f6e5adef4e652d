use crate::error::Result;
use crate::http::{ApiClient, ApiResponse};
use crate::types::{Company, EntityId};

const BASE: &str = "/companies";

pub struct Companies<'a> {
    api: &'a ApiClient,
}

impl<'a> Companies<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: &EntityId) -> Result<ApiResponse<Company>> {
        self.api.get(&format!("{}/{}", BASE, id)).await
    }

    /// Company of the signed-in client.
    pub async fn mine(&self) -> Result<ApiResponse<Company>> {
        self.api.get(&format!("{}/mine", BASE)).await
    }

    pub async fn update(&self, company: &Company) -> Result<ApiResponse<Company>> {
        self.api
            .put(&format!("{}/{}", BASE, company.id), company)
            .await
    }
}
