use serde_json::json;

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, ApiResponse};
use crate::types::{EntityId, Listing, Lot, LotStatus, PageRequest};

const BASE: &str = "/fumigations";

/// Lots ("fumigations") and their technicians.
pub struct Lots<'a> {
    api: &'a ApiClient,
}

impl<'a> Lots<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: PageRequest) -> Result<ApiResponse<Listing<Lot>>> {
        self.api.get_with_query(BASE, page.to_query()).await
    }

    /// Lots assigned to the signed-in technician.
    pub async fn assigned(&self) -> Result<ApiResponse<Vec<Lot>>> {
        let response: ApiResponse<Listing<Lot>> =
            self.api.get(&format!("{}/assigned", BASE)).await?;
        Ok(response.map(Listing::into_items))
    }

    pub async fn get(&self, id: &EntityId) -> Result<ApiResponse<Lot>> {
        self.api.get(&format!("{}/{}", BASE, id)).await
    }

    pub async fn assign_technicians(
        &self,
        id: &EntityId,
        technician_ids: &[EntityId],
    ) -> Result<ApiResponse<Lot>> {
        if technician_ids.is_empty() {
            return Err(ClientError::Validation(
                "assign at least one technician".to_string(),
            ));
        }
        self.api
            .put(
                &format!("{}/{}/technicians", BASE, id),
                &json!({ "technicianIds": technician_ids }),
            )
            .await
    }

    /// Move `lot` to `next`. Backwards moves and moves out of `Completed` are
    /// refused before any request is sent.
    pub async fn update_status(&self, lot: &Lot, next: LotStatus) -> Result<ApiResponse<Lot>> {
        if !lot.status.can_transition_to(&next) {
            return Err(ClientError::Validation(format!(
                "lot {} cannot move from {} to {}",
                lot.id, lot.status, next
            )));
        }
        tracing::debug!(lot = %lot.id, from = %lot.status, to = %next, "Updating lot status");
        self.api
            .put(
                &format!("{}/{}/status", BASE, lot.id),
                &json!({ "status": next }),
            )
            .await
    }
}
