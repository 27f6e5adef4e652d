use crate::error::{ClientError, Result};
use crate::forms::Validate;
use crate::http::{ApiClient, ApiResponse};
use crate::types::{CleanupReport, EntityId, FumigationReport, Listing, Signature};

const FUMIGATION: &str = "/reports/fumigation";
const CLEANUP: &str = "/reports/cleanup";
const SIGNATURES: &str = "/signatures";

/// Field reports and their signatures.
pub struct Reports<'a> {
    api: &'a ApiClient,
}

impl<'a> Reports<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Validate and submit a fumigation report.
    pub async fn submit_fumigation(
        &self,
        report: &FumigationReport,
    ) -> Result<ApiResponse<FumigationReport>> {
        report.validate()?;
        self.api.post(FUMIGATION, report).await
    }

    pub async fn fumigation_for_lot(
        &self,
        lot_id: &EntityId,
    ) -> Result<ApiResponse<FumigationReport>> {
        self.api.get(&format!("{}/lot/{}", FUMIGATION, lot_id)).await
    }

    /// Validate and submit a cleanup report.
    pub async fn submit_cleanup(&self, report: &CleanupReport) -> Result<ApiResponse<CleanupReport>> {
        report.validate()?;
        self.api.post(CLEANUP, report).await
    }

    pub async fn cleanup_for_lot(&self, lot_id: &EntityId) -> Result<ApiResponse<CleanupReport>> {
        self.api.get(&format!("{}/lot/{}", CLEANUP, lot_id)).await
    }

    /// Attach a signature. The image must be non-empty base64.
    pub async fn sign(&self, signature: &Signature) -> Result<ApiResponse<Signature>> {
        if signature.signer_name.trim().is_empty() {
            return Err(ClientError::Validation("signer name is required".to_string()));
        }
        match signature.png_bytes() {
            Ok(bytes) if !bytes.is_empty() => {}
            Ok(_) => {
                return Err(ClientError::Validation("signature image is empty".to_string()))
            }
            Err(e) => {
                return Err(ClientError::Validation(format!(
                    "signature image is not valid base64: {}",
                    e
                )))
            }
        }
        self.api.post(SIGNATURES, signature).await
    }

    pub async fn signatures(&self, report_id: &EntityId) -> Result<ApiResponse<Vec<Signature>>> {
        let response: ApiResponse<Listing<Signature>> = self
            .api
            .get(&format!("{}/report/{}", SIGNATURES, report_id))
            .await?;
        Ok(response.map(Listing::into_items))
    }
}
