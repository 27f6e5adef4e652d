use std::collections::BTreeMap;

use crate::error::Result;
use crate::http::{ApiClient, ApiResponse};
use crate::types::{categorize, FumigationApplication, Listing, Lot, PageRequest, StatusBucket, User};

/// Page size used when counting; the admin dashboard reads one large page of
/// each resource.
pub const SUMMARY_PAGE_SIZE: u32 = 500;

/// Applications per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub finished: usize,
}

impl BucketCounts {
    pub fn from_applications(applications: &[FumigationApplication]) -> Self {
        let mut counts = BucketCounts::default();
        for application in applications {
            match categorize(application) {
                StatusBucket::Pending => counts.pending += 1,
                StatusBucket::InProgress => counts.in_progress += 1,
                StatusBucket::Finished => counts.finished += 1,
            }
        }
        counts
    }

    pub fn get(&self, bucket: StatusBucket) -> usize {
        match bucket {
            StatusBucket::Pending => self.pending,
            StatusBucket::InProgress => self.in_progress,
            StatusBucket::Finished => self.finished,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.finished
    }
}

/// Admin overview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub applications: BucketCounts,
    pub lots_by_status: BTreeMap<String, usize>,
    pub users_by_role: BTreeMap<String, usize>,
}

impl DashboardSummary {
    pub fn from_parts(applications: &[FumigationApplication], lots: &[Lot], users: &[User]) -> Self {
        let mut lots_by_status = BTreeMap::new();
        for lot in lots {
            *lots_by_status.entry(lot.status.to_string()).or_insert(0) += 1;
        }

        let mut users_by_role = BTreeMap::new();
        for user in users {
            for role in &user.roles {
                *users_by_role.entry(role.name.clone()).or_insert(0) += 1;
            }
        }

        DashboardSummary {
            applications: BucketCounts::from_applications(applications),
            lots_by_status,
            users_by_role,
        }
    }
}

pub struct Dashboard<'a> {
    api: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Fetch applications, lots and users concurrently and count them.
    ///
    /// The first failure among the three is returned as is.
    pub async fn summary(&self) -> Result<ApiResponse<DashboardSummary>> {
        let page = PageRequest::new(0, SUMMARY_PAGE_SIZE);
        let applications = self.api.applications();
        let lots = self.api.lots();
        let users = self.api.users();

        let (applications, lots, users) = futures::join!(
            applications.list(page),
            lots.list(page),
            users.list(page, None)
        );

        let applications: Listing<FumigationApplication> = match applications? {
            ApiResponse::Success(listing) => listing,
            ApiResponse::Failure(failure) => return Ok(ApiResponse::Failure(failure)),
        };
        let lots: Listing<Lot> = match lots? {
            ApiResponse::Success(listing) => listing,
            ApiResponse::Failure(failure) => return Ok(ApiResponse::Failure(failure)),
        };
        let users: Listing<User> = match users? {
            ApiResponse::Success(listing) => listing,
            ApiResponse::Failure(failure) => return Ok(ApiResponse::Failure(failure)),
        };

        Ok(ApiResponse::Success(DashboardSummary::from_parts(
            applications.items(),
            lots.items(),
            users.items(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_by_bucket_status_and_role() {
        let applications: Vec<FumigationApplication> = serde_json::from_value(json!([
            {"id": 1, "status": "PENDING"},
            {"id": 2, "status": "APPROVED", "lots": [{"id": 1, "status": "IN_SERVICE"}]},
            {"id": 3, "status": "REJECTED"},
            {"id": 4, "status": "COMPLETED"}
        ]))
        .unwrap();
        let lots: Vec<Lot> = serde_json::from_value(json!([
            {"id": 1, "status": "PENDING"},
            {"id": 2, "status": "COMPLETED"},
            {"id": 3, "status": "COMPLETED"}
        ]))
        .unwrap();
        let users: Vec<User> = serde_json::from_value(json!([
            {"id": 1, "email": "a@x", "roles": ["ROLE_ADMIN", "ROLE_TECHNICIAN"]},
            {"id": 2, "email": "b@x", "roles": ["ROLE_TECHNICIAN"]}
        ]))
        .unwrap();

        let summary = DashboardSummary::from_parts(&applications, &lots, &users);
        assert_eq!(summary.applications.pending, 1);
        assert_eq!(summary.applications.in_progress, 1);
        assert_eq!(summary.applications.finished, 2);
        assert_eq!(summary.applications.total(), 4);
        assert_eq!(summary.lots_by_status.get("COMPLETED"), Some(&2));
        assert_eq!(summary.users_by_role.get("ROLE_TECHNICIAN"), Some(&2));
    }
}
