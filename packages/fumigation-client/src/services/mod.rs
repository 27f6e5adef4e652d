//! Typed wrappers over the backend's resource endpoints.
//!
//! Each service borrows the [`ApiClient`] and inherits its session handling.
//! Expected HTTP failures come back as
//! [`ApiResponse::Failure`](crate::http::ApiResponse::Failure); a payload of
//! the wrong shape is a [`ClientError::Decode`](crate::error::ClientError).

pub mod applications;
pub mod auth;
pub mod companies;
pub mod dashboard;
pub mod lots;
pub mod reports;
pub mod users;

pub use applications::Applications;
pub use auth::Auth;
pub use companies::Companies;
pub use dashboard::{Dashboard, DashboardSummary};
pub use lots::Lots;
pub use reports::Reports;
pub use users::{NewUser, UpdateUser, Users};

use crate::http::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn applications(&self) -> Applications<'_> {
        Applications::new(self)
    }

    pub fn lots(&self) -> Lots<'_> {
        Lots::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn reports(&self) -> Reports<'_> {
        Reports::new(self)
    }

    pub fn companies(&self) -> Companies<'_> {
        Companies::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }
}
