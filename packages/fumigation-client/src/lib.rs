//! Session-aware client for the fumigation service backend.
//!
//! Keeps the signed-in user and token, attaches the token to every request,
//! renews it silently when the server answers 401, and routes users to the
//! screens their roles allow.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fumigation_client::{ApiClient, ClientConfig, SessionManager, TokenStore};
//!
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(TokenStore::from_config(&config));
//! let api = Arc::new(ApiClient::from_config(&config, store)?);
//! let session = SessionManager::new(api.clone(), &config);
//!
//! session.init().await;
//! session.sign_in("ana@example.com", "secret", true).await?;
//!
//! let lots = api.lots().assigned().await?;
//! println!("landing at {}", session.landing_route().path());
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod services;
pub mod session;
pub mod testing;
pub mod types;

pub use config::{AuthHeaderStyle, ClientConfig, Locale, Platform};
pub use error::{ClientError, Result, StorageError};
pub use forms::{Capabilities, FieldError, FormMode, ReportForm, ReportKind, Validate};
pub use http::{ApiClient, ApiResponse, Failure, FailureKind, RetryPolicy, Transport};
pub use services::DashboardSummary;
pub use session::{
    guard, landing_route, AuthState, FileStorage, Guarded, MemoryStorage, Route, SessionManager,
    SessionStorage, TokenStore,
};
pub use types::*;
