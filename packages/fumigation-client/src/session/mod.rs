//! Session management: token storage, auth state and role routing.

pub mod manager;
pub mod router;
pub mod storage;
pub mod token_store;

pub use manager::{AuthState, SessionManager};
pub use router::{guard, landing_route, AccessDenied, Guarded, Route};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use token_store::{Session, TokenStore};
