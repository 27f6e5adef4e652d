//! Command implementations

pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod lots;
pub mod reports;
pub mod shell;
pub mod users;

use anyhow::{Context, Result};
use fumigation_client::EntityId;

/// Parse an id argument; numeric ids stay numeric on the wire.
pub fn entity_id(raw: &str) -> EntityId {
    EntityId::new(raw.trim())
}

/// Parse a `NAME:VALUE` pair.
pub fn split_pair<'a>(raw: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once(':')
        .map(|(a, b)| (a.trim(), b.trim()))
        .with_context(|| format!("Expected {} as NAME:VALUE, got '{}'", what, raw))
}
