//! Wire types shared by the session layer and the domain services.

pub mod application;
pub mod auth;
pub mod company;
pub mod listing;
pub mod report;
pub mod user;

pub use application::{
    categorize, filter_by_bucket, ApplicationStatus, CreateApplication, FumigationApplication,
    Lot, LotStatus, NewLot, StatusBucket,
};
pub use auth::{Credentials, LoginResponse, RefreshCredential};
pub use company::Company;
pub use listing::{page_count, paginate, Listing, Page, PageRequest};
pub use report::{CleanupReport, FumigationReport, Signature, SignatureKind, Supply};
pub use user::{Role, RoleKind, User, ROLE_ADMIN, ROLE_CLIENT, ROLE_TECHNICIAN};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Backend entity identifier.
///
/// The backend mixes numeric and string ids; both decode into this type and
/// are written back the way they arrived. Equality ignores the wire form.
#[derive(Debug, Clone)]
pub struct EntityId {
    value: String,
    numeric: bool,
}

impl EntityId {
    /// Canonical integers (`42`, not `042`) are sent as JSON numbers.
    pub fn new(id: impl Into<String>) -> Self {
        let value = id.into();
        let numeric = value
            .parse::<i64>()
            .is_ok_and(|n| n.to_string() == value);
        EntityId { value, numeric }
    }

    /// An id sent as a JSON string whatever it looks like.
    pub fn text(id: impl Into<String>) -> Self {
        EntityId {
            value: id.into(),
            numeric: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    pub(crate) fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(EntityId {
                value: n.to_string(),
                numeric: true,
            }),
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(EntityId::text(s.trim()))
            }
            _ => None,
        }
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId {
            value: id.to_string(),
            numeric: true,
        }
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::new(id)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.numeric {
            if let Ok(n) = self.value.parse::<serde_json::Number>() {
                return n.serialize(serializer);
            }
        }
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        EntityId::from_json(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid id: {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_stay_numeric_on_the_wire() {
        let id: EntityId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(42));

        let id: EntityId = serde_json::from_value(json!("lot-7")).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("lot-7"));
    }

    #[test]
    fn string_ids_stay_strings_even_when_they_look_numeric() {
        for raw in ["007", "42"] {
            let id: EntityId = serde_json::from_value(json!(raw)).unwrap();
            assert!(!id.is_numeric());
            assert_eq!(serde_json::to_value(&id).unwrap(), json!(raw));
        }
        assert_eq!(EntityId::new("007").as_str(), "007");
        assert!(!EntityId::new("007").is_numeric());
        assert!(EntityId::new("42").is_numeric());
        assert_eq!(EntityId::new("42"), EntityId::text("42"));
    }

    #[test]
    fn rejects_empty_and_structured_ids() {
        assert!(serde_json::from_value::<EntityId>(json!("")).is_err());
        assert!(serde_json::from_value::<EntityId>(json!({"id": 1})).is_err());
    }
}
