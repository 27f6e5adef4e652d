//! User and role types, normalized from the backend's mixed field naming.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::EntityId;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_TECHNICIAN: &str = "ROLE_TECHNICIAN";
pub const ROLE_CLIENT: &str = "ROLE_CLIENT";

/// The roles the application knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Admin,
    Technician,
    Client,
}

impl RoleKind {
    /// Landing priority: admin first, then technician, then client.
    pub const PRIORITY: [RoleKind; 3] = [RoleKind::Admin, RoleKind::Technician, RoleKind::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Admin => ROLE_ADMIN,
            RoleKind::Technician => ROLE_TECHNICIAN,
            RoleKind::Client => ROLE_CLIENT,
        }
    }
}

/// A role tag as sent by the backend: `{"name": "ROLE_ADMIN"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Role {
    pub name: String,
}

impl Role {
    /// Build a role, canonicalizing known aliases (`ADMIN`, `ROLE_TECNICO`, ...).
    /// Unknown names are kept as given.
    pub fn new(name: impl AsRef<str>) -> Self {
        let raw = name.as_ref().trim();
        let upper = raw.to_ascii_uppercase();
        let bare = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        let canonical = match bare {
            "ADMIN" | "ADMINISTRADOR" | "ADMINISTRATOR" => ROLE_ADMIN.to_string(),
            "TECHNICIAN" | "TECNICO" => ROLE_TECHNICIAN.to_string(),
            "CLIENT" | "CLIENTE" => ROLE_CLIENT.to_string(),
            _ => raw.to_string(),
        };
        Role { name: canonical }
    }

    pub fn kind(&self) -> Option<RoleKind> {
        match self.name.as_str() {
            ROLE_ADMIN => Some(RoleKind::Admin),
            ROLE_TECHNICIAN => Some(RoleKind::Technician),
            ROLE_CLIENT => Some(RoleKind::Client),
            _ => None,
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Role::new(s)),
            Value::Object(map) => first_str(map, &["name", "nombre", "authority", "role", "rol"])
                .map(Role::new),
            _ => None,
        }
    }
}

impl From<RoleKind> for Role {
    fn from(kind: RoleKind) -> Self {
        Role {
            name: kind.as_str().to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Role::from_json(&value).ok_or_else(|| de::Error::custom(format!("invalid role: {}", value)))
    }
}

/// Canonical user profile.
///
/// Deserialization accepts any of the backend's naming conventions; serialization
/// always writes the canonical camelCase shape, so decoding a serialized user is
/// a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

const ID_KEYS: &[&str] = &["id", "userId", "user_id", "idUsuario"];
const FIRST_NAME_KEYS: &[&str] = &["firstName", "first_name", "nombre", "nombres"];
const LAST_NAME_KEYS: &[&str] = &["lastName", "last_name", "apellido", "apellidos"];
const EMAIL_KEYS: &[&str] = &["email", "correo", "username"];

impl User {
    /// Normalize a raw backend user object.
    pub fn normalize(value: &Value) -> Option<User> {
        value.as_object().map(User::from_map)
    }

    fn from_map(map: &Map<String, Value>) -> User {
        let id = ID_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(EntityId::from_json));

        let mut roles: Vec<Role> = Vec::new();
        let mut push = |role: Role| {
            if !roles.contains(&role) {
                roles.push(role);
            }
        };
        for key in ["roles", "authorities"] {
            if let Some(Value::Array(items)) = map.get(key) {
                items.iter().filter_map(Role::from_json).for_each(&mut push);
            }
        }
        for key in ["role", "rol"] {
            if let Some(role) = map.get(key).and_then(Role::from_json) {
                push(role);
            }
        }

        User {
            id,
            first_name: first_str(map, FIRST_NAME_KEYS).unwrap_or_default().to_string(),
            last_name: first_str(map, LAST_NAME_KEYS).unwrap_or_default().to_string(),
            email: first_str(map, EMAIL_KEYS).unwrap_or_default().to_string(),
            roles,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// True if the user holds at least one of `candidates`.
    pub fn has_role<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        candidates.iter().any(|candidate| {
            let wanted = Role::new(candidate.as_ref());
            self.roles.iter().any(|role| role.name == wanted.name)
        })
    }

    pub fn has_kind(&self, kind: RoleKind) -> bool {
        self.roles.iter().any(|role| role.kind() == Some(kind))
    }

    /// Highest-priority known role, if any.
    pub fn primary_role(&self) -> Option<RoleKind> {
        RoleKind::PRIORITY
            .into_iter()
            .find(|kind| self.has_kind(*kind))
    }
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        User::normalize(&value)
            .ok_or_else(|| de::Error::custom("expected a user object"))
    }
}

fn first_str<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}
