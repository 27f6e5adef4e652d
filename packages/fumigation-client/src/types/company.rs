use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityId;

/// Client company that owns fumigation applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: EntityId,
    #[serde(alias = "nombre", alias = "razonSocial")]
    pub name: String,
    #[serde(default, alias = "ruc")]
    pub tax_id: Option<String>,
    #[serde(default, alias = "direccion")]
    pub address: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
