//! Field evidence submitted by technicians.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityId;

/// A product used during a fumigation or cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supply {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "cantidad")]
    pub quantity: f64,
    #[serde(alias = "unidad")]
    pub unit: String,
    #[serde(default, alias = "dosis", skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
}

/// Fumigation report for one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FumigationReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(alias = "loteId")]
    pub lot_id: EntityId,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "horaInicio")]
    pub start_time: NaiveTime,
    #[serde(alias = "horaFin")]
    pub end_time: NaiveTime,
    #[serde(alias = "ubicacion")]
    pub location: String,
    /// Degrees Celsius
    #[serde(default, alias = "temperatura")]
    pub temperature: Option<f64>,
    /// Relative humidity, percent
    #[serde(default, alias = "humedad")]
    pub humidity: Option<f64>,
    #[serde(default, alias = "insumos")]
    pub supplies: Vec<Supply>,
    #[serde(default, alias = "observaciones")]
    pub observations: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cleanup ("descarpe") report, filed when the tarps come off a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(alias = "loteId")]
    pub lot_id: EntityId,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "horaInicio")]
    pub start_time: NaiveTime,
    #[serde(alias = "horaFin")]
    pub end_time: NaiveTime,
    #[serde(default, alias = "lonasRetiradas")]
    pub tarps_removed: bool,
    #[serde(default, alias = "insumos")]
    pub supplies: Vec<Supply>,
    #[serde(default, alias = "observaciones")]
    pub observations: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who signed a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureKind {
    #[serde(alias = "TECNICO")]
    Technician,
    #[serde(alias = "CLIENTE")]
    Client,
    Supervisor,
}

/// A handwritten signature attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(alias = "reporteId")]
    pub report_id: EntityId,
    #[serde(alias = "tipo")]
    pub kind: SignatureKind,
    #[serde(alias = "nombreFirmante")]
    pub signer_name: String,
    /// PNG image, base64 encoded
    #[serde(alias = "imagen")]
    pub image_base64: String,
}

impl Signature {
    pub fn from_png(
        report_id: EntityId,
        kind: SignatureKind,
        signer_name: impl Into<String>,
        png: &[u8],
    ) -> Self {
        Signature {
            id: None,
            report_id,
            kind,
            signer_name: signer_name.into(),
            image_base64: STANDARD.encode(png),
        }
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.image_base64.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_spanish_report_fields() {
        let report: FumigationReport = serde_json::from_value(json!({
            "loteId": 4,
            "fecha": "2026-03-02",
            "horaInicio": "08:00:00",
            "horaFin": "10:30:00",
            "ubicacion": "Bodega 2",
            "humedad": 70.5,
            "insumos": [{"nombre": "Fosfina", "cantidad": 3.0, "unidad": "kg"}]
        }))
        .unwrap();
        assert_eq!(report.lot_id, EntityId::from(4));
        assert_eq!(report.supplies[0].name, "Fosfina");
        assert_eq!(report.humidity, Some(70.5));
    }

    #[test]
    fn signature_keeps_png_bytes() {
        let png = [0x89, b'P', b'N', b'G'];
        let signature = Signature::from_png(EntityId::from(1), SignatureKind::Client, "Rosa", &png);
        assert_eq!(signature.png_bytes().unwrap(), png);
        assert_eq!(serde_json::to_value(&signature).unwrap()["kind"], json!("CLIENT"));
    }
}
