//! Fumigation applications and their lots.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{EntityId, User};

// ============================================================================
// Statuses
// ============================================================================

/// Lifecycle of a client's fumigation application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    /// A status this client does not know, kept as sent.
    Other(String),
}

impl ApplicationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => ApplicationStatus::Pending,
            "APPROVED" | "APROBADO" | "APROBADA" | "IN_PROGRESS" | "EN_PROCESO" => {
                ApplicationStatus::Approved
            }
            "REJECTED" | "RECHAZADO" | "RECHAZADA" => ApplicationStatus::Rejected,
            "COMPLETED" | "FINISHED" | "FINALIZADO" | "FINALIZADA" | "COMPLETADO" => {
                ApplicationStatus::Completed
            }
            _ => ApplicationStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Completed => "COMPLETED",
            ApplicationStatus::Other(raw) => raw,
        }
    }
}

/// Lifecycle of a single lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LotStatus {
    Pending,
    InService,
    Completed,
    Other(String),
}

impl LotStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => LotStatus::Pending,
            "IN_SERVICE" | "EN_SERVICIO" | "APPROVED" | "APROBADO" | "IN_PROGRESS" => {
                LotStatus::InService
            }
            "COMPLETED" | "COMPLETADO" | "FUMIGATED" | "FUMIGADO" | "FINALIZADO" => {
                LotStatus::Completed
            }
            _ => LotStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LotStatus::Pending => "PENDING",
            LotStatus::InService => "IN_SERVICE",
            LotStatus::Completed => "COMPLETED",
            LotStatus::Other(raw) => raw,
        }
    }

    fn rank(&self) -> Option<u8> {
        match self {
            LotStatus::Pending => Some(0),
            LotStatus::InService => Some(1),
            LotStatus::Completed => Some(2),
            LotStatus::Other(_) => None,
        }
    }

    /// Lots only move forward; completed is terminal.
    pub fn can_transition_to(&self, next: &LotStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

macro_rules! string_status_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(<$ty>::parse(&raw))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(<$ty>::parse(s))
            }
        }
    };
}

string_status_serde!(ApplicationStatus);
string_status_serde!(LotStatus);

// ============================================================================
// Entities
// ============================================================================

/// A batch of product scheduled for fumigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: EntityId,
    #[serde(default, alias = "numeroLote", alias = "lotNumber")]
    pub code: Option<String>,
    #[serde(alias = "estado")]
    pub status: LotStatus,
    #[serde(default, alias = "toneladas")]
    pub tons: Option<f64>,
    #[serde(default, alias = "tecnicos")]
    pub technicians: Vec<User>,
    #[serde(default, alias = "fechaProgramada")]
    pub scheduled_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A client's request for fumigation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FumigationApplication {
    pub id: EntityId,
    #[serde(alias = "estado")]
    pub status: ApplicationStatus,
    #[serde(default, alias = "empresa")]
    pub company_name: Option<String>,
    #[serde(default, alias = "ubicacion")]
    pub location: Option<String>,
    #[serde(default, alias = "lotes")]
    pub lots: Vec<Lot>,
    #[serde(default, alias = "motivoRechazo")]
    pub rejection_reason: Option<String>,
    #[serde(default, alias = "fechaCreacion")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// New lot inside a [`CreateApplication`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLot {
    pub code: String,
    pub tons: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
}

/// Body of `POST /fumigation-applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
    pub location: String,
    pub lots: Vec<NewLot>,
}

// ============================================================================
// Buckets
// ============================================================================

/// Dashboard grouping of applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    Pending,
    InProgress,
    Finished,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 3] = [
        StatusBucket::Pending,
        StatusBucket::InProgress,
        StatusBucket::Finished,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatusBucket::Pending => "pending",
            StatusBucket::InProgress => "in-progress",
            StatusBucket::Finished => "finished",
        }
    }
}

impl std::str::FromStr for StatusBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(StatusBucket::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(StatusBucket::InProgress),
            "finished" | "done" => Ok(StatusBucket::Finished),
            other => Err(format!("unknown bucket '{}'", other)),
        }
    }
}

/// Bucket an application by its status and its lots.
///
/// Rejected applications count as finished. An approved application whose lots
/// are all completed is finished even if the backend has not closed it yet.
/// Unknown statuses fall back to pending so they stay visible for review.
pub fn categorize(application: &FumigationApplication) -> StatusBucket {
    match application.status {
        ApplicationStatus::Pending | ApplicationStatus::Other(_) => StatusBucket::Pending,
        ApplicationStatus::Rejected | ApplicationStatus::Completed => StatusBucket::Finished,
        ApplicationStatus::Approved => {
            let all_done = !application.lots.is_empty()
                && application
                    .lots
                    .iter()
                    .all(|lot| lot.status == LotStatus::Completed);
            if all_done {
                StatusBucket::Finished
            } else {
                StatusBucket::InProgress
            }
        }
    }
}

impl FumigationApplication {
    pub fn bucket(&self) -> StatusBucket {
        categorize(self)
    }
}

/// Keep the applications that fall into `bucket`, preserving order.
pub fn filter_by_bucket(
    applications: &[FumigationApplication],
    bucket: StatusBucket,
) -> Vec<&FumigationApplication> {
    applications
        .iter()
        .filter(|application| categorize(application) == bucket)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn application(status: &str, lots: &[&str]) -> FumigationApplication {
        let lots: Vec<Value> = lots
            .iter()
            .enumerate()
            .map(|(i, s)| json!({"id": i, "status": s}))
            .collect();
        serde_json::from_value(json!({"id": 1, "status": status, "lots": lots})).unwrap()
    }

    #[test]
    fn categorizes_by_status_and_lots() {
        assert_eq!(categorize(&application("PENDIENTE", &[])), StatusBucket::Pending);
        assert_eq!(
            categorize(&application("APROBADO", &["COMPLETED", "EN_SERVICIO"])),
            StatusBucket::InProgress
        );
        assert_eq!(
            categorize(&application("APPROVED", &["FUMIGADO", "COMPLETED"])),
            StatusBucket::Finished
        );
        assert_eq!(categorize(&application("APPROVED", &[])), StatusBucket::InProgress);
        assert_eq!(categorize(&application("RECHAZADO", &[])), StatusBucket::Finished);
        assert_eq!(categorize(&application("ARCHIVED", &[])), StatusBucket::Pending);
    }

    #[test]
    fn filter_by_bucket_keeps_order() {
        let apps = vec![
            application("PENDING", &[]),
            application("APPROVED", &["PENDING"]),
            application("PENDING", &[]),
        ];
        let pending = filter_by_bucket(&apps, StatusBucket::Pending);
        assert_eq!(pending.len(), 2);
        assert!(std::ptr::eq(pending[0], &apps[0]));
        assert!(std::ptr::eq(pending[1], &apps[2]));
    }

    #[test]
    fn lot_transitions_only_move_forward() {
        assert!(LotStatus::Pending.can_transition_to(&LotStatus::InService));
        assert!(LotStatus::Pending.can_transition_to(&LotStatus::Completed));
        assert!(!LotStatus::Completed.can_transition_to(&LotStatus::InService));
        assert!(!LotStatus::InService.can_transition_to(&LotStatus::InService));
        assert!(!LotStatus::Pending.can_transition_to(&LotStatus::Other("X".into())));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": 9,
            "estado": "PENDIENTE",
            "empresa": "Cacao Norte",
            "lotes": [],
            "observaciones": "urgent"
        });
        let app: FumigationApplication = serde_json::from_value(raw).unwrap();
        assert_eq!(app.company_name.as_deref(), Some("Cacao Norte"));
        assert_eq!(app.extra.get("observaciones"), Some(&json!("urgent")));

        let back = serde_json::to_value(&app).unwrap();
        assert_eq!(back["observaciones"], json!("urgent"));
        assert_eq!(back["status"], json!("PENDING"));
    }

    #[test]
    fn bucket_parses_from_cli_text() {
        assert_eq!("in-progress".parse::<StatusBucket>().unwrap(), StatusBucket::InProgress);
        assert!("later".parse::<StatusBucket>().is_err());
    }
}
