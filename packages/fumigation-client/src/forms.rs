//! Report forms and client-side validation.
//!
//! Admins and technicians fill in the same fumigation and cleanup reports;
//! what differs is captured by [`FormMode`] and its [`Capabilities`].

use std::fmt;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde_json::Map;

use crate::error::{ClientError, Result};
use crate::types::{CleanupReport, EntityId, FumigationReport, Supply};

/// Plausible ambient temperature range in degrees Celsius.
pub const TEMPERATURE_RANGE: (f64, f64) = (-10.0, 60.0);

/// How far back a technician may date a report.
pub const TECHNICIAN_BACKDATE_DAYS: i64 = 2;

/// Something that can be checked before it is sent to the backend.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Collects field errors, then converts them into a single result.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn require<T>(&mut self, value: Option<&T>, field: &'static str) -> &mut Self {
        if value.is_none() {
            self.errors.push(FieldError::required(field));
        }
        self
    }

    pub fn require_text(&mut self, value: &str, field: &'static str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::required(field));
        }
        self
    }

    pub fn in_range(
        &mut self,
        value: Option<f64>,
        (min, max): (f64, f64),
        field: &'static str,
    ) -> &mut Self {
        if let Some(v) = value {
            if !(min..=max).contains(&v) {
                self.errors
                    .push(FieldError::new(field, format!("must be between {} and {}", min, max)));
            }
        }
        self
    }

    pub fn time_order(
        &mut self,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                self.errors
                    .push(FieldError::new("endTime", "must be after the start time"));
            }
        }
        self
    }

    pub fn supplies(&mut self, supplies: &[Supply]) -> &mut Self {
        for supply in supplies {
            if supply.name.trim().is_empty() {
                self.errors.push(FieldError::new("supplies", "every supply needs a name"));
            }
            if !(supply.quantity > 0.0) {
                self.errors.push(FieldError::new(
                    "supplies",
                    format!("quantity of '{}' must be greater than zero", supply.name),
                ));
            }
        }
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ClientError::Validation(message))
    }
}

impl Validate for FumigationReport {
    fn validate(&self) -> Result<()> {
        Validator::new()
            .require_text(&self.location, "location")
            .time_order(Some(self.start_time), Some(self.end_time))
            .in_range(self.temperature, TEMPERATURE_RANGE, "temperature")
            .in_range(self.humidity, (0.0, 100.0), "humidity")
            .supplies(&self.supplies)
            .finish()
    }
}

impl Validate for CleanupReport {
    fn validate(&self) -> Result<()> {
        Validator::new()
            .time_order(Some(self.start_time), Some(self.end_time))
            .supplies(&self.supplies)
            .finish()
    }
}

// ============================================================================
// Report form
// ============================================================================

/// Who is filling the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Admin,
    Technician,
}

/// What a [`FormMode`] may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// May date a report further back than [`TECHNICIAN_BACKDATE_DAYS`].
    pub backdate: bool,
    /// Temperature and humidity must be recorded on fumigation reports.
    pub require_conditions: bool,
}

impl FormMode {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            FormMode::Admin => Capabilities {
                backdate: true,
                require_conditions: false,
            },
            FormMode::Technician => Capabilities {
                backdate: false,
                require_conditions: true,
            },
        }
    }
}

/// Which report a form produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Fumigation,
    Cleanup,
}

/// Editable fumigation or cleanup report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportForm {
    mode: FormMode,
    pub lot_id: Option<EntityId>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub tarps_removed: bool,
    pub supplies: Vec<Supply>,
    pub observations: Option<String>,
}

impl ReportForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            lot_id: None,
            date: None,
            start_time: None,
            end_time: None,
            location: String::new(),
            temperature: None,
            humidity: None,
            tarps_removed: false,
            supplies: Vec::new(),
            observations: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn capabilities(&self) -> Capabilities {
        self.mode.capabilities()
    }

    /// Every problem with the form, checked against today's date.
    pub fn errors(&self, kind: ReportKind) -> Vec<FieldError> {
        self.errors_on(kind, Local::now().date_naive())
    }

    pub fn errors_on(&self, kind: ReportKind, today: NaiveDate) -> Vec<FieldError> {
        let mut v = Validator::new();
        v.require(self.lot_id.as_ref(), "lotId")
            .require(self.date.as_ref(), "date")
            .require(self.start_time.as_ref(), "startTime")
            .require(self.end_time.as_ref(), "endTime")
            .time_order(self.start_time, self.end_time)
            .supplies(&self.supplies);

        let capabilities = self.capabilities();
        if let Some(date) = self.date {
            v.check(date <= today, "date", "cannot be in the future");
            if !capabilities.backdate {
                let earliest = today - Duration::days(TECHNICIAN_BACKDATE_DAYS);
                v.check(
                    date >= earliest,
                    "date",
                    format!("cannot be more than {} days ago", TECHNICIAN_BACKDATE_DAYS),
                );
            }
        }

        if kind == ReportKind::Fumigation {
            v.require_text(&self.location, "location")
                .in_range(self.temperature, TEMPERATURE_RANGE, "temperature")
                .in_range(self.humidity, (0.0, 100.0), "humidity");
            if capabilities.require_conditions {
                v.require(self.temperature.as_ref(), "temperature")
                    .require(self.humidity.as_ref(), "humidity");
            }
        }

        v.errors().to_vec()
    }

    pub fn is_valid(&self, kind: ReportKind) -> bool {
        self.errors(kind).is_empty()
    }

    pub fn into_fumigation(self) -> Result<FumigationReport> {
        self.into_fumigation_on(Local::now().date_naive())
    }

    pub fn into_fumigation_on(self, today: NaiveDate) -> Result<FumigationReport> {
        let parts = self.checked(ReportKind::Fumigation, today)?;
        Ok(FumigationReport {
            id: None,
            lot_id: parts.lot_id,
            date: parts.date,
            start_time: parts.start_time,
            end_time: parts.end_time,
            location: self.location.trim().to_string(),
            temperature: self.temperature,
            humidity: self.humidity,
            supplies: self.supplies,
            observations: non_blank(self.observations),
            extra: Map::new(),
        })
    }

    pub fn into_cleanup(self) -> Result<CleanupReport> {
        self.into_cleanup_on(Local::now().date_naive())
    }

    pub fn into_cleanup_on(self, today: NaiveDate) -> Result<CleanupReport> {
        let parts = self.checked(ReportKind::Cleanup, today)?;
        Ok(CleanupReport {
            id: None,
            lot_id: parts.lot_id,
            date: parts.date,
            start_time: parts.start_time,
            end_time: parts.end_time,
            tarps_removed: self.tarps_removed,
            supplies: self.supplies,
            observations: non_blank(self.observations),
            extra: Map::new(),
        })
    }

    fn checked(&self, kind: ReportKind, today: NaiveDate) -> Result<Required> {
        let errors = self.errors_on(kind, today);
        if !errors.is_empty() {
            return Err(ClientError::Validation(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }
        match (&self.lot_id, self.date, self.start_time, self.end_time) {
            (Some(lot_id), Some(date), Some(start_time), Some(end_time)) => Ok(Required {
                lot_id: lot_id.clone(),
                date,
                start_time,
                end_time,
            }),
            _ => Err(ClientError::Validation("incomplete report".to_string())),
        }
    }
}

struct Required {
    lot_id: EntityId,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn filled(mode: FormMode) -> ReportForm {
        let mut form = ReportForm::new(mode);
        form.lot_id = Some(EntityId::from(7));
        form.date = Some(day("2024-03-10"));
        form.start_time = Some(time("08:00"));
        form.end_time = Some(time("10:30"));
        form.location = "Warehouse 3".to_string();
        form.temperature = Some(28.5);
        form.humidity = Some(70.0);
        form.supplies = vec![Supply {
            name: "Phosphine".to_string(),
            quantity: 2.0,
            unit: "kg".to_string(),
            dosage: None,
        }];
        form
    }

    #[test]
    fn complete_form_builds_report() {
        let report = filled(FormMode::Technician)
            .into_fumigation_on(day("2024-03-11"))
            .unwrap();
        assert_eq!(report.lot_id, EntityId::from(7));
        assert_eq!(report.location, "Warehouse 3");
        assert_eq!(report.supplies.len(), 1);
    }

    #[test]
    fn end_must_follow_start() {
        let mut form = filled(FormMode::Admin);
        form.end_time = Some(time("07:00"));
        let errors = form.errors_on(ReportKind::Cleanup, day("2024-03-10"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "endTime");
    }

    #[test]
    fn technician_needs_conditions_and_recent_date() {
        let mut form = filled(FormMode::Technician);
        form.temperature = None;
        form.date = Some(day("2024-03-01"));
        let fields: Vec<_> = form
            .errors_on(ReportKind::Fumigation, day("2024-03-10"))
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert!(fields.contains(&"temperature"));
        assert!(fields.contains(&"date"));
    }

    #[test]
    fn admin_may_backdate_without_conditions() {
        let mut form = filled(FormMode::Admin);
        form.temperature = None;
        form.humidity = None;
        form.date = Some(day("2024-01-01"));
        assert!(form.errors_on(ReportKind::Fumigation, day("2024-03-10")).is_empty());
    }

    #[test]
    fn rejects_bad_supplies_and_ranges() {
        let mut form = filled(FormMode::Admin);
        form.humidity = Some(120.0);
        form.supplies[0].quantity = 0.0;
        let err = form.into_fumigation_on(day("2024-03-10")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("humidity"));
        assert!(message.contains("Phosphine"));
    }

    #[test]
    fn future_dates_rejected_for_everyone() {
        let form = filled(FormMode::Admin);
        let errors = form.errors_on(ReportKind::Cleanup, day("2024-03-09"));
        assert!(errors.iter().any(|e| e.field == "date"));
    }

    #[test]
    fn empty_form_lists_required_fields() {
        let form = ReportForm::new(FormMode::Admin);
        let fields: Vec<_> = form
            .errors_on(ReportKind::Fumigation, day("2024-03-10"))
            .into_iter()
            .map(|e| e.field)
            .collect();
        for field in ["lotId", "date", "startTime", "endTime", "location"] {
            assert!(fields.contains(&field), "missing {}", field);
        }
    }

    #[test]
    fn modes_differ_in_backdating_and_conditions() {
        let admin = ReportForm::new(FormMode::Admin).capabilities();
        let technician = ReportForm::new(FormMode::Technician).capabilities();
        assert!(admin.backdate && !admin.require_conditions);
        assert!(!technician.backdate && technician.require_conditions);
    }

    #[test]
    fn stored_report_validates() {
        let report = filled(FormMode::Admin)
            .into_fumigation_on(day("2024-03-10"))
            .unwrap();
        assert!(report.validate().is_ok());

        let mut broken = report;
        broken.temperature = Some(99.0);
        assert!(matches!(broken.validate(), Err(ClientError::Validation(_))));
    }
}
