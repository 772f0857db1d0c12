//! Rules for marking a system as decommissioned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::FismaSystem;

/// Longest notes the backend accepts.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Notes longer than this are cut short in confirmation prompts.
pub const MAX_NOTES_DISPLAY_LENGTH: usize = 100;

/// Trim notes and shorten them for display.
pub fn truncate_notes(notes: &str) -> String {
    let trimmed = notes.trim();
    if trimmed.chars().count() > MAX_NOTES_DISPLAY_LENGTH {
        let head: String = trimmed.chars().take(MAX_NOTES_DISPLAY_LENGTH).collect();
        format!("{head}...")
    } else {
        trimmed.to_owned()
    }
}

fn invalid(reason: &str) -> CoreError {
    CoreError::InvalidDate {
        reason: reason.to_owned(),
    }
}

/// Parse a `YYYY-MM-DD` decommission date that must not lie after `today`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] when the input is empty, malformed,
/// or in the future.
pub fn validate_date(input: &str, today: NaiveDate) -> Result<NaiveDate, CoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid("Date is required"));
    }
    let date =
        NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid("Invalid date"))?;
    if date > today {
        return Err(invalid("Date cannot be in the future"));
    }
    Ok(date)
}

/// Body of `DELETE /fismasystems/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecommissionRequest {
    pub decommissioned_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DecommissionRequest {
    /// Validate user input and build the request body.
    ///
    /// # Errors
    ///
    /// Fails on an invalid date or on notes longer than
    /// [`MAX_NOTES_LENGTH`] characters.
    pub fn new(date: &str, notes: &str, today: NaiveDate) -> Result<Self, CoreError> {
        Self::for_date(validate_date(date, today)?, notes)
    }

    /// Build the body for a date that has already been validated.
    ///
    /// # Errors
    ///
    /// Fails on notes longer than [`MAX_NOTES_LENGTH`] characters.
    pub fn for_date(date: NaiveDate, notes: &str) -> Result<Self, CoreError> {
        let notes = notes.trim();
        let actual = notes.chars().count();
        if actual > MAX_NOTES_LENGTH {
            return Err(CoreError::NotesTooLong {
                max: MAX_NOTES_LENGTH,
                actual,
            });
        }
        Ok(Self {
            decommissioned_date: format!("{}T00:00:00.000Z", date.format("%Y-%m-%d")),
            notes: (!notes.is_empty()).then(|| notes.to_owned()),
        })
    }
}

/// Confirmation prompt shown before decommissioning `system`.
///
/// A system that is already decommissioned gets the update wording.
pub fn confirmation_text(system: &FismaSystem, date: NaiveDate, notes: &str) -> String {
    let name = &system.fismaname;
    let when = date.format("%-m/%-d/%Y");
    let short = truncate_notes(notes);
    let suffix = if short.is_empty() {
        String::new()
    } else {
        format!(" Notes: \"{short}\"")
    };
    if system.decommissioned {
        format!("Update decommission details for \"{name}\" to {when}?{suffix}")
    } else {
        format!(
            "Are you sure you want to decommission \"{name}\" on {when}?{suffix} \
             This will hide the system from the active systems list. \
             This action cannot be undone through the UI."
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn truncate_trims_and_shortens() {
        assert_eq!(truncate_notes("   "), "");
        assert_eq!(truncate_notes("  retired  "), "retired");
        let long = "x".repeat(150);
        let short = truncate_notes(&long);
        assert_eq!(short.len(), 103);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_notes(&"y".repeat(100)).len(), 100);
    }

    #[test]
    fn date_validation_messages() {
        assert_eq!(validate_date("", today()).unwrap_err().to_string(), "Date is required");
        assert_eq!(validate_date("15/06/2025", today()).unwrap_err().to_string(), "Invalid date");
        assert_eq!(
            validate_date("2025-06-16", today()).unwrap_err().to_string(),
            "Date cannot be in the future"
        );
        assert_eq!(validate_date("2025-06-15", today()).unwrap(), today());
    }

    #[test]
    fn request_serializes_midnight_utc() {
        let req = DecommissionRequest::new("2025-01-31", "  moved to cloud ", today()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["decommissioned_date"], "2025-01-31T00:00:00.000Z");
        assert_eq!(json["notes"], "moved to cloud");
    }

    #[test]
    fn empty_notes_are_omitted() {
        let req = DecommissionRequest::new("2025-01-31", "   ", today()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn long_notes_are_rejected() {
        let req = DecommissionRequest::for_date(today(), &"n".repeat(500)).unwrap();
        assert_eq!(req.decommissioned_date, "2025-06-15T00:00:00.000Z");
        assert_eq!(req.notes.map(|n| n.len()), Some(500));

        let err = DecommissionRequest::new("2025-01-31", &"n".repeat(501), today()).unwrap_err();
        assert_eq!(err, CoreError::NotesTooLong { max: 500, actual: 501 });
    }

    #[test]
    fn confirmation_wording() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let mut system = FismaSystem {
            fismaname: "Payments".to_owned(),
            ..FismaSystem::default()
        };
        let first = confirmation_text(&system, date, "");
        assert_eq!(
            first,
            "Are you sure you want to decommission \"Payments\" on 3/4/2025? \
             This will hide the system from the active systems list. \
             This action cannot be undone through the UI."
        );

        system.decommissioned = true;
        let update = confirmation_text(&system, date, " old dc ");
        assert_eq!(
            update,
            "Update decommission details for \"Payments\" to 3/4/2025? Notes: \"old dc\""
        );
    }
}
