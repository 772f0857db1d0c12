//! Field configuration and client-side validation for system and datacall
//! forms.
//!
//! Client checks only catch obvious mistakes before a request is sent. The
//! backend stays authoritative: a 400 response carries field-keyed messages
//! that [`SystemForm::apply_server_errors`] folds back into the form.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::FismaSystem;

pub const REQUIRED_HELPER_TEXT: &str = "This field is required";
pub const EMAIL_HELPER_TEXT: &str = "Enter a valid email address";
pub const SELECT_HELPER_TEXT: &str = "Select a valid option";

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static DATACALL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^FY\d{4} Q\d$").ok());

/// Layout section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Identity,
    Organization,
    Contacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Email,
    Select,
}

/// Static description of one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
    pub key: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub required: bool,
    pub field_type: FieldType,
}

const fn field(
    key: &'static str,
    label: &'static str,
    section: Section,
    required: bool,
    field_type: FieldType,
) -> FieldConfig {
    FieldConfig {
        key,
        label,
        section,
        required,
        field_type,
    }
}

/// Every editable system field, in display order.
pub const FIELD_CONFIGS: &[FieldConfig] = &[
    field("fismaname", "FISMA Name", Section::Identity, true, FieldType::Text),
    field("fismaacronym", "FISMA Acronym", Section::Identity, true, FieldType::Text),
    field("fismauid", "FISMA UID", Section::Identity, true, FieldType::Text),
    field("fismasubsystem", "FISMA Subsystem", Section::Identity, false, FieldType::Text),
    field("component", "Component", Section::Identity, true, FieldType::Text),
    field(
        "datacenterenvironment",
        "Data Center Environment",
        Section::Identity,
        true,
        FieldType::Select,
    ),
    field("groupacronym", "Group Acronym", Section::Organization, false, FieldType::Text),
    field("groupname", "Group Name", Section::Organization, false, FieldType::Text),
    field("divisionname", "Division Name", Section::Organization, false, FieldType::Text),
    field("issoemail", "ISSO Email", Section::Contacts, true, FieldType::Email),
    field("datacallcontact", "Data Call Contact", Section::Contacts, true, FieldType::Email),
];

/// Allowed values for the data center environment select.
pub const DATACENTER_ENVIRONMENTS: &[&str] = &[
    "CCSQ",
    "CMS-Cloud-AWS",
    "CMS-Cloud-MAG",
    "CMSDC",
    "DECC",
    "OPDC",
    "SaaS",
    "Other",
];

pub fn field_config(key: &str) -> Option<&'static FieldConfig> {
    FIELD_CONFIGS.iter().find(|f| f.key == key)
}

pub fn fields_in(section: Section) -> impl Iterator<Item = &'static FieldConfig> {
    FIELD_CONFIGS.iter().filter(move |f| f.section == section)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Validate one field value against its configuration.
///
/// # Errors
///
/// Returns the helper text to show under the field.
pub fn validate_field(config: &FieldConfig, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return if config.required {
            Err(REQUIRED_HELPER_TEXT.to_owned())
        } else {
            Ok(())
        };
    }
    match config.field_type {
        FieldType::Text => Ok(()),
        FieldType::Email if is_valid_email(value) => Ok(()),
        FieldType::Email => Err(EMAIL_HELPER_TEXT.to_owned()),
        FieldType::Select if DATACENTER_ENVIRONMENTS.contains(&value) => Ok(()),
        FieldType::Select => Err(SELECT_HELPER_TEXT.to_owned()),
    }
}

/// Helper text for a field the backend rejected.
pub fn invalid_input_text(key: &str) -> String {
    let label = field_config(key).map_or(key, |f| f.label);
    format!("Invalid value for {label}")
}

/// Create/update body for a system: exactly the editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPayload {
    pub fismauid: String,
    pub fismaacronym: String,
    pub fismaname: String,
    pub fismasubsystem: Option<String>,
    pub component: String,
    pub groupacronym: Option<String>,
    pub groupname: Option<String>,
    pub divisionname: Option<String>,
    pub datacenterenvironment: String,
    pub datacallcontact: String,
    pub issoemail: String,
}

impl From<&FismaSystem> for SystemPayload {
    fn from(s: &FismaSystem) -> Self {
        Self {
            fismauid: s.fismauid.clone(),
            fismaacronym: s.fismaacronym.clone(),
            fismaname: s.fismaname.clone(),
            fismasubsystem: s.fismasubsystem.clone(),
            component: s.component.clone(),
            groupacronym: s.groupacronym.clone(),
            groupname: s.groupname.clone(),
            divisionname: s.divisionname.clone(),
            datacenterenvironment: s.datacenterenvironment.clone(),
            datacallcontact: s.datacallcontact.clone(),
            issoemail: s.issoemail.clone(),
        }
    }
}

/// Edit state for a create or edit form.
#[derive(Debug, Clone)]
pub struct SystemForm {
    original: FismaSystem,
    draft: FismaSystem,
    errors: BTreeMap<String, String>,
}

impl SystemForm {
    /// Start editing `system`. Every field is validated up front.
    pub fn new(system: FismaSystem) -> Self {
        let mut form = Self {
            draft: system.clone(),
            original: system,
            errors: BTreeMap::new(),
        };
        for config in FIELD_CONFIGS {
            form.revalidate(config);
        }
        form
    }

    /// Blank form for a new system.
    pub fn create() -> Self {
        Self::new(FismaSystem::default())
    }

    /// Change a field and re-validate it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownField`] for keys that are not editable.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let config = field_config(key).ok_or_else(|| CoreError::UnknownField {
            key: key.to_owned(),
        })?;
        self.draft.set_field(key, value)?;
        self.revalidate(config);
        Ok(())
    }

    fn revalidate(&mut self, config: &FieldConfig) {
        let value = self.draft.field(config.key).unwrap_or("");
        match validate_field(config, value) {
            Ok(()) => {
                self.errors.remove(config.key);
            }
            Err(text) => {
                self.errors.insert(config.key.to_owned(), text);
            }
        }
    }

    pub fn draft(&self) -> &FismaSystem {
        &self.draft
    }

    /// Field key to helper text for every invalid field.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.original != self.draft
    }

    /// Mark every field the backend rejected.
    pub fn apply_server_errors(&mut self, fields: &BTreeMap<String, String>) {
        for key in fields.keys() {
            self.errors.insert(key.clone(), invalid_input_text(key));
        }
    }

    pub fn to_payload(&self) -> SystemPayload {
        SystemPayload::from(&self.draft)
    }
}

/// Check a datacall name while it is being typed.
///
/// Inputs shorter or longer than nine characters are not judged yet. A
/// nine-character input must read `FY<year> Q<n>` once uppercased.
///
/// # Errors
///
/// Returns `Invalid datacall format` for a complete but malformed name.
pub fn validate_datacall_name(input: &str) -> Result<(), String> {
    let upper = input.to_uppercase();
    if upper.chars().count() != 9 {
        return Ok(());
    }
    if DATACALL_RE.as_ref().is_some_and(|re| re.is_match(&upper)) {
        Ok(())
    } else {
        Err("Invalid datacall format".to_owned())
    }
}

/// Parse a `YYYY-MM-DD` deadline.
///
/// # Errors
///
/// Returns `Invalid Deadline` unless the input is a ten-character date.
pub fn validate_deadline(input: &str) -> Result<NaiveDate, String> {
    if input.len() != 10 {
        return Err("Invalid Deadline".to_owned());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| "Invalid Deadline".to_owned())
}
