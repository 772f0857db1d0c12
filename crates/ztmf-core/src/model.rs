//! Wire and domain types shared by the client and the view models.
//!
//! Field names follow the backend's JSON (all lowercase, no separators), so
//! most structs serialize without renames. Numeric scores the backend may
//! send as `null` are read as `0.0`, which every view treats as "no score".

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Score of one pillar within a datacall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub pillarid: i64,
    pub pillar: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub score: f64,
}

/// A system's scores for one datacall. One snapshot per evaluation period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemScore {
    pub datacallid: i64,
    pub fismasystemid: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub systemscore: f64,
    #[serde(default)]
    pub pillarscores: Vec<PillarScore>,
}

/// Latest overall score per system, as returned by `/scores/aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub fismasystemid: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub systemscore: f64,
}

/// Pillar reference carried on every question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub pillarid: i64,
    pub pillar: String,
    pub order: i64,
}

/// Function (question group) reference carried on every question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub functionid: i64,
    pub function: String,
    #[serde(default)]
    pub description: String,
}

/// One questionnaire question; there is exactly one per function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FismaQuestion {
    #[serde(default)]
    pub questionid: i64,
    pub question: String,
    #[serde(default)]
    pub notesprompt: String,
    pub pillar: Pillar,
    pub function: Function,
}

impl FismaQuestion {
    pub fn function_id(&self) -> i64 {
        self.function.functionid
    }
}

/// One selectable answer for a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub functionoptionid: i64,
    #[serde(default)]
    pub functionid: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub optionname: String,
    pub description: String,
}

/// A saved answer: the option chosen for a function plus free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub scoreid: i64,
    pub fismasystemid: i64,
    pub datacallid: i64,
    pub functionoptionid: i64,
    #[serde(default)]
    pub notes: String,
}

/// Body for creating or updating an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub fismasystemid: i64,
    pub datacallid: i64,
    pub functionoptionid: i64,
    pub notes: String,
}

/// A named evaluation period, e.g. `FY2025 Q1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacall {
    pub datacallid: i64,
    pub datacall: String,
    #[serde(default)]
    pub datecreated: String,
    #[serde(default)]
    pub deadline: String,
}

/// Body for creating a datacall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDatacall {
    pub datacall: String,
    pub deadline: String,
}

/// A FISMA-registered system. The backend owns it; this is a cached copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FismaSystem {
    #[serde(default)]
    pub fismasystemid: i64,
    #[serde(default)]
    pub fismauid: String,
    #[serde(default)]
    pub fismaacronym: String,
    #[serde(default)]
    pub fismaname: String,
    #[serde(default)]
    pub fismasubsystem: Option<String>,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub groupacronym: Option<String>,
    #[serde(default)]
    pub groupname: Option<String>,
    #[serde(default)]
    pub divisionname: Option<String>,
    #[serde(default)]
    pub datacenterenvironment: String,
    #[serde(default)]
    pub datacallcontact: String,
    #[serde(default)]
    pub issoemail: String,
    #[serde(default)]
    pub decommissioned: bool,
    #[serde(default)]
    pub decommissioned_date: Option<String>,
    #[serde(default)]
    pub decommissioned_by: Option<String>,
    #[serde(default)]
    pub decommissioned_notes: Option<String>,
}

impl FismaSystem {
    /// Read an editable field by its wire key.
    ///
    /// Optional fields that are unset read as `""`.
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "fismauid" => &self.fismauid,
            "fismaacronym" => &self.fismaacronym,
            "fismaname" => &self.fismaname,
            "fismasubsystem" => return Some(self.fismasubsystem.as_deref().unwrap_or("")),
            "component" => &self.component,
            "groupacronym" => return Some(self.groupacronym.as_deref().unwrap_or("")),
            "groupname" => return Some(self.groupname.as_deref().unwrap_or("")),
            "divisionname" => return Some(self.divisionname.as_deref().unwrap_or("")),
            "datacenterenvironment" => &self.datacenterenvironment,
            "datacallcontact" => &self.datacallcontact,
            "issoemail" => &self.issoemail,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Write an editable field by its wire key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownField`] for keys that are not editable.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let optional = || (!value.is_empty()).then(|| value.to_owned());
        match key {
            "fismauid" => value.clone_into(&mut self.fismauid),
            "fismaacronym" => value.clone_into(&mut self.fismaacronym),
            "fismaname" => value.clone_into(&mut self.fismaname),
            "fismasubsystem" => self.fismasubsystem = optional(),
            "component" => value.clone_into(&mut self.component),
            "groupacronym" => self.groupacronym = optional(),
            "groupname" => self.groupname = optional(),
            "divisionname" => self.divisionname = optional(),
            "datacenterenvironment" => value.clone_into(&mut self.datacenterenvironment),
            "datacallcontact" => value.clone_into(&mut self.datacallcontact),
            "issoemail" => value.clone_into(&mut self.issoemail),
            _ => {
                return Err(CoreError::UnknownField {
                    key: key.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// User role. Only [`Role::Admin`] unlocks edit, create, and decommission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    None,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ADMIN" => Self::Admin,
            "" => Self::None,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "ADMIN".to_owned(),
            Role::None => String::new(),
            Role::Other(name) => name,
        }
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub assignedfismasystems: Vec<i64>,
}

impl User {
    /// The placeholder user returned when authentication fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name to show for this user, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.fullname.is_empty() {
            &self.userid
        } else {
            &self.fullname
        }
    }
}
