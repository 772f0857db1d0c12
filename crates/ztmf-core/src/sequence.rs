//! Questionnaire ordering: pillars by their `order`, functions by a fixed
//! per-pillar sequence, then flattened into one linear walk.
//!
//! Functions whose names are missing from [`PILLAR_FUNCTION_MAP`] rank as
//! `-1` and therefore sort *before* every known function of their pillar.
//! The sort is stable, so unknown functions keep their input order.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::model::FismaQuestion;

/// Fixed function order for each pillar.
pub const PILLAR_FUNCTION_MAP: &[(&str, &[&str])] = &[
    (
        "Identity",
        &[
            "Authentication",
            "IdentityStores",
            "RiskAssessments",
            "AccessManagement",
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
    (
        "Devices",
        &[
            "PolicyEnforcement",
            "AssetRiskManagement",
            "ResourceAccess",
            "DeviceThreatProtection",
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
    (
        "Networks",
        &[
            "NetworkSegmentation",
            "NetworkTrafficManagement",
            "TrafficEncryption",
            "NetworkResilience",
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
    (
        "Applications",
        &[
            "AccessAuthorization",
            "ThreatProtections",
            "AccessibleApplications",
            "SecureDevelopmentDeployment",
            "ApplicationSecurityTesting",
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
    (
        "Data",
        &[
            "DataInventoryManagement",
            "DataCategorization",
            "DataAvailability",
            "DataAccess",
            "DataEncryption",
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
    (
        "CrossCutting",
        &[
            "VisibilityAnalytics",
            "AutomationOrchestration",
            "Governance",
        ],
    ),
];

/// Function order for a pillar, if the pillar is known.
pub fn function_order(pillar: &str) -> Option<&'static [&'static str]> {
    PILLAR_FUNCTION_MAP
        .iter()
        .find(|(name, _)| *name == pillar)
        .map(|(_, functions)| *functions)
}

fn function_rank(order: &[&str], function: &str) -> i64 {
    order
        .iter()
        .position(|f| *f == function)
        .and_then(|i| i64::try_from(i).ok())
        .unwrap_or(-1)
}

/// Questions of one pillar, in render order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PillarGroup {
    pub name: String,
    pub order: i64,
    pub questions: Vec<FismaQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    position: usize,
    group: usize,
    item: usize,
}

/// The ordered questionnaire with O(1) position lookup by function id.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    groups: Vec<PillarGroup>,
    order: Vec<i64>,
    slots: HashMap<i64, Slot>,
}

impl Sequence {
    /// Group, sort, and flatten a list of questions.
    pub fn build(questions: Vec<FismaQuestion>) -> Self {
        let mut groups: Vec<PillarGroup> = Vec::new();
        for question in questions {
            let name = question.pillar.pillar.clone();
            match groups.iter().position(|g| g.name == name) {
                Some(i) => groups[i].questions.push(question),
                None => groups.push(PillarGroup {
                    name,
                    order: question.pillar.order,
                    questions: vec![question],
                }),
            }
        }

        groups.sort_by_key(|g| g.order);
        for group in &mut groups {
            let order = function_order(&group.name).unwrap_or(&[]);
            group
                .questions
                .sort_by_key(|q| function_rank(order, &q.function.function));
        }

        let mut order = Vec::new();
        let mut slots = HashMap::new();
        for (g, group) in groups.iter().enumerate() {
            for (i, question) in group.questions.iter().enumerate() {
                slots.insert(
                    question.function_id(),
                    Slot {
                        position: order.len(),
                        group: g,
                        item: i,
                    },
                );
                order.push(question.function_id());
            }
        }

        tracing::debug!(
            pillars = groups.len(),
            functions = order.len(),
            "built questionnaire sequence"
        );

        Self {
            groups,
            order,
            slots,
        }
    }

    pub fn groups(&self) -> &[PillarGroup] {
        &self.groups
    }

    /// Function ids in walk order.
    pub fn order(&self) -> &[i64] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, function_id: i64) -> Option<usize> {
        self.slots.get(&function_id).map(|s| s.position)
    }

    /// Like [`Sequence::position`], for ids that come from user input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownFunction`] if the id is not in the walk.
    pub fn locate(&self, function_id: i64) -> Result<usize, CoreError> {
        self.position(function_id)
            .ok_or(CoreError::UnknownFunction { function_id })
    }

    /// Function id at a 0-based position.
    pub fn at(&self, position: usize) -> Option<i64> {
        self.order.get(position).copied()
    }

    pub fn first(&self) -> Option<i64> {
        self.order.first().copied()
    }

    pub fn last(&self) -> Option<i64> {
        self.order.last().copied()
    }

    /// The following function, or `None` at the end of the walk.
    pub fn next(&self, function_id: i64) -> Option<i64> {
        let pos = self.position(function_id)?;
        self.at(pos + 1)
    }

    /// The preceding function, or `None` at the start of the walk.
    pub fn previous(&self, function_id: i64) -> Option<i64> {
        let pos = self.position(function_id)?;
        pos.checked_sub(1).and_then(|p| self.at(p))
    }

    pub fn is_first(&self, function_id: i64) -> bool {
        self.first() == Some(function_id)
    }

    pub fn is_last(&self, function_id: i64) -> bool {
        self.last() == Some(function_id)
    }

    pub fn question(&self, function_id: i64) -> Option<&FismaQuestion> {
        let slot = self.slots.get(&function_id)?;
        self.groups.get(slot.group)?.questions.get(slot.item)
    }

    pub fn group_of(&self, function_id: i64) -> Option<&PillarGroup> {
        let slot = self.slots.get(&function_id)?;
        self.groups.get(slot.group)
    }
}
