//! Workflow status progression
//!
//! Pure computation behind the step indicator: the ordered workflow states
//! and which of them the incident is currently in.

use apex_model::{json_label, ClassificationKind, Incident, ReferenceCollection};
use serde::Serialize;

/// Stages used when no workflow states were loaded
pub const FALLBACK_STAGES: [&str; 4] = ["New", "In Progress", "Resolved", "Closed"];

/// State assumed when the incident names none
pub const DEFAULT_STATE_ID: i64 = 1;

/// One workflow stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    /// State id; `None` for fallback stages
    pub id: Option<i64>,
    /// Display name
    pub name: String,
}

/// Rendering state of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Before the current stage
    Completed,
    /// The current stage
    Active,
    /// After the current stage
    Pending,
}

/// Ordered stages and the current position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusProgression {
    stages: Vec<Stage>,
    current_index: usize,
    is_fallback: bool,
}

impl StatusProgression {
    /// Compute the progression for `incident`
    ///
    /// With workflow states loaded, stages are sorted by id and matched on
    /// the current state id. Without them the fixed fallback stages are
    /// matched case-insensitively on the state name. Unmatched means index 0.
    #[must_use]
    pub fn compute(states: &ReferenceCollection, incident: &Incident) -> Self {
        if states.is_empty() {
            return Self::fallback(current_state_name(incident).as_deref());
        }

        let current = current_state_id(incident);
        let stages: Vec<Stage> = states
            .sorted_by_id()
            .into_iter()
            .map(|record| Stage {
                id: Some(record.id),
                name: record.display_name().to_owned(),
            })
            .collect();
        let current_index = stages
            .iter()
            .position(|stage| stage.id == Some(current))
            .unwrap_or(0);

        Self {
            stages,
            current_index,
            is_fallback: false,
        }
    }

    fn fallback(current_name: Option<&str>) -> Self {
        let current_index = current_name
            .map(|name| name.trim().to_lowercase())
            .and_then(|name| {
                FALLBACK_STAGES
                    .iter()
                    .position(|stage| stage.to_lowercase() == name)
            })
            .unwrap_or(0);

        Self {
            stages: FALLBACK_STAGES
                .iter()
                .map(|name| Stage {
                    id: None,
                    name: (*name).to_owned(),
                })
                .collect(),
            current_index,
            is_fallback: true,
        }
    }

    /// Stages in display order
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Index of the current stage
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether the fixed fallback stages are shown
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// Current stage
    #[must_use]
    pub fn current(&self) -> Option<&Stage> {
        self.stages.get(self.current_index)
    }

    /// Rendering state of step `index`
    #[must_use]
    pub fn step_status(&self, index: usize) -> StepStatus {
        match index.cmp(&self.current_index) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }

    /// Stages paired with their rendering state
    pub fn steps(&self) -> impl Iterator<Item = (&Stage, StepStatus)> {
        self.stages
            .iter()
            .enumerate()
            .map(|(index, stage)| (stage, self.step_status(index)))
    }
}

/// Current workflow state id: incident state, then legacy status, then 1
#[must_use]
pub fn current_state_id(incident: &Incident) -> i64 {
    incident
        .classification_id(ClassificationKind::IncidentState)
        .or(incident.status_id)
        .unwrap_or(DEFAULT_STATE_ID)
}

fn current_state_name(incident: &Incident) -> Option<String> {
    incident
        .classification(ClassificationKind::IncidentState)
        .map(|field| field.name.clone())
        .filter(|name| !name.trim().is_empty())
        .or_else(|| incident.extra.get("status").and_then(json_label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_model::{normalize, RawIncident, ReferenceData, ReferenceRecord};
    use serde_json::json;

    fn incident(value: serde_json::Value) -> Incident {
        normalize(&RawIncident::from_value(value).unwrap(), &ReferenceData::new())
    }

    fn states() -> ReferenceCollection {
        [
            ReferenceRecord::new(3, "Resolved"),
            ReferenceRecord::new(1, "New"),
            ReferenceRecord::new(2, "In Progress"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn stages_sorted_and_matched_by_id() {
        let progression = StatusProgression::compute(&states(), &incident(json!({"incidentstate_id": 3})));
        let names: Vec<&str> = progression.stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["New", "In Progress", "Resolved"]);
        assert_eq!(progression.current_index(), 2);
        assert!(!progression.is_fallback());
    }

    #[test]
    fn current_id_priority() {
        assert_eq!(current_state_id(&incident(json!({"incidentstate": {"id": 2}, "status_id": 3}))), 2);
        assert_eq!(current_state_id(&incident(json!({"status_id": 3}))), 3);
        assert_eq!(current_state_id(&incident(json!({}))), DEFAULT_STATE_ID);
    }

    #[test]
    fn unknown_id_falls_back_to_first() {
        let progression = StatusProgression::compute(&states(), &incident(json!({"incidentstate_id": 99})));
        assert_eq!(progression.current_index(), 0);
    }

    #[test]
    fn empty_states_use_fallback_by_name() {
        let progression = StatusProgression::compute(
            &ReferenceCollection::new(),
            &incident(json!({"incidentstate": {"name": "In Progress"}})),
        );
        assert!(progression.is_fallback());
        assert_eq!(progression.stages().len(), 4);
        assert_eq!(progression.current_index(), 1);

        let by_status = StatusProgression::compute(&ReferenceCollection::new(), &incident(json!({"status": "resolved"})));
        assert_eq!(by_status.current_index(), 2);

        let unmatched = StatusProgression::compute(&ReferenceCollection::new(), &incident(json!({"status": "Parked"})));
        assert_eq!(unmatched.current_index(), 0);
    }

    #[test]
    fn step_statuses() {
        let progression = StatusProgression::compute(&states(), &incident(json!({"incidentstate_id": 2})));
        let statuses: Vec<StepStatus> = progression.steps().map(|(_, status)| status).collect();
        assert_eq!(statuses, [StepStatus::Completed, StepStatus::Active, StepStatus::Pending]);
        assert_eq!(progression.current().map(|s| s.name.as_str()), Some("In Progress"));
    }
}
