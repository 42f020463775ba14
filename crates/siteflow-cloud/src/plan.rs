//! Plan and apply result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the engine intends to do with one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Create => write!(f, "create"),
            ActionKind::Update => write!(f, "update"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

/// A single planned change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,

    /// Logical id within the template
    pub logical_id: String,

    /// Resource type (e.g. "AWS::S3::Bucket")
    pub resource_type: String,

    /// Whether the update replaces the resource
    pub replacement: bool,
}

/// The engine's diff between the template and live infrastructure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Engine-side identifier of the prepared change set, if any
    pub change_set_id: Option<String>,

    pub actions: Vec<Action>,
}

impl Plan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        let count = |kind: ActionKind| self.actions.iter().filter(|a| a.kind == kind).count();
        PlanSummary {
            create: count(ActionKind::Create),
            update: count(ActionKind::Update),
            delete: count(ActionKind::Delete),
        }
    }
}

/// Counts per action kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete",
            self.create, self.update, self.delete
        )
    }
}

/// Result of executing a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// Engine-side stack identifier
    pub stack_id: String,

    /// Terminal stack status
    pub status: String,

    /// Stack outputs by name
    pub outputs: BTreeMap<String, String>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_summary_counts() {
        let plan = Plan {
            change_set_id: Some("arn:aws:cloudformation:...:changeSet/plan/1".to_string()),
            actions: vec![
                Action {
                    kind: ActionKind::Create,
                    logical_id: "StaticSiteBucket".to_string(),
                    resource_type: "AWS::S3::Bucket".to_string(),
                    replacement: false,
                },
                Action {
                    kind: ActionKind::Create,
                    logical_id: "MediaBucket".to_string(),
                    resource_type: "AWS::S3::Bucket".to_string(),
                    replacement: false,
                },
                Action {
                    kind: ActionKind::Update,
                    logical_id: "Pipeline".to_string(),
                    resource_type: "AWS::CodePipeline::Pipeline".to_string(),
                    replacement: false,
                },
            ],
        };
        let summary = plan.summary();
        assert_eq!(summary.create, 2);
        assert_eq!(summary.update, 1);
        assert_eq!(summary.delete, 0);
        assert_eq!(summary.to_string(), "2 to create, 1 to update, 0 to delete");
        assert!(plan.has_changes());
    }

    #[test]
    fn test_empty_plan_has_no_changes() {
        let plan = Plan::empty();
        assert!(!plan.has_changes());
        assert!(plan.change_set_id.is_none());
    }
}
