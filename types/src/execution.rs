//! Workflow execution identity
//!
//! The workflow id is the routing key for almost every history request:
//! every run of the same workflow id lives on the same shard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// History shard index, always in `[0, number_of_shards)`
pub type ShardId = u32;

/// Identifies one run of a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Caller-chosen workflow identifier (the routing key)
    pub workflow_id: String,

    /// Server-assigned run identifier, absent for "current run" lookups
    pub run_id: Option<String>,
}

impl WorkflowExecution {
    /// Create an execution reference for a specific run
    pub fn new(workflow_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: Some(run_id.into()),
        }
    }

    /// Reference the current run of a workflow
    pub fn current(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: None,
        }
    }

    /// Run id, or an empty string for the current run
    pub fn run_id_or_empty(&self) -> &str {
        self.run_id.as_deref().unwrap_or("")
    }
}

/// Workflow type name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
}

/// Terminal status of a closed workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowCloseStatus {
    Completed,
    Failed,
    Canceled,
    Terminated,
    ContinuedAsNew,
    TimedOut,
}

impl fmt::Display for WorkflowCloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowCloseStatus::Completed => "completed",
            WorkflowCloseStatus::Failed => "failed",
            WorkflowCloseStatus::Canceled => "canceled",
            WorkflowCloseStatus::Terminated => "terminated",
            WorkflowCloseStatus::ContinuedAsNew => "continued_as_new",
            WorkflowCloseStatus::TimedOut => "timed_out",
        };
        write!(f, "{}", s)
    }
}

/// Decoded form of the opaque task token handed to workers.
///
/// Workers echo the encoded token back on every respond/heartbeat call,
/// which is how those calls recover their routing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskToken {
    pub domain_id: String,
    pub workflow_id: String,
    pub run_id: String,
    pub schedule_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
}

impl TaskToken {
    pub fn new(
        domain_id: impl Into<String>,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
        schedule_id: i64,
    ) -> Self {
        Self {
            domain_id: domain_id.into(),
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
            schedule_id,
            activity_id: None,
        }
    }

    pub fn with_activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }
}
