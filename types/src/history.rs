//! History service requests and responses
//!
//! Payloads (inputs, results, decisions, serialized events) are carried as
//! opaque bytes; this layer only routes them.

use serde::{Deserialize, Serialize};

use crate::execution::{ShardId, WorkflowCloseStatus, WorkflowExecution, WorkflowType};

// =============================================================================
// Workflow lifecycle
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub workflow_id: String,
    pub workflow_type: WorkflowType,
    pub task_list: String,
    pub input: Vec<u8>,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionResponse {
    pub run_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalWithStartWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub workflow_id: String,
    pub workflow_type: WorkflowType,
    pub task_list: String,
    pub input: Vec<u8>,
    pub signal_name: String,
    pub signal_input: Vec<u8>,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub signal_name: String,
    pub input: Vec<u8>,
    pub identity: String,
    pub request_id: String,
}

/// Drops the dedup record of an already-applied signal request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveSignalMutableStateRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub identity: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminateWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub reason: String,
    pub details: Vec<u8>,
    pub identity: String,
}

// =============================================================================
// Mutable state inspection
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMutableStateRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    /// Long-poll until the next event id moves past this value
    pub expected_next_event_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMutableStateResponse {
    pub execution: WorkflowExecution,
    pub workflow_type: WorkflowType,
    pub next_event_id: i64,
    pub task_list: String,
    pub is_workflow_running: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeMutableStateRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeMutableStateResponse {
    /// JSON dump of the cached copy, if the execution is cached on the host
    pub mutable_state_in_cache: Option<String>,
    pub mutable_state_in_database: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeWorkflowExecutionResponse {
    pub execution: WorkflowExecution,
    pub workflow_type: WorkflowType,
    pub close_status: Option<WorkflowCloseStatus>,
    pub history_length: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetStickyTaskListRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetStickyTaskListResponse {}

/// Describe a history host.
///
/// The host is picked by `host_address` when set, otherwise by
/// `shard_id_for_host`, otherwise by the shard owning `execution_for_host`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeHistoryHostRequest {
    pub host_address: Option<String>,
    pub shard_id_for_host: Option<ShardId>,
    pub execution_for_host: Option<WorkflowExecution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeHistoryHostResponse {
    pub address: String,
    pub number_of_shards: u32,
    pub shard_ids: Vec<ShardId>,
    pub domain_cache_size: u64,
}

// =============================================================================
// Decision and activity tasks
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDecisionTaskRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub is_first_decision: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDecisionTaskStartedRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub schedule_id: i64,
    pub task_id: i64,
    pub request_id: String,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDecisionTaskStartedResponse {
    pub workflow_type: WorkflowType,
    pub previous_started_event_id: Option<i64>,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub attempt: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordActivityTaskStartedRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub schedule_id: i64,
    pub task_id: i64,
    pub request_id: String,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordActivityTaskStartedResponse {
    pub scheduled_event: Vec<u8>,
    pub started_timestamp: i64,
    pub attempt: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondDecisionTaskCompletedRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub decisions: Vec<Vec<u8>>,
    pub identity: String,
    pub return_new_decision_task: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondDecisionTaskCompletedResponse {
    /// Present when a new decision task was started inline
    pub started_response: Option<RecordDecisionTaskStartedResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondDecisionTaskFailedRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub cause: String,
    pub details: Vec<u8>,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskCompletedRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub result: Vec<u8>,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskFailedRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub reason: String,
    pub details: Vec<u8>,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskCanceledRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub details: Vec<u8>,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordActivityTaskHeartbeatRequest {
    pub domain_uuid: String,
    pub task_token: Vec<u8>,
    pub details: Vec<u8>,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordActivityTaskHeartbeatResponse {
    pub cancel_requested: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordChildExecutionCompletedRequest {
    pub domain_uuid: String,
    /// Parent execution, which owns the routing
    pub execution: WorkflowExecution,
    pub initiated_id: i64,
    pub completed_execution: WorkflowExecution,
    pub completion_event: Vec<u8>,
}

// =============================================================================
// Cross-cluster replication
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicateEventsRequest {
    pub source_cluster: String,
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
    pub first_event_id: i64,
    pub next_event_id: i64,
    pub version: i64,
    pub history: Vec<Vec<u8>>,
}

/// Shard-level replication heartbeat; addresses the shard directly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncShardStatusRequest {
    pub source_cluster: String,
    pub shard_id: ShardId,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncActivityRequest {
    pub domain_id: String,
    pub workflow_id: String,
    pub run_id: String,
    pub version: i64,
    pub schedule_id: i64,
    pub started_id: i64,
    pub attempt: i32,
    pub details: Vec<u8>,
}
