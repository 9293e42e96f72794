//! Visibility records
//!
//! Visibility is the searchable index of workflow executions: one record
//! when a run opens, one when it closes.

use serde::{Deserialize, Serialize};

use crate::execution::{WorkflowCloseStatus, WorkflowExecution};

/// Open-lifecycle record, written when a run starts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordWorkflowExecutionStartedRequest {
    pub domain_uuid: String,
    /// Domain name, the sampling tenant
    pub domain: String,
    pub execution: WorkflowExecution,
    pub workflow_type_name: String,
    pub start_timestamp: i64,
    pub workflow_timeout: i64,
}

/// Closed-lifecycle record, written when a run reaches a terminal status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWorkflowExecutionClosedRequest {
    pub domain_uuid: String,
    pub domain: String,
    pub execution: WorkflowExecution,
    pub workflow_type_name: String,
    pub start_timestamp: i64,
    pub close_timestamp: i64,
    pub status: WorkflowCloseStatus,
    pub history_length: i64,
    pub retention_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowExecutionsRequest {
    pub domain_uuid: String,
    pub domain: String,
    pub earliest_start_time: i64,
    pub latest_start_time: i64,
    pub page_size: usize,
    pub next_page_token: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowExecutionsByTypeRequest {
    pub base: ListWorkflowExecutionsRequest,
    pub workflow_type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowExecutionsByWorkflowIdRequest {
    pub base: ListWorkflowExecutionsRequest,
    pub workflow_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListClosedWorkflowExecutionsByStatusRequest {
    pub base: ListWorkflowExecutionsRequest,
    pub status: WorkflowCloseStatus,
}

/// One row of a visibility listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionInfo {
    pub execution: WorkflowExecution,
    pub workflow_type_name: String,
    pub start_time: i64,
    pub close_time: Option<i64>,
    pub close_status: Option<WorkflowCloseStatus>,
    pub history_length: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowExecutionsResponse {
    pub executions: Vec<WorkflowExecutionInfo>,
    pub next_page_token: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetClosedWorkflowExecutionRequest {
    pub domain_uuid: String,
    pub execution: WorkflowExecution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetClosedWorkflowExecutionResponse {
    pub execution: WorkflowExecutionInfo,
}
