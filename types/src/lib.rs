// ========== Core Modules ==========
pub mod execution;
pub mod history;
pub mod visibility;

// Export commonly used types
pub use execution::{
    ShardId, TaskToken, WorkflowCloseStatus, WorkflowExecution, WorkflowType,
};

// History service requests and responses
pub use history::*;

// Visibility records and queries
pub use visibility::{
    GetClosedWorkflowExecutionRequest, GetClosedWorkflowExecutionResponse,
    ListClosedWorkflowExecutionsByStatusRequest, ListWorkflowExecutionsByTypeRequest,
    ListWorkflowExecutionsByWorkflowIdRequest, ListWorkflowExecutionsRequest,
    ListWorkflowExecutionsResponse, RecordWorkflowExecutionClosedRequest,
    RecordWorkflowExecutionStartedRequest, WorkflowExecutionInfo,
};
