//! Visibility store surface
//!
//! Writes one record when a run opens and one when it closes, and serves
//! the listing queries over those records. Implementations wrap a concrete
//! store; `VisibilitySamplingClient` wraps another `VisibilityManager`.

use async_trait::async_trait;
use weft_types::{
    GetClosedWorkflowExecutionRequest, GetClosedWorkflowExecutionResponse,
    ListClosedWorkflowExecutionsByStatusRequest, ListWorkflowExecutionsByTypeRequest,
    ListWorkflowExecutionsByWorkflowIdRequest, ListWorkflowExecutionsRequest,
    ListWorkflowExecutionsResponse, RecordWorkflowExecutionClosedRequest,
    RecordWorkflowExecutionStartedRequest,
};

use crate::error::VisibilityResult;

#[async_trait]
pub trait VisibilityManager: Send + Sync {
    async fn record_workflow_execution_started(
        &self,
        request: RecordWorkflowExecutionStartedRequest,
    ) -> VisibilityResult<()>;

    async fn record_workflow_execution_closed(
        &self,
        request: RecordWorkflowExecutionClosedRequest,
    ) -> VisibilityResult<()>;

    async fn list_open_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_closed_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_open_workflow_executions_by_type(
        &self,
        request: ListWorkflowExecutionsByTypeRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_closed_workflow_executions_by_type(
        &self,
        request: ListWorkflowExecutionsByTypeRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_open_workflow_executions_by_workflow_id(
        &self,
        request: ListWorkflowExecutionsByWorkflowIdRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_closed_workflow_executions_by_workflow_id(
        &self,
        request: ListWorkflowExecutionsByWorkflowIdRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn list_closed_workflow_executions_by_status(
        &self,
        request: ListClosedWorkflowExecutionsByStatusRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse>;

    async fn get_closed_workflow_execution(
        &self,
        request: GetClosedWorkflowExecutionRequest,
    ) -> VisibilityResult<GetClosedWorkflowExecutionResponse>;

    /// Release the underlying store
    fn close(&self);
}
