//! History service transport surface
//!
//! One implementation per transport; a connection produced by a
//! `ConnectionFactory` talks to exactly one host. Hosts report a moved shard
//! with `RouterError::ShardOwnershipLost`.

use async_trait::async_trait;
use weft_types::*;

use crate::error::RouterError;

/// Calls served by a single history host
#[async_trait]
pub trait HistoryService: Send + Sync {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError>;

    async fn get_mutable_state(
        &self,
        request: GetMutableStateRequest,
    ) -> Result<GetMutableStateResponse, RouterError>;

    async fn describe_history_host(
        &self,
        request: DescribeHistoryHostRequest,
    ) -> Result<DescribeHistoryHostResponse, RouterError>;

    async fn describe_mutable_state(
        &self,
        request: DescribeMutableStateRequest,
    ) -> Result<DescribeMutableStateResponse, RouterError>;

    async fn reset_sticky_task_list(
        &self,
        request: ResetStickyTaskListRequest,
    ) -> Result<ResetStickyTaskListResponse, RouterError>;

    async fn describe_workflow_execution(
        &self,
        request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, RouterError>;

    async fn record_decision_task_started(
        &self,
        request: RecordDecisionTaskStartedRequest,
    ) -> Result<RecordDecisionTaskStartedResponse, RouterError>;

    async fn record_activity_task_started(
        &self,
        request: RecordActivityTaskStartedRequest,
    ) -> Result<RecordActivityTaskStartedResponse, RouterError>;

    async fn respond_decision_task_completed(
        &self,
        request: RespondDecisionTaskCompletedRequest,
    ) -> Result<RespondDecisionTaskCompletedResponse, RouterError>;

    async fn respond_decision_task_failed(
        &self,
        request: RespondDecisionTaskFailedRequest,
    ) -> Result<(), RouterError>;

    async fn respond_activity_task_completed(
        &self,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<(), RouterError>;

    async fn respond_activity_task_failed(
        &self,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<(), RouterError>;

    async fn respond_activity_task_canceled(
        &self,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<(), RouterError>;

    async fn record_activity_task_heartbeat(
        &self,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, RouterError>;

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<(), RouterError>;

    async fn signal_workflow_execution(
        &self,
        request: SignalWorkflowExecutionRequest,
    ) -> Result<(), RouterError>;

    async fn signal_with_start_workflow_execution(
        &self,
        request: SignalWithStartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError>;

    async fn remove_signal_mutable_state(
        &self,
        request: RemoveSignalMutableStateRequest,
    ) -> Result<(), RouterError>;

    async fn terminate_workflow_execution(
        &self,
        request: TerminateWorkflowExecutionRequest,
    ) -> Result<(), RouterError>;

    async fn schedule_decision_task(
        &self,
        request: ScheduleDecisionTaskRequest,
    ) -> Result<(), RouterError>;

    async fn record_child_execution_completed(
        &self,
        request: RecordChildExecutionCompletedRequest,
    ) -> Result<(), RouterError>;

    async fn replicate_events(&self, request: ReplicateEventsRequest) -> Result<(), RouterError>;

    async fn sync_shard_status(&self, request: SyncShardStatusRequest) -> Result<(), RouterError>;

    async fn sync_activity(&self, request: SyncActivityRequest) -> Result<(), RouterError>;
}
