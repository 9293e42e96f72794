//! History Client
//!
//! Routes every history call to the host that owns the workflow's shard.
//!
//! # Routing
//!
//! ```text
//! Request
//!    │
//!    ▼
//! workflow id (direct, or decoded from the task token)
//!    │  workflow_id_to_shard
//!    ▼
//! ShardId ──ServiceResolver──► HostInfo ──ConnectionCache──► connection
//!                                                              │
//!                                                              ▼
//!                                                       redirect loop
//! ```
//!
//! # Redirect loop
//!
//! Each attempt first checks the caller's `CallContext`, then runs the call
//! under the sooner of the caller deadline and the configured RPC timeout.
//! A `ShardOwnershipLost` reply naming a new owner sends the next attempt to
//! that owner without resolving the shard again. Any other outcome ends the
//! loop. There is no retry counter: the caller deadline bounds the loop.

use futures::Future;
use metrics::counter;
use std::sync::Arc;
use tokio::time;
use tracing::{debug, info, trace};

use weft_core::{workflow_id_to_shard, ClientConfig};
use weft_types::*;

use crate::connection::{ConnectionCache, ConnectionFactory};
use crate::context::CallContext;
use crate::error::RouterError;
use crate::membership::ServiceResolver;
use crate::token::{JsonTaskTokenSerializer, TaskTokenSerializer};
use crate::types::{HistoryConnection, HISTORY_SERVICE_NAME};

/// Shard-aware history service client
pub struct HistoryClient {
    config: ClientConfig,
    resolver: Arc<dyn ServiceResolver>,
    token_serializer: Arc<dyn TaskTokenSerializer>,
    connections: ConnectionCache,
}

impl HistoryClient {
    /// Create a client with the JSON task token codec
    pub fn new(
        config: ClientConfig,
        resolver: Arc<dyn ServiceResolver>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self, RouterError> {
        config.validate()?;

        info!(
            client_id = %config.client_id,
            service = HISTORY_SERVICE_NAME,
            number_of_shards = config.number_of_shards,
            rpc_timeout_ms = config.rpc_timeout.as_millis() as u64,
            "Creating history client"
        );

        Ok(Self {
            config,
            resolver,
            token_serializer: Arc::new(JsonTaskTokenSerializer),
            connections: ConnectionCache::new(factory),
        })
    }

    /// Replace the task token codec
    pub fn with_token_serializer(mut self, serializer: Arc<dyn TaskTokenSerializer>) -> Self {
        self.token_serializer = serializer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of hosts with a cached connection
    pub fn cached_connection_count(&self) -> usize {
        self.connections.len()
    }

    // =========================================================================
    // Workflow lifecycle
    // =========================================================================

    pub async fn start_workflow_execution(
        &self,
        ctx: &CallContext,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError> {
        let client = self.client_for_workflow(&request.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.start_workflow_execution(request).await }
        })
        .await
    }

    pub async fn signal_workflow_execution(
        &self,
        ctx: &CallContext,
        request: SignalWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.signal_workflow_execution(request).await }
        })
        .await
    }

    pub async fn signal_with_start_workflow_execution(
        &self,
        ctx: &CallContext,
        request: SignalWithStartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError> {
        let client = self.client_for_workflow(&request.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.signal_with_start_workflow_execution(request).await }
        })
        .await
    }

    pub async fn remove_signal_mutable_state(
        &self,
        ctx: &CallContext,
        request: RemoveSignalMutableStateRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.remove_signal_mutable_state(request).await }
        })
        .await
    }

    pub async fn request_cancel_workflow_execution(
        &self,
        ctx: &CallContext,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.request_cancel_workflow_execution(request).await }
        })
        .await
    }

    pub async fn terminate_workflow_execution(
        &self,
        ctx: &CallContext,
        request: TerminateWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.terminate_workflow_execution(request).await }
        })
        .await
    }

    // =========================================================================
    // Mutable state inspection
    // =========================================================================

    pub async fn get_mutable_state(
        &self,
        ctx: &CallContext,
        request: GetMutableStateRequest,
    ) -> Result<GetMutableStateResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.get_mutable_state(request).await }
        })
        .await
    }

    pub async fn describe_mutable_state(
        &self,
        ctx: &CallContext,
        request: DescribeMutableStateRequest,
    ) -> Result<DescribeMutableStateResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.describe_mutable_state(request).await }
        })
        .await
    }

    pub async fn describe_workflow_execution(
        &self,
        ctx: &CallContext,
        request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.describe_workflow_execution(request).await }
        })
        .await
    }

    pub async fn reset_sticky_task_list(
        &self,
        ctx: &CallContext,
        request: ResetStickyTaskListRequest,
    ) -> Result<ResetStickyTaskListResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.reset_sticky_task_list(request).await }
        })
        .await
    }

    /// Describe a history host, picked by address, shard, or execution
    pub async fn describe_history_host(
        &self,
        ctx: &CallContext,
        request: DescribeHistoryHostRequest,
    ) -> Result<DescribeHistoryHostResponse, RouterError> {
        let client = if let Some(address) = &request.host_address {
            self.connections.get(address)?
        } else if let Some(shard_id) = request.shard_id_for_host {
            self.client_for_shard(shard_id)?
        } else if let Some(execution) = &request.execution_for_host {
            self.client_for_workflow(&execution.workflow_id)?
        } else {
            return Err(RouterError::BadRequest(
                "describe history host needs a host address, shard id or execution".to_string(),
            ));
        };

        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.describe_history_host(request).await }
        })
        .await
    }

    // =========================================================================
    // Decision and activity tasks
    // =========================================================================

    pub async fn schedule_decision_task(
        &self,
        ctx: &CallContext,
        request: ScheduleDecisionTaskRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.schedule_decision_task(request).await }
        })
        .await
    }

    pub async fn record_decision_task_started(
        &self,
        ctx: &CallContext,
        request: RecordDecisionTaskStartedRequest,
    ) -> Result<RecordDecisionTaskStartedResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.record_decision_task_started(request).await }
        })
        .await
    }

    pub async fn record_activity_task_started(
        &self,
        ctx: &CallContext,
        request: RecordActivityTaskStartedRequest,
    ) -> Result<RecordActivityTaskStartedResponse, RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.record_activity_task_started(request).await }
        })
        .await
    }

    pub async fn respond_decision_task_completed(
        &self,
        ctx: &CallContext,
        request: RespondDecisionTaskCompletedRequest,
    ) -> Result<RespondDecisionTaskCompletedResponse, RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.respond_decision_task_completed(request).await }
        })
        .await
    }

    pub async fn respond_decision_task_failed(
        &self,
        ctx: &CallContext,
        request: RespondDecisionTaskFailedRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.respond_decision_task_failed(request).await }
        })
        .await
    }

    pub async fn respond_activity_task_completed(
        &self,
        ctx: &CallContext,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.respond_activity_task_completed(request).await }
        })
        .await
    }

    pub async fn respond_activity_task_failed(
        &self,
        ctx: &CallContext,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.respond_activity_task_failed(request).await }
        })
        .await
    }

    pub async fn respond_activity_task_canceled(
        &self,
        ctx: &CallContext,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.respond_activity_task_canceled(request).await }
        })
        .await
    }

    pub async fn record_activity_task_heartbeat(
        &self,
        ctx: &CallContext,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, RouterError> {
        let client = self.client_for_task_token(&request.task_token)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.record_activity_task_heartbeat(request).await }
        })
        .await
    }

    /// Notify the parent's shard that a child run finished
    pub async fn record_child_execution_completed(
        &self,
        ctx: &CallContext,
        request: RecordChildExecutionCompletedRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.record_child_execution_completed(request).await }
        })
        .await
    }

    // =========================================================================
    // Cross-cluster replication
    // =========================================================================

    pub async fn replicate_events(
        &self,
        ctx: &CallContext,
        request: ReplicateEventsRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.execution.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.replicate_events(request).await }
        })
        .await
    }

    /// Shard heartbeat from a remote cluster; addressed by shard, not workflow
    pub async fn sync_shard_status(
        &self,
        ctx: &CallContext,
        request: SyncShardStatusRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_shard(request.shard_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.sync_shard_status(request).await }
        })
        .await
    }

    pub async fn sync_activity(
        &self,
        ctx: &CallContext,
        request: SyncActivityRequest,
    ) -> Result<(), RouterError> {
        let client = self.client_for_workflow(&request.workflow_id)?;
        self.execute_with_redirect(ctx, client, |client| {
            let request = request.clone();
            async move { client.sync_activity(request).await }
        })
        .await
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Connection to the owner of the workflow's shard
    fn client_for_workflow(&self, workflow_id: &str) -> Result<HistoryConnection, RouterError> {
        if workflow_id.is_empty() {
            return Err(RouterError::EmptyRoutingKey);
        }
        let shard_id = workflow_id_to_shard(workflow_id, self.config.number_of_shards);
        trace!(workflow_id = %workflow_id, shard_id, "Routed workflow to shard");
        self.client_for_shard(shard_id)
    }

    /// Connection to the current owner of a shard
    fn client_for_shard(&self, shard_id: ShardId) -> Result<HistoryConnection, RouterError> {
        let host = self.resolver.lookup(shard_id)?;
        self.connections.get(host.address())
    }

    /// Connection for a call identified only by its task token
    fn client_for_task_token(&self, task_token: &[u8]) -> Result<HistoryConnection, RouterError> {
        let token = self.token_serializer.deserialize(task_token)?;
        self.client_for_workflow(&token.workflow_id)
    }

    /// Run `op` against `client`, following ownership redirects
    async fn execute_with_redirect<T, F, Fut>(
        &self,
        ctx: &CallContext,
        mut client: HistoryConnection,
        op: F,
    ) -> Result<T, RouterError>
    where
        F: Fn(HistoryConnection) -> Fut,
        Fut: Future<Output = Result<T, RouterError>>,
    {
        loop {
            ctx.check()?;

            let timeout = ctx.effective_timeout(self.config.rpc_timeout);
            let result = match time::timeout(timeout, op(Arc::clone(&client))).await {
                Ok(result) => result,
                Err(_) => Err(RouterError::DeadlineExceeded),
            };

            match result {
                Err(RouterError::ShardOwnershipLost {
                    owner: Some(owner),
                    message,
                }) => {
                    counter!("history_client.redirects").increment(1);
                    debug!(owner = %owner, reason = %message, "Shard ownership lost, redirecting");
                    client = self.connections.get(&owner)?;
                }
                other => return other,
            }
        }
    }
}
