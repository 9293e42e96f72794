//! Scripted in-memory history hosts for routing tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use weft_router_core::{ConnectionFactory, HistoryConnection, HistoryService, RouterError};
use weft_types::*;

/// Initialize tracing for tests
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Shared script for every mock host: who redirects where, who fails, who is slow
#[derive(Default)]
pub struct MockCluster {
    redirects: Mutex<HashMap<String, Option<String>>>,
    failures: Mutex<HashMap<String, fn() -> RouterError>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, &'static str)>>,
}

impl MockCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `from` answers with an ownership-lost signal naming `to`
    pub fn redirect(&self, from: &str, to: &str) {
        self.redirects
            .lock()
            .insert(from.to_string(), Some(to.to_string()));
    }

    /// `from` answers with an ownership-lost signal naming nobody
    pub fn redirect_unknown(&self, from: &str) {
        self.redirects.lock().insert(from.to_string(), None);
    }

    pub fn fail(&self, address: &str, error: fn() -> RouterError) {
        self.failures.lock().insert(address.to_string(), error);
    }

    pub fn delay(&self, address: &str, delay: Duration) {
        self.delays.lock().insert(address.to_string(), delay);
    }

    /// Addresses called, in order
    pub fn called_addresses(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(a, _)| a.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(String, &'static str)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn respond<T: Default>(&self, address: &str, op: &'static str) -> Result<T, RouterError> {
        self.calls.lock().push((address.to_string(), op));

        let delay = self.delays.lock().get(address).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let redirect = self.redirects.lock().get(address).cloned();
        if let Some(owner) = redirect {
            return Err(RouterError::ShardOwnershipLost {
                owner,
                message: format!("{} no longer owns the shard", address),
            });
        }

        let failure = self.failures.lock().get(address).copied();
        if let Some(error) = failure {
            return Err(error());
        }

        Ok(T::default())
    }
}

/// Connection to one scripted host
pub struct MockHost {
    address: String,
    cluster: Arc<MockCluster>,
}

/// Builds `MockHost`s and counts how often each address is built
pub struct MockFactory {
    cluster: Arc<MockCluster>,
    created: Mutex<HashMap<String, usize>>,
    refused: Mutex<HashSet<String>>,
}

impl MockFactory {
    pub fn new(cluster: Arc<MockCluster>) -> Arc<Self> {
        Arc::new(Self {
            cluster,
            created: Mutex::new(HashMap::new()),
            refused: Mutex::new(HashSet::new()),
        })
    }

    pub fn refuse(&self, address: &str) {
        self.refused.lock().insert(address.to_string());
    }

    pub fn accept(&self, address: &str) {
        self.refused.lock().remove(address);
    }

    pub fn created(&self, address: &str) -> usize {
        self.created.lock().get(address).copied().unwrap_or(0)
    }

    pub fn total_created(&self) -> usize {
        self.created.lock().values().sum()
    }
}

impl ConnectionFactory for MockFactory {
    fn create_connection(&self, address: &str) -> Result<HistoryConnection, RouterError> {
        if self.refused.lock().contains(address) {
            return Err(RouterError::Transport {
                address: address.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        *self.created.lock().entry(address.to_string()).or_insert(0) += 1;
        Ok(Arc::new(MockHost {
            address: address.to_string(),
            cluster: Arc::clone(&self.cluster),
        }))
    }
}

#[async_trait]
impl HistoryService for MockHost {
    async fn start_workflow_execution(
        &self,
        _request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError> {
        self.cluster.respond::<()>(&self.address, "start_workflow_execution").await?;
        Ok(StartWorkflowExecutionResponse {
            run_id: format!("run-from-{}", self.address),
        })
    }

    async fn get_mutable_state(
        &self,
        _request: GetMutableStateRequest,
    ) -> Result<GetMutableStateResponse, RouterError> {
        self.cluster.respond(&self.address, "get_mutable_state").await
    }

    async fn describe_history_host(
        &self,
        _request: DescribeHistoryHostRequest,
    ) -> Result<DescribeHistoryHostResponse, RouterError> {
        self.cluster.respond::<()>(&self.address, "describe_history_host").await?;
        Ok(DescribeHistoryHostResponse {
            address: self.address.clone(),
            ..Default::default()
        })
    }

    async fn describe_mutable_state(
        &self,
        _request: DescribeMutableStateRequest,
    ) -> Result<DescribeMutableStateResponse, RouterError> {
        self.cluster.respond(&self.address, "describe_mutable_state").await
    }

    async fn reset_sticky_task_list(
        &self,
        _request: ResetStickyTaskListRequest,
    ) -> Result<ResetStickyTaskListResponse, RouterError> {
        self.cluster.respond(&self.address, "reset_sticky_task_list").await
    }

    async fn describe_workflow_execution(
        &self,
        _request: DescribeWorkflowExecutionRequest,
    ) -> Result<DescribeWorkflowExecutionResponse, RouterError> {
        self.cluster.respond(&self.address, "describe_workflow_execution").await
    }

    async fn record_decision_task_started(
        &self,
        _request: RecordDecisionTaskStartedRequest,
    ) -> Result<RecordDecisionTaskStartedResponse, RouterError> {
        self.cluster.respond(&self.address, "record_decision_task_started").await
    }

    async fn record_activity_task_started(
        &self,
        _request: RecordActivityTaskStartedRequest,
    ) -> Result<RecordActivityTaskStartedResponse, RouterError> {
        self.cluster.respond(&self.address, "record_activity_task_started").await
    }

    async fn respond_decision_task_completed(
        &self,
        _request: RespondDecisionTaskCompletedRequest,
    ) -> Result<RespondDecisionTaskCompletedResponse, RouterError> {
        self.cluster.respond(&self.address, "respond_decision_task_completed").await
    }

    async fn respond_decision_task_failed(
        &self,
        _request: RespondDecisionTaskFailedRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "respond_decision_task_failed").await
    }

    async fn respond_activity_task_completed(
        &self,
        _request: RespondActivityTaskCompletedRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "respond_activity_task_completed").await
    }

    async fn respond_activity_task_failed(
        &self,
        _request: RespondActivityTaskFailedRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "respond_activity_task_failed").await
    }

    async fn respond_activity_task_canceled(
        &self,
        _request: RespondActivityTaskCanceledRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "respond_activity_task_canceled").await
    }

    async fn record_activity_task_heartbeat(
        &self,
        _request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, RouterError> {
        self.cluster.respond(&self.address, "record_activity_task_heartbeat").await
    }

    async fn request_cancel_workflow_execution(
        &self,
        _request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "request_cancel_workflow_execution").await
    }

    async fn signal_workflow_execution(
        &self,
        _request: SignalWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "signal_workflow_execution").await
    }

    async fn signal_with_start_workflow_execution(
        &self,
        _request: SignalWithStartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RouterError> {
        self.cluster.respond(&self.address, "signal_with_start_workflow_execution").await
    }

    async fn remove_signal_mutable_state(
        &self,
        _request: RemoveSignalMutableStateRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "remove_signal_mutable_state").await
    }

    async fn terminate_workflow_execution(
        &self,
        _request: TerminateWorkflowExecutionRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "terminate_workflow_execution").await
    }

    async fn schedule_decision_task(
        &self,
        _request: ScheduleDecisionTaskRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "schedule_decision_task").await
    }

    async fn record_child_execution_completed(
        &self,
        _request: RecordChildExecutionCompletedRequest,
    ) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "record_child_execution_completed").await
    }

    async fn replicate_events(&self, _request: ReplicateEventsRequest) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "replicate_events").await
    }

    async fn sync_shard_status(&self, _request: SyncShardStatusRequest) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "sync_shard_status").await
    }

    async fn sync_activity(&self, _request: SyncActivityRequest) -> Result<(), RouterError> {
        self.cluster.respond(&self.address, "sync_activity").await
    }
}
