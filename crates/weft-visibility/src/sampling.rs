//! Visibility sampling
//!
//! Wraps a `VisibilityManager` and rate limits the two record writes per
//! domain. A write that does not get a token is dropped and still reported
//! to the caller as `Ok(())`: under load the visibility index loses records
//! instead of the history service failing workflow transitions. Drops are
//! visible through logs, the `persistence.sampled` counter and
//! [`SamplingStats`].
//!
//! Open records share one priority level. Closed records use two, with
//! `Completed` runs favored over every other close status.

use async_trait::async_trait;
use metrics::counter;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use weft_core::SamplingConfig;
use weft_types::{
    GetClosedWorkflowExecutionRequest, GetClosedWorkflowExecutionResponse,
    ListClosedWorkflowExecutionsByStatusRequest, ListWorkflowExecutionsByTypeRequest,
    ListWorkflowExecutionsByWorkflowIdRequest, ListWorkflowExecutionsRequest,
    ListWorkflowExecutionsResponse, RecordWorkflowExecutionClosedRequest,
    RecordWorkflowExecutionStartedRequest, WorkflowCloseStatus,
};

use crate::bucket_map::{BucketFactory, DomainToBucketMap, RealBucketFactory};
use crate::error::VisibilityResult;
use crate::manager::VisibilityManager;

const OPEN_PRIORITIES: NonZeroUsize = match NonZeroUsize::new(1) {
    Some(n) => n,
    None => panic!("priority count must be non-zero"),
};

const CLOSED_PRIORITIES: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => panic!("priority count must be non-zero"),
};

const PRIORITY_DEFAULT: usize = 0;
const PRIORITY_COMPLETED: usize = 1;

const SCOPE_STARTED: &str = "record_workflow_execution_started";
const SCOPE_CLOSED: &str = "record_workflow_execution_closed";

/// Admission priority for a closed record
pub fn closed_record_priority(status: WorkflowCloseStatus) -> usize {
    match status {
        WorkflowCloseStatus::Completed => PRIORITY_COMPLETED,
        _ => PRIORITY_DEFAULT,
    }
}

/// Forward and drop counts since the client was created
#[derive(Debug, Default)]
pub struct SamplingStats {
    open_forwarded: AtomicU64,
    open_sampled: AtomicU64,
    closed_forwarded: AtomicU64,
    closed_sampled: AtomicU64,
}

impl SamplingStats {
    pub fn open_forwarded(&self) -> u64 {
        self.open_forwarded.load(Ordering::Relaxed)
    }

    pub fn open_sampled(&self) -> u64 {
        self.open_sampled.load(Ordering::Relaxed)
    }

    pub fn closed_forwarded(&self) -> u64 {
        self.closed_forwarded.load(Ordering::Relaxed)
    }

    pub fn closed_sampled(&self) -> u64 {
        self.closed_sampled.load(Ordering::Relaxed)
    }
}

/// `VisibilityManager` that drops record writes over the domain's quota
pub struct VisibilitySamplingClient {
    persistence: Arc<dyn VisibilityManager>,
    config: SamplingConfig,
    open_limiters: DomainToBucketMap,
    closed_limiters: DomainToBucketMap,
    stats: SamplingStats,
}

impl VisibilitySamplingClient {
    pub fn new(persistence: Arc<dyn VisibilityManager>, config: SamplingConfig) -> Self {
        Self::with_bucket_factory(persistence, config, Arc::new(RealBucketFactory))
    }

    /// Build limiters with `factory` instead of the real clock bucket
    pub fn with_bucket_factory(
        persistence: Arc<dyn VisibilityManager>,
        config: SamplingConfig,
        factory: Arc<dyn BucketFactory>,
    ) -> Self {
        Self {
            persistence,
            config,
            open_limiters: DomainToBucketMap::with_factory("open", Arc::clone(&factory)),
            closed_limiters: DomainToBucketMap::with_factory("closed", factory),
            stats: SamplingStats::default(),
        }
    }

    pub fn stats(&self) -> &SamplingStats {
        &self.stats
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

#[async_trait]
impl VisibilityManager for VisibilitySamplingClient {
    async fn record_workflow_execution_started(
        &self,
        request: RecordWorkflowExecutionStartedRequest,
    ) -> VisibilityResult<()> {
        let qps = self.config.open_qps(&request.domain);
        let limiter = self
            .open_limiters
            .get_rate_limiter(&request.domain, OPEN_PRIORITIES, qps);

        if limiter.try_acquire(PRIORITY_DEFAULT, 1) {
            self.stats.open_forwarded.fetch_add(1, Ordering::Relaxed);
            return self.persistence.record_workflow_execution_started(request).await;
        }

        self.stats.open_sampled.fetch_add(1, Ordering::Relaxed);
        counter!("persistence.sampled", "scope" => SCOPE_STARTED).increment(1);
        info!(
            domain = %request.domain,
            workflow_id = %request.execution.workflow_id,
            run_id = %request.execution.run_id_or_empty(),
            workflow_type = %request.workflow_type_name,
            "Open workflow execution sampled"
        );
        Ok(())
    }

    async fn record_workflow_execution_closed(
        &self,
        request: RecordWorkflowExecutionClosedRequest,
    ) -> VisibilityResult<()> {
        let priority = closed_record_priority(request.status);
        let qps = self.config.closed_qps(&request.domain);
        let limiter = self
            .closed_limiters
            .get_rate_limiter(&request.domain, CLOSED_PRIORITIES, qps);

        if limiter.try_acquire(priority, 1) {
            self.stats.closed_forwarded.fetch_add(1, Ordering::Relaxed);
            return self.persistence.record_workflow_execution_closed(request).await;
        }

        self.stats.closed_sampled.fetch_add(1, Ordering::Relaxed);
        counter!("persistence.sampled", "scope" => SCOPE_CLOSED).increment(1);
        info!(
            domain = %request.domain,
            workflow_id = %request.execution.workflow_id,
            run_id = %request.execution.run_id_or_empty(),
            workflow_type = %request.workflow_type_name,
            status = %request.status,
            priority,
            "Closed workflow execution sampled"
        );
        Ok(())
    }

    async fn list_open_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence.list_open_workflow_executions(request).await
    }

    async fn list_closed_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence.list_closed_workflow_executions(request).await
    }

    async fn list_open_workflow_executions_by_type(
        &self,
        request: ListWorkflowExecutionsByTypeRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence.list_open_workflow_executions_by_type(request).await
    }

    async fn list_closed_workflow_executions_by_type(
        &self,
        request: ListWorkflowExecutionsByTypeRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence.list_closed_workflow_executions_by_type(request).await
    }

    async fn list_open_workflow_executions_by_workflow_id(
        &self,
        request: ListWorkflowExecutionsByWorkflowIdRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence
            .list_open_workflow_executions_by_workflow_id(request)
            .await
    }

    async fn list_closed_workflow_executions_by_workflow_id(
        &self,
        request: ListWorkflowExecutionsByWorkflowIdRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence
            .list_closed_workflow_executions_by_workflow_id(request)
            .await
    }

    async fn list_closed_workflow_executions_by_status(
        &self,
        request: ListClosedWorkflowExecutionsByStatusRequest,
    ) -> VisibilityResult<ListWorkflowExecutionsResponse> {
        self.persistence
            .list_closed_workflow_executions_by_status(request)
            .await
    }

    async fn get_closed_workflow_execution(
        &self,
        request: GetClosedWorkflowExecutionRequest,
    ) -> VisibilityResult<GetClosedWorkflowExecutionResponse> {
        self.persistence.get_closed_workflow_execution(request).await
    }

    fn close(&self) {
        self.persistence.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_runs_are_favored() {
        assert_eq!(closed_record_priority(WorkflowCloseStatus::Completed), 1);
        for status in [
            WorkflowCloseStatus::Failed,
            WorkflowCloseStatus::Canceled,
            WorkflowCloseStatus::Terminated,
            WorkflowCloseStatus::ContinuedAsNew,
            WorkflowCloseStatus::TimedOut,
        ] {
            assert_eq!(closed_record_priority(status), 0);
        }
    }

    #[test]
    fn test_priority_counts() {
        assert_eq!(OPEN_PRIORITIES.get(), 1);
        assert_eq!(CLOSED_PRIORITIES.get(), 2);
        assert!(PRIORITY_COMPLETED < CLOSED_PRIORITIES.get());
    }
}
