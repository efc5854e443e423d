//! Port traits (hexagonal architecture).
//!
//! The console layer talks to the orchestrator only through [`FleetApi`], so
//! views can be driven by the HTTP client in production and by in-memory
//! fakes in tests.

use crate::Result;
use crate::agent::{Agent, AgentCreateRequest};
use crate::crash::{Crash, CrashStats};
use crate::ids::{AgentGuid, CrashGuid, JobGuid};
use crate::job::{JobInfo, JobStats, JobSubmission};
use crate::metrics::{MetricScope, QueryResponse, StatsQuery};
use crate::route::ApiPath;
use async_trait::async_trait;

/// Backend HTTP contract consumed by the panel.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// `GET /api/agents`.
    async fn list_agents(&self) -> Result<Vec<Agent>>;

    /// `POST /api/agent`.
    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<()>;

    /// `DELETE /api/agent/{guid}`.
    async fn delete_agent(&self, guid: &AgentGuid) -> Result<()>;

    /// `GET /api/job`.
    async fn job_stats(&self) -> Result<JobStats>;

    /// `GET /api/job/{guid}`.
    async fn get_job(&self, guid: &JobGuid) -> Result<JobInfo>;

    /// `POST /api/job` as multipart.
    async fn create_job(&self, submission: JobSubmission) -> Result<()>;

    /// `GET /api/job/{guid}/stop`.
    async fn stop_job(&self, guid: &JobGuid) -> Result<()>;

    /// `GET /api/crash`.
    async fn crash_stats(&self) -> Result<CrashStats>;

    /// `GET /api/crash/{guid}`.
    async fn get_crash(&self, guid: &CrashGuid) -> Result<Crash>;

    /// `GET /api/crash/{guid}/get`.
    async fn crash_content(&self, guid: &CrashGuid) -> Result<Vec<u8>>;

    /// `POST /api/stats` or `POST /api/stats/{guid}`.
    async fn query_metrics(&self, scope: &MetricScope, query: &StatsQuery)
    -> Result<QueryResponse>;

    /// Raw JSON rows of a collection endpoint (`/api/jobs`, `/api/crashes`,
    /// `/api/job/{guid}/crashes`), for table bindings.
    async fn fetch_rows(&self, source: &ApiPath) -> Result<Vec<serde_json::Value>>;
}
