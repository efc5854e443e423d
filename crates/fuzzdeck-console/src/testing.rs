//! In-memory [`FleetApi`] for tests.

use async_trait::async_trait;
use fuzzdeck_core::agent::{Agent, AgentCreateRequest, AgentStatus};
use fuzzdeck_core::crash::{Crash, CrashStats};
use fuzzdeck_core::ids::{AgentGuid, CrashGuid, JobGuid};
use fuzzdeck_core::job::{JobCollection, JobInfo, JobStats, JobSubmission};
use fuzzdeck_core::metrics::{MetricScope, QueryResponse, StatsQuery};
use fuzzdeck_core::ports::FleetApi;
use fuzzdeck_core::{ApiPath, Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct FakeState {
    agents: Vec<Agent>,
    jobs: Vec<JobCollection>,
    job_stats: JobStats,
    job_infos: HashMap<JobGuid, JobInfo>,
    crashes: Vec<Crash>,
    contents: HashMap<CrashGuid, Vec<u8>>,
    metrics: HashMap<(String, String), QueryResponse>,
    failures: HashMap<String, Failure>,
    calls: Vec<String>,
    submissions: Vec<JobSubmission>,
    created_agents: Vec<AgentCreateRequest>,
}

#[derive(Clone)]
enum Failure {
    Status(u16, String, String),
    Transport(String),
}

/// Fleet backed by vectors. Every call is recorded as `"METHOD /path"` and
/// any call can be made to fail with [`FakeFleet::fail`].
#[derive(Default)]
pub struct FakeFleet {
    state: Mutex<FakeState>,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_agents(self, agents: Vec<Agent>) -> Self {
        self.state().agents = agents;
        self
    }

    pub fn with_jobs(self, jobs: Vec<JobCollection>) -> Self {
        self.state().jobs = jobs;
        self
    }

    pub fn with_job_stats(self, stats: JobStats) -> Self {
        self.state().job_stats = stats;
        self
    }

    pub fn with_job_info(self, info: JobInfo) -> Self {
        self.state()
            .job_infos
            .insert(info.job_collection.guid.clone(), info);
        self
    }

    pub fn with_crashes(self, crashes: Vec<Crash>) -> Self {
        self.state().crashes = crashes;
        self
    }

    pub fn with_content(self, guid: CrashGuid, content: Vec<u8>) -> Self {
        self.state().contents.insert(guid, content);
        self
    }

    pub fn with_metrics(self, scope: &MetricScope, query: &str, response: QueryResponse) -> Self {
        self.state()
            .metrics
            .insert((scope.path().to_string(), query.to_string()), response);
        self
    }

    /// Make `call` (e.g. `"DELETE /api/agent/a1"`) answer with a 500.
    pub fn fail(self, call: &str) -> Self {
        self.fail_with(call, 500, "Internal Server Error", "boom")
    }

    pub fn fail_with(self, call: &str, status: u16, reason: &str, body: &str) -> Self {
        self.state().failures.insert(
            call.to_string(),
            Failure::Status(status, reason.to_string(), body.to_string()),
        );
        self
    }

    pub fn fail_transport(self, call: &str) -> Self {
        self.state().failures.insert(
            call.to_string(),
            Failure::Transport("connection refused".to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.state().calls.iter().any(|c| c == call)
    }

    pub fn submissions(&self) -> Vec<JobSubmission> {
        self.state().submissions.clone()
    }

    pub fn created_agents(&self) -> Vec<AgentCreateRequest> {
        self.state().created_agents.clone()
    }

    fn record(&self, call: String) -> Result<()> {
        let mut state = self.state();
        let failure = state.failures.get(&call).cloned();
        state.calls.push(call);
        match failure {
            None => Ok(()),
            Some(Failure::Status(status, reason, body)) => Err(Error::Status {
                status,
                reason,
                body,
            }),
            Some(Failure::Transport(msg)) => Err(Error::Transport(msg)),
        }
    }
}

fn not_found(path: &str) -> Error {
    Error::Status {
        status: 404,
        reason: "Not Found".to_string(),
        body: format!("{} not found", path),
    }
}

fn rows<T: serde::Serialize>(items: &[T]) -> Result<Vec<serde_json::Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Error::from))
        .collect()
}

#[async_trait]
impl FleetApi for FakeFleet {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.record("GET /api/agents".to_string())?;
        Ok(self.state().agents.clone())
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<()> {
        self.record("POST /api/agent".to_string())?;
        let mut state = self.state();
        state.agents.push(Agent {
            guid: AgentGuid::generate(),
            description: request.description.clone(),
            agent_type: request.agent_type,
            endpoint: request.endpoint.clone(),
            status: AgentStatus::Down,
            cpus: None,
            ram: None,
            free_cpus: None,
            free_ram: None,
        });
        state.created_agents.push(request.clone());
        Ok(())
    }

    async fn delete_agent(&self, guid: &AgentGuid) -> Result<()> {
        self.record(format!("DELETE /api/agent/{}", guid))?;
        self.state().agents.retain(|a| &a.guid != guid);
        Ok(())
    }

    async fn job_stats(&self) -> Result<JobStats> {
        self.record("GET /api/job".to_string())?;
        Ok(self.state().job_stats)
    }

    async fn get_job(&self, guid: &JobGuid) -> Result<JobInfo> {
        let path = format!("/api/job/{}", guid);
        self.record(format!("GET {}", path))?;
        self.state()
            .job_infos
            .get(guid)
            .cloned()
            .ok_or_else(|| not_found(&path))
    }

    async fn create_job(&self, submission: JobSubmission) -> Result<()> {
        self.record("POST /api/job".to_string())?;
        self.state().submissions.push(submission);
        Ok(())
    }

    async fn stop_job(&self, guid: &JobGuid) -> Result<()> {
        self.record(format!("GET /api/job/{}/stop", guid))
    }

    async fn crash_stats(&self) -> Result<CrashStats> {
        self.record("GET /api/crash".to_string())?;
        Ok(CrashStats {
            total: self.state().crashes.len() as u64,
        })
    }

    async fn get_crash(&self, guid: &CrashGuid) -> Result<Crash> {
        let path = format!("/api/crash/{}", guid);
        self.record(format!("GET {}", path))?;
        self.state()
            .crashes
            .iter()
            .find(|c| &c.guid == guid)
            .cloned()
            .ok_or_else(|| not_found(&path))
    }

    async fn crash_content(&self, guid: &CrashGuid) -> Result<Vec<u8>> {
        let path = format!("/api/crash/{}/get", guid);
        self.record(format!("GET {}", path))?;
        self.state()
            .contents
            .get(guid)
            .cloned()
            .ok_or_else(|| not_found(&path))
    }

    async fn query_metrics(
        &self,
        scope: &MetricScope,
        query: &StatsQuery,
    ) -> Result<QueryResponse> {
        let path = scope.path().to_string();
        self.record(format!("POST {}", path))?;
        self.state()
            .metrics
            .get(&(path.clone(), query.query.clone()))
            .cloned()
            .ok_or_else(|| Error::Status {
                status: 400,
                reason: "Bad Request".to_string(),
                body: "Provided query is not allowed".to_string(),
            })
    }

    async fn fetch_rows(&self, source: &ApiPath) -> Result<Vec<serde_json::Value>> {
        self.record(format!("GET {}", source))?;
        let state = self.state();
        let segments: Vec<&str> = source.segments().iter().map(String::as_str).collect();
        match segments.as_slice() {
            ["api", "agents"] => rows(&state.agents),
            ["api", "jobs"] => rows(&state.jobs),
            ["api", "crashes"] => rows(&state.crashes),
            ["api", "job", guid, "crashes"] => {
                let crashes: Vec<&Crash> = state
                    .crashes
                    .iter()
                    .filter(|c| c.collection_guid.as_str() == *guid)
                    .collect();
                rows(&crashes)
            }
            _ => Err(not_found(&source.to_string())),
        }
    }
}

/// Fixture builders.
pub mod fixtures {
    use fuzzdeck_core::agent::{Agent, AgentStatus, AgentType};
    use fuzzdeck_core::crash::Crash;
    use fuzzdeck_core::ids::{AgentGuid, CrashGuid, JobGuid};
    use fuzzdeck_core::job::{Job, JobCollection, JobInfo, JobStatus};
    use fuzzdeck_core::metrics::{MetricSeries, QueryData, QueryResponse, Sample};

    pub fn agent(guid: &str, status: AgentStatus) -> Agent {
        Agent {
            guid: AgentGuid::new(guid),
            description: format!("{} worker", guid),
            agent_type: AgentType::Linux,
            endpoint: "10.0.0.2:31337".to_string(),
            status,
            cpus: Some(4),
            ram: Some(8000),
            free_cpus: Some(2),
            free_ram: Some(4000),
        }
    }

    pub fn job_collection(guid: &str, status: JobStatus, created: &str) -> JobCollection {
        JobCollection {
            guid: JobGuid::new(guid),
            name: format!("{} campaign", guid),
            description: "libpng decoder".to_string(),
            agent_type: AgentType::Linux,
            creation_date: created.to_string(),
            cpus: 8,
            ram: 4096,
            timeout: "12h".to_string(),
            target: "target.zip".to_string(),
            corpus: "corpus.zip".to_string(),
            status,
        }
    }

    pub fn job(agent_guid: &str, collection: &str, idx: u64) -> Job {
        Job {
            agent_guid: AgentGuid::new(agent_guid),
            collection_guid: JobGuid::new(collection),
            idx,
            master: Some(idx == 0),
            cpus: 4,
            ram: 2048,
            last_msg: "fuzzing".to_string(),
            status: JobStatus::Alive,
            log: None,
        }
    }

    pub fn job_info(guid: &str, status: JobStatus) -> JobInfo {
        JobInfo {
            job_collection: job_collection(guid, status, "2023-04-01 10:00:00"),
            jobs: vec![job("a1", guid, 0), job("a2", guid, 1)],
        }
    }

    pub fn crash(guid: &str, job: &str, analyzed: Option<&str>) -> Crash {
        Crash {
            guid: CrashGuid::new(guid),
            collection_guid: JobGuid::new(job),
            name: format!("id:{},sig:11", guid),
            creation_date: "2023-04-01T10:00:00Z".to_string(),
            size: 1536,
            hash: String::new(),
            analyzed: analyzed.map(str::to_string),
        }
    }

    pub fn series(guid: &str, values: &[(f64, &str)]) -> MetricSeries {
        MetricSeries {
            metric: [("guid".to_string(), guid.to_string())].into(),
            values: values
                .iter()
                .map(|(ts, v)| Sample::from((*ts, v.to_string())))
                .collect(),
            value: None,
        }
    }

    pub fn query_response(result: Vec<MetricSeries>) -> QueryResponse {
        QueryResponse {
            status: Some("success".to_string()),
            data: QueryData { result },
        }
    }
}
