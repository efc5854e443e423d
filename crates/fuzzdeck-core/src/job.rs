//! Job collection and job instance types.

use crate::agent::AgentType;
use crate::ids::{AgentGuid, JobGuid};
use serde::{Deserialize, Serialize};

/// Lifecycle of a job collection or a per-agent job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Init,
    Alive,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Init => "init",
            JobStatus::Alive => "alive",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Stop is only accepted while the job has not reached a terminal state.
    pub fn is_stoppable(&self) -> bool {
        matches!(self, JobStatus::Init | JobStatus::Alive)
    }
}

/// A fuzzing campaign definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCollection {
    pub guid: JobGuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub agent_type: AgentType,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub cpus: u64,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub timeout: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub corpus: String,
    pub status: JobStatus,
}

/// A job collection's slice running on one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub agent_guid: AgentGuid,
    pub collection_guid: JobGuid,
    #[serde(default)]
    pub idx: u64,
    #[serde(default)]
    pub master: Option<bool>,
    #[serde(default)]
    pub cpus: u64,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub last_msg: String,
    pub status: JobStatus,
    #[serde(default)]
    pub log: Option<String>,
}

/// Body of `GET /api/job/{guid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_collection: JobCollection,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Body of `GET /api/job`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub alive: u64,
    pub completed: u64,
    pub error: u64,
}

/// One part of the multipart body sent to `POST /api/job`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, content: Vec<u8> },
}

/// Multipart payload for job creation, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSubmission {
    pub fields: Vec<(String, FormValue)>,
}

impl JobSubmission {
    pub fn text(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .push((name.to_string(), FormValue::Text(value.into())));
    }

    pub fn file(&mut self, name: &str, file_name: impl Into<String>, content: Vec<u8>) {
        self.fields.push((
            name.to_string(),
            FormValue::File {
                file_name: file_name.into(),
                content,
            },
        ));
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_live_jobs_are_stoppable() {
        assert!(JobStatus::Init.is_stoppable());
        assert!(JobStatus::Alive.is_stoppable());
        assert!(!JobStatus::Completed.is_stoppable());
        assert!(!JobStatus::Error.is_stoppable());
        assert!(!JobStatus::Unknown.is_stoppable());
    }

    #[test]
    fn test_job_info_parses_backend_shape() {
        let json = r#"{
            "job_collection": {
                "guid": "c0ffee", "name": "libpng", "description": "png decoder",
                "agent_type": "linux", "creation_date": "2023-04-01 10:00:00",
                "cpus": 8, "ram": 4096, "timeout": "12h", "target": "target.zip",
                "corpus": "corpus.zip", "status": "alive"
            },
            "jobs": [{
                "agent_guid": "a1", "collection_guid": "c0ffee", "idx": 0,
                "cpus": 4, "ram": 2048, "last_msg": "fuzzing", "status": "alive"
            }]
        }"#;
        let info: JobInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.job_collection.status, JobStatus::Alive);
        assert_eq!(info.jobs.len(), 1);
        assert_eq!(info.jobs[0].master, None);
        assert_eq!(info.jobs[0].log, None);
    }
}
