//! Agent types.

use crate::ids::AgentGuid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fleet worker node.
///
/// Capacity fields stay `None` until the agent has reported its system info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub guid: AgentGuid,
    #[serde(default)]
    pub description: String,
    pub agent_type: AgentType,
    #[serde(default)]
    pub endpoint: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub cpus: Option<u64>,
    #[serde(default)]
    pub ram: Option<u64>,
    #[serde(default)]
    pub free_cpus: Option<u64>,
    #[serde(default)]
    pub free_ram: Option<u64>,
}

impl Agent {
    pub fn is_up(&self) -> bool {
        self.status == AgentStatus::Up
    }

    /// `(free, total)` cpus with `free` clamped to `total`.
    pub fn cpu_capacity(&self) -> (u64, u64) {
        clamp_capacity(self.free_cpus, self.cpus)
    }

    /// `(free, total)` ram in kilobytes with `free` clamped to `total`.
    pub fn ram_capacity(&self) -> (u64, u64) {
        clamp_capacity(self.free_ram, self.ram)
    }
}

fn clamp_capacity(free: Option<u64>, total: Option<u64>) -> (u64, u64) {
    let total = total.unwrap_or(0);
    (free.unwrap_or(0).min(total), total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Linux,
    Windows,
    #[serde(other)]
    Other,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Linux => "linux",
            AgentType::Windows => "windows",
            AgentType::Other => "other",
        }
    }

    /// Linux agents run jobs inside container images.
    pub fn uses_container_image(&self) -> bool {
        matches!(self, AgentType::Linux)
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "linux" => AgentType::Linux,
            "windows" => AgentType::Windows,
            _ => AgentType::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Up,
    Down,
    #[serde(other)]
    Unknown,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Up => "up",
            AgentStatus::Down => "down",
            AgentStatus::Unknown => "unknown",
        }
    }
}

/// Body of `POST /api/agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCreateRequest {
    pub description: String,
    pub agent_type: AgentType,
    pub endpoint: String,
}
