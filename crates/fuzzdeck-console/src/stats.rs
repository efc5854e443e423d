//! Summary counters for the dashboard.
//!
//! Failures are logged and otherwise swallowed: a widget whose fetch failed
//! keeps its loading placeholder instead of showing a wrong number.

use crate::view::Panel;
use fuzzdeck_core::agent::Agent;
use fuzzdeck_core::crash::CrashStats;
use fuzzdeck_core::job::JobStats;
use fuzzdeck_core::ports::FleetApi;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentCounts {
    pub total: u64,
    pub alive: u64,
}

/// Total agents and the subset reporting `up`.
pub fn count_agents(agents: &[Agent]) -> AgentCounts {
    AgentCounts {
        total: agents.len() as u64,
        alive: agents.iter().filter(|a| a.is_up()).count() as u64,
    }
}

/// One scalar widget on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryWidget {
    pub id: &'static str,
    pub label: &'static str,
    pub value: Panel<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub agents: Panel<AgentCounts>,
    pub jobs: Panel<JobStats>,
    pub crashes: Panel<CrashStats>,
}

impl Summary {
    /// Widgets in dashboard order.
    pub fn widgets(&self) -> Vec<SummaryWidget> {
        let agents = self.agents.ready();
        let jobs = self.jobs.ready();
        let widget = |id, label, value: Option<u64>| SummaryWidget {
            id,
            label,
            value: value.into(),
        };
        vec![
            widget("agents_total", "Agents", agents.map(|a| a.total)),
            widget("agents_alive", "Alive agents", agents.map(|a| a.alive)),
            widget("jobs_alive", "Alive jobs", jobs.map(|j| j.alive)),
            widget("jobs_completed", "Completed jobs", jobs.map(|j| j.completed)),
            widget("jobs_error", "Failed jobs", jobs.map(|j| j.error)),
            widget(
                "crashes_total",
                "Crashes",
                self.crashes.ready().map(|c| c.total),
            ),
        ]
    }
}

pub struct StatsAggregator {
    api: Arc<dyn FleetApi>,
}

impl StatsAggregator {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self { api }
    }

    pub async fn agent_counts(&self) -> Panel<AgentCounts> {
        match self.api.list_agents().await {
            Ok(agents) => Panel::Ready(count_agents(&agents)),
            Err(e) => {
                debug!(error = %e, "Agent stats unavailable");
                Panel::Loading
            }
        }
    }

    pub async fn job_stats(&self) -> Panel<JobStats> {
        match self.api.job_stats().await {
            Ok(stats) => Panel::Ready(stats),
            Err(e) => {
                debug!(error = %e, "Job stats unavailable");
                Panel::Loading
            }
        }
    }

    pub async fn crash_stats(&self) -> Panel<CrashStats> {
        match self.api.crash_stats().await {
            Ok(stats) => Panel::Ready(stats),
            Err(e) => {
                debug!(error = %e, "Crash stats unavailable");
                Panel::Loading
            }
        }
    }

    /// Fetch all three summaries concurrently.
    pub async fn load(&self) -> Summary {
        let (agents, jobs, crashes) =
            tokio::join!(self.agent_counts(), self.job_stats(), self.crash_stats());
        Summary {
            agents,
            jobs,
            crashes,
        }
    }
}
