//! Page composition.
//!
//! Each page fires its independent reads together and joins them. Widgets
//! never share state, so one failing read leaves only its own widget loading.

use crate::cards::AgentBoard;
use crate::detail::{CrashDetail, EntityDetailLoader, Hexdump, JobDetail};
use crate::mutation::MutationGateway;
use crate::stats::{StatsAggregator, Summary};
use crate::table::{LiveTable, TableBinding};
use crate::timeseries::{Graph, GraphSpec, TimeSeriesBridge};
use crate::view::Panel;
use fuzzdeck_core::ids::{CrashGuid, JobGuid};
use fuzzdeck_core::ports::FleetApi;
use fuzzdeck_notify::{Confirmer, Notifier};
use std::sync::Arc;

/// Pages reachable from the navigation and from row clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Agents,
    Jobs,
    Job(JobGuid),
    Crashes,
    Crash(CrashGuid),
}

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let mut parts = path.trim_start_matches('/').splitn(2, '/');
        match (parts.next()?, parts.next()) {
            ("", None) => Some(Route::Dashboard),
            ("agents", None) => Some(Route::Agents),
            ("jobs", None) => Some(Route::Jobs),
            ("crashes", None) => Some(Route::Crashes),
            ("job", Some(guid)) if !guid.is_empty() && !guid.contains('/') => {
                Some(Route::Job(JobGuid::new(guid)))
            }
            ("crash", Some(guid)) if !guid.is_empty() && !guid.contains('/') => {
                Some(Route::Crash(CrashGuid::new(guid)))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub summary: Summary,
    pub graphs: Vec<Graph>,
}

#[derive(Debug, Clone)]
pub struct AgentsPage {
    pub board: Panel<AgentBoard>,
}

#[derive(Debug, Clone)]
pub struct JobsPage {
    pub table: Panel<LiveTable>,
}

#[derive(Debug, Clone)]
pub struct JobPage {
    pub detail: Panel<JobDetail>,
    pub crashes: Panel<LiveTable>,
    pub graphs: Vec<Graph>,
}

#[derive(Debug, Clone)]
pub struct CrashesPage {
    pub table: Panel<LiveTable>,
}

#[derive(Debug, Clone)]
pub struct CrashPage {
    pub detail: Panel<CrashDetail>,
    pub hexdump: Panel<Hexdump>,
}

impl CrashPage {
    /// Whether the downloaded content matches the recorded sha256. `None`
    /// until both widgets loaded or when no hash is recorded.
    pub fn integrity(&self) -> Option<bool> {
        let detail = self.detail.ready()?;
        self.hexdump.ready()?.verify(&detail.hash)
    }
}

/// Collaborators shared by every page.
#[derive(Clone)]
pub struct Console {
    api: Arc<dyn FleetApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
}

impl Console {
    pub fn new(
        api: Arc<dyn FleetApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmer,
        }
    }

    pub fn api(&self) -> &dyn FleetApi {
        self.api.as_ref()
    }

    pub fn stats(&self) -> StatsAggregator {
        StatsAggregator::new(self.api.clone())
    }

    pub fn graphs(&self) -> TimeSeriesBridge {
        TimeSeriesBridge::new(self.api.clone())
    }

    pub fn details(&self) -> EntityDetailLoader {
        EntityDetailLoader::new(self.api.clone(), self.notifier.clone())
    }

    pub fn gateway(&self) -> MutationGateway {
        MutationGateway::new(
            self.api.clone(),
            self.notifier.clone(),
            self.confirmer.clone(),
        )
    }

    pub async fn dashboard(&self) -> DashboardPage {
        let stats = self.stats();
        let graphs = self.graphs();
        let specs = GraphSpec::dashboard();
        let (summary, graphs) = tokio::join!(stats.load(), graphs.render_all(&specs));
        DashboardPage { summary, graphs }
    }

    pub async fn agents(&self) -> AgentsPage {
        AgentsPage {
            board: AgentBoard::load(self.api()).await,
        }
    }

    pub async fn jobs(&self) -> JobsPage {
        JobsPage {
            table: LiveTable::load(self.api(), TableBinding::jobs()).await,
        }
    }

    pub async fn job(&self, guid: &JobGuid) -> JobPage {
        let details = self.details();
        let graphs = self.graphs();
        let specs = GraphSpec::for_job(guid);
        let (detail, crashes, graphs) = tokio::join!(
            details.load_job(guid),
            LiveTable::load(self.api(), TableBinding::job_crashes(guid)),
            graphs.render_all(&specs),
        );
        JobPage {
            detail,
            crashes,
            graphs,
        }
    }

    pub async fn crashes(&self) -> CrashesPage {
        CrashesPage {
            table: LiveTable::load(self.api(), TableBinding::crashes()).await,
        }
    }

    pub async fn crash(&self, guid: &CrashGuid) -> CrashPage {
        let details = self.details();
        let (detail, hexdump) = tokio::join!(details.load_crash(guid), details.load_hexdump(guid));
        CrashPage { detail, hexdump }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RowClick;
    use crate::testing::{FakeFleet, fixtures};
    use fuzzdeck_core::agent::AgentStatus;
    use fuzzdeck_core::job::JobStatus;
    use fuzzdeck_core::metrics::{GlobalQuery, MetricScope};
    use fuzzdeck_notify::{ScriptedConfirmer, ToastQueue};
    use pretty_assertions::assert_eq;

    fn console(fleet: FakeFleet) -> (Console, Arc<ToastQueue>) {
        let toasts = Arc::new(ToastQueue::default());
        let console = Console::new(
            Arc::new(fleet),
            toasts.clone(),
            Arc::new(ScriptedConfirmer::declining()),
        );
        (console, toasts)
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/agents"), Some(Route::Agents));
        assert_eq!(Route::parse("/jobs/"), Some(Route::Jobs));
        assert_eq!(
            Route::parse("/job/j1"),
            Some(Route::Job(JobGuid::new("j1")))
        );
        assert_eq!(
            Route::parse("/crash/c1"),
            Some(Route::Crash(CrashGuid::new("c1")))
        );
        assert_eq!(Route::parse("/job/"), None);
        assert_eq!(Route::parse("/job/a/b"), None);
        assert_eq!(Route::parse("/settings"), None);
    }

    #[tokio::test]
    async fn test_dashboard_degrades_per_widget() {
        let fleet = FakeFleet::new()
            .with_agents(vec![fixtures::agent("a1", AgentStatus::Up)])
            .fail("GET /api/crash")
            .with_metrics(
                &MetricScope::Global,
                GlobalQuery::ExecsPerSec.query(),
                fixtures::query_response(vec![fixtures::series("j1", &[(1.0, "1200")])]),
            );
        let (console, toasts) = console(fleet);

        let page = console.dashboard().await;

        assert!(page.summary.crashes.is_loading());
        assert!(!page.summary.agents.is_loading());
        let charts: Vec<bool> = page.graphs.iter().map(|g| g.chart.is_some()).collect();
        assert_eq!(charts, vec![false, true, false, false]);
        assert!(toasts.is_empty().await);
    }

    #[tokio::test]
    async fn test_job_page_row_click_reaches_crash_page() {
        let fleet = FakeFleet::new()
            .with_job_info(fixtures::job_info("j1", JobStatus::Alive))
            .with_crashes(vec![
                fixtures::crash("c1", "j1", None),
                fixtures::crash("c2", "j2", None),
            ])
            .with_content(CrashGuid::new("c1"), b"AAAA".to_vec());
        let (console, _) = console(fleet);

        let page = console.job(&JobGuid::new("j1")).await;
        assert!(page.detail.ready().expect("detail").stop.is_some());
        assert_eq!(page.graphs.len(), 4);

        let mut crashes = page.crashes.into_ready().expect("crash table");
        assert_eq!(crashes.len(), 1);
        let RowClick::Navigate(url) = crashes.click(0) else {
            panic!("crash rows navigate");
        };
        let Some(Route::Crash(guid)) = Route::parse(&url) else {
            panic!("unexpected route {}", url);
        };

        let crash = console.crash(&guid).await;
        assert!(!crash.detail.is_loading());
        assert_eq!(crash.hexdump.ready().expect("hexdump").size, 4);
        assert_eq!(crash.integrity(), None);
    }

    #[tokio::test]
    async fn test_crash_page_flags_hash_mismatch() {
        let mut crash = fixtures::crash("c1", "j1", None);
        crash.hash = "deadbeef".to_string();
        let fleet = FakeFleet::new()
            .with_crashes(vec![crash])
            .with_content(CrashGuid::new("c1"), b"AAAA".to_vec());
        let (console, _) = console(fleet);

        let page = console.crash(&CrashGuid::new("c1")).await;
        assert_eq!(page.integrity(), Some(false));
    }

    #[tokio::test]
    async fn test_crash_page_widgets_fail_independently() {
        let fleet = FakeFleet::new().with_crashes(vec![fixtures::crash("c1", "j1", None)]);
        let (console, toasts) = console(fleet);

        let page = console.crash(&CrashGuid::new("c1")).await;

        assert!(!page.detail.is_loading());
        assert!(page.hexdump.is_loading());
        assert_eq!(toasts.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_pages() {
        let fleet = FakeFleet::new()
            .with_agents(vec![fixtures::agent("a1", AgentStatus::Up)])
            .with_jobs(vec![fixtures::job_collection(
                "j1",
                JobStatus::Init,
                "2023-01-01 00:00:00",
            )])
            .fail("GET /api/crashes");
        let (console, _) = console(fleet);

        let agents = console.agents().await;
        let jobs = console.jobs().await;
        let crashes = console.crashes().await;

        assert_eq!(agents.board.ready().expect("board").cards()[0].cpus, "2/4");
        assert_eq!(jobs.table.ready().expect("jobs").len(), 1);
        assert!(crashes.table.is_loading());
    }
}
