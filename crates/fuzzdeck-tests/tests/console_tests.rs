//! Console read paths against a mock orchestrator.
//!
//! Run with: `cargo test -p fuzzdeck-tests --test console_tests`

use fuzzdeck_console::AgentBoard;
use fuzzdeck_console::table::{LiveTable, RowClick, TableBinding};
use fuzzdeck_core::crash::ReportKind;
use fuzzdeck_core::ids::{CrashGuid, JobGuid};
use fuzzdeck_core::metrics::GlobalQuery;
use fuzzdeck_notify::ToastLevel;
use fuzzdeck_tests::{TestBackend, fixtures};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_agents_payload_drives_summary_and_cards() {
    let backend = TestBackend::start().await;
    backend.agents(json!([fixtures::agent("a1", "up")])).await;
    backend
        .get_json("/api/job", json!({"alive": 1, "completed": 0, "error": 0}))
        .await;
    backend.get_json("/api/crash", json!({"total": 0})).await;
    let console = backend.console();

    let summary = console.stats().load().await;
    let counts = summary.agents.ready().expect("agent counts");
    assert_eq!(counts.total, 1);
    assert_eq!(counts.alive, 1);

    let board = AgentBoard::load(console.api()).await;
    let card = &board.ready().expect("agent board").cards()[0];
    assert_eq!(card.cpus, "2/4");
    assert_eq!(card.ram, "3.81 MB/7.63 MB");
    assert!(backend.toasts.is_empty().await);
}

#[tokio::test]
async fn test_crash_analysis_enables_only_present_tabs() {
    let backend = TestBackend::start().await;
    let analyzed = r#"{"gdb":null,"clusterfuzz":{"crash_type":"Heap-buffer-overflow","crash_state":"png_read_row"}}"#;
    backend
        .get_json("/api/crash/c1", fixtures::crash("c1", "j1", json!(analyzed)))
        .await;

    let panel = backend
        .console()
        .details()
        .load_crash(&CrashGuid::new("c1"))
        .await;
    let detail = panel.ready().expect("crash detail");

    assert_eq!(detail.enabled_tabs(), vec![ReportKind::Clusterfuzz]);
    assert!(!detail.tab(ReportKind::Gdb).expect("gdb tab").enabled);
    assert!(!detail.tab(ReportKind::Casr).expect("casr tab").enabled);
    assert_eq!(detail.field("size"), Some("2 KB"));
}

#[tokio::test]
async fn test_failed_stats_stay_silent() {
    let backend = TestBackend::start().await;
    backend.agents(json!([fixtures::agent("a1", "down")])).await;
    backend.respond("GET", "/api/job", 500, "database locked").await;
    backend.get_json("/api/crash", json!("not an object")).await;

    let summary = backend.console().stats().load().await;

    assert!(!summary.agents.is_loading());
    assert!(summary.jobs.is_loading());
    assert!(summary.crashes.is_loading());
    assert!(backend.toasts.is_empty().await);
}

#[tokio::test]
async fn test_detail_failure_raises_toast_with_status() {
    let backend = TestBackend::start().await;
    backend
        .respond("GET", "/api/job/j9", 404, "job not found")
        .await;

    let panel = backend
        .console()
        .details()
        .load_job(&JobGuid::new("j9"))
        .await;

    assert!(panel.is_loading());
    let toasts = backend.toasts.snapshot().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].title, "404 Not Found");
    assert_eq!(toasts[0].message, "job not found");
}

#[tokio::test]
async fn test_dashboard_graphs_render_independently() {
    let backend = TestBackend::start().await;
    backend
        .metrics(
            "/api/stats",
            GlobalQuery::SavedHangs.query(),
            fixtures::query_result(vec![
                fixtures::series("j1", &[(1.0, "0"), (2.0, "1")]),
                fixtures::series("j2", &[(1.0, "3")]),
            ]),
        )
        .await;
    backend
        .respond("POST", "/api/stats", 400, "Provided query is not allowed")
        .await;

    let page = backend.console().dashboard().await;

    let hangs = &page.graphs[0];
    let chart = hangs.chart.as_ref().expect("saved hangs chart");
    let labels: Vec<_> = chart.datasets.iter().map(|d| d.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("j1"), Some("j2")]);
    assert_eq!(chart.datasets[0].border_color, "#1b9e77");
    assert_eq!(chart.datasets[1].border_color, "#d95f02");
    assert!(page.graphs[1..].iter().all(|g| g.chart.is_none()));
    assert!(backend.toasts.is_empty().await);
}

#[tokio::test]
async fn test_job_page_stop_control_follows_status() {
    for (status, stoppable) in [("init", true), ("alive", true), ("completed", false), ("error", false)] {
        let backend = TestBackend::start().await;
        backend
            .get_json("/api/job/j1", fixtures::job_info("j1", status))
            .await;

        let panel = backend
            .console()
            .details()
            .load_job(&JobGuid::new("j1"))
            .await;
        let detail = panel.ready().expect("job detail");
        assert_eq!(detail.stop.is_some(), stoppable, "status {}", status);
    }
}

#[tokio::test]
async fn test_crash_table_navigates_newest_first() {
    let backend = TestBackend::start().await;
    let mut older = fixtures::crash("c1", "j1", json!(null));
    older["creation_date"] = json!("2023-03-01T10:00:00Z");
    let newer = fixtures::crash("c2", "j1", json!("{}"));
    backend.get_json("/api/crashes", json!([older, newer])).await;

    let client = backend.client();
    let panel = LiveTable::load(&client, TableBinding::crashes()).await;
    let mut table = panel.into_ready().expect("crash table");

    let view = table.view();
    assert_eq!(view[0].id.as_deref(), Some("c2"));
    assert_eq!(view[0].cells[5].text(), "yes");
    assert_eq!(view[1].cells[5].text(), "no");
    assert_eq!(
        table.click(view[0].index),
        RowClick::Navigate("/crash/c2".to_string())
    );
}
