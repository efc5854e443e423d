//! Metric queries turned into chart datasets.

use fuzzdeck_core::ids::JobGuid;
use fuzzdeck_core::metrics::{
    GlobalQuery, JobMetric, MetricScope, MetricSeries, Sample, StatsQuery,
};
use fuzzdeck_core::ports::FleetApi;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Line colors, assigned by series position.
pub const PALETTE: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

/// Label the backend groups every fuzzing query by.
pub const DEFAULT_LABEL_KEY: &str = "guid";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: Option<String>,
    pub data: Vec<Sample>,
    pub color_index: usize,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub point_radius: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub datasets: Vec<Dataset>,
}

/// One dataset per series, in input order.
pub fn to_chart(series: &[MetricSeries], label_key: &str) -> ChartData {
    let datasets = series
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let color_index = idx % PALETTE.len();
            Dataset {
                label: s.label(label_key).map(str::to_string),
                data: s.samples(),
                color_index,
                border_color: PALETTE[color_index],
                background_color: "transparent",
                point_radius: 1,
            }
        })
        .collect();
    ChartData { datasets }
}

/// What a graph widget asks the backend for.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSpec {
    pub id: String,
    pub scope: MetricScope,
    pub query: StatsQuery,
    pub label_key: String,
}

impl GraphSpec {
    pub fn new(id: impl Into<String>, scope: MetricScope, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            query: StatsQuery::new(query),
            label_key: DEFAULT_LABEL_KEY.to_string(),
        }
    }

    pub fn global(query: GlobalQuery) -> Self {
        Self::new(query.name(), MetricScope::Global, query.query())
    }

    pub fn job(guid: &JobGuid, metric: JobMetric) -> Self {
        Self::new(metric.name(), MetricScope::Job(guid.clone()), metric.name())
    }

    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = key.into();
        self
    }

    /// Dashboard graphs.
    pub fn dashboard() -> Vec<GraphSpec> {
        GlobalQuery::ALL.iter().map(|q| GraphSpec::global(*q)).collect()
    }

    /// Graphs on a job page.
    pub fn for_job(guid: &JobGuid) -> Vec<GraphSpec> {
        JobMetric::ALL.iter().map(|m| GraphSpec::job(guid, *m)).collect()
    }
}

/// A rendered graph slot. `chart` is `None` when the query failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub id: String,
    pub chart: Option<ChartData>,
}

pub struct TimeSeriesBridge {
    api: Arc<dyn FleetApi>,
}

impl TimeSeriesBridge {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self { api }
    }

    pub async fn render(&self, spec: &GraphSpec) -> Graph {
        let chart = match self.api.query_metrics(&spec.scope, &spec.query).await {
            Ok(resp) => {
                debug!(graph = %spec.id, series = resp.data.result.len(), "Graph data received");
                Some(to_chart(&resp.data.result, &spec.label_key))
            }
            Err(e) => {
                warn!(graph = %spec.id, error = %e, "Graph not rendered");
                None
            }
        };
        Graph {
            id: spec.id.clone(),
            chart,
        }
    }

    /// Render every graph concurrently; one failing query never affects the
    /// others.
    pub async fn render_all(&self, specs: &[GraphSpec]) -> Vec<Graph> {
        join_all(specs.iter().map(|spec| self.render(spec))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFleet, fixtures};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_chart_preserves_order_and_labels() {
        let series = vec![
            fixtures::series("zeta", &[(1.0, "1")]),
            fixtures::series("alpha", &[(1.0, "2"), (2.0, "3")]),
        ];
        let chart = to_chart(&series, "guid");

        let labels: Vec<_> = chart.datasets.iter().map(|d| d.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("zeta"), Some("alpha")]);
        assert_eq!(chart.datasets[1].data, series[1].values);
        assert_eq!(chart.datasets[0].border_color, "#1b9e77");
        assert_eq!(chart.datasets[1].border_color, "#d95f02");
    }

    #[test]
    fn test_colors_cycle_through_palette() {
        let series: Vec<_> = (0..19)
            .map(|i| fixtures::series(&format!("a{}", i), &[]))
            .collect();
        let chart = to_chart(&series, "guid");

        assert_eq!(chart.datasets.len(), 19);
        for (idx, dataset) in chart.datasets.iter().enumerate() {
            assert_eq!(dataset.color_index, idx % 8);
            assert_eq!(dataset.border_color, PALETTE[idx % 8]);
        }
    }

    #[test]
    fn test_missing_label_is_none() {
        let chart = to_chart(&[MetricSeries::default()], "guid");
        assert_eq!(chart.datasets[0].label, None);
    }

    #[tokio::test]
    async fn test_failing_graph_does_not_block_siblings() {
        let guid = JobGuid::new("j1");
        let scope = MetricScope::Job(guid.clone());
        let fleet = FakeFleet::new()
            .with_metrics(
                &scope,
                "execs_per_sec",
                fixtures::query_response(vec![fixtures::series("a1", &[(1.0, "900")])]),
            )
            .with_metrics(
                &scope,
                "edges_found",
                fixtures::query_response(vec![fixtures::series("a1", &[(1.0, "12")])]),
            );
        let bridge = TimeSeriesBridge::new(Arc::new(fleet));

        let graphs = bridge.render_all(&GraphSpec::for_job(&guid)).await;
        let rendered: Vec<(&str, bool)> = graphs
            .iter()
            .map(|g| (g.id.as_str(), g.chart.is_some()))
            .collect();

        assert_eq!(
            rendered,
            vec![
                ("execs_per_sec", true),
                ("saved_crashes", false),
                ("edges_found", true),
                ("cycle_done", false),
            ]
        );
    }

    #[test]
    fn test_dashboard_specs_use_global_scope() {
        let specs = GraphSpec::dashboard();
        assert_eq!(specs.len(), 4);
        assert!(specs.iter().all(|s| s.scope == MetricScope::Global));
        assert_eq!(specs[1].query.query, GlobalQuery::ExecsPerSec.query());
    }
}
