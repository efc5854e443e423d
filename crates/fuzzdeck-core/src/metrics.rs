//! Metric query types (Prometheus-style query contract).

use crate::ids::JobGuid;
use crate::route::ApiPath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /api/stats` and `POST /api/stats/{guid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub query: String,
}

impl StatsQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Which metric endpoint a query is posted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricScope {
    Global,
    Job(JobGuid),
}

impl MetricScope {
    pub fn path(&self) -> ApiPath {
        match self {
            MetricScope::Global => ApiPath::api("stats"),
            MetricScope::Job(guid) => ApiPath::api("stats").join(guid),
        }
    }
}

/// Fleet-wide queries the backend accepts on `/api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalQuery {
    SavedHangs,
    ExecsPerSec,
    SavedCrashes,
    EdgesFound,
}

impl GlobalQuery {
    pub const ALL: [GlobalQuery; 4] = [
        GlobalQuery::SavedHangs,
        GlobalQuery::ExecsPerSec,
        GlobalQuery::SavedCrashes,
        GlobalQuery::EdgesFound,
    ];

    pub fn query(&self) -> &'static str {
        match self {
            GlobalQuery::SavedHangs => r#"sum by (guid) (fuzzing{type="saved_hangs"})"#,
            GlobalQuery::ExecsPerSec => r#"sum by (guid) (fuzzing{type="execs_per_sec"})"#,
            GlobalQuery::SavedCrashes => r#"sum by (guid) (fuzzing{type="saved_crashes"})"#,
            GlobalQuery::EdgesFound => r#"fuzzing{type="edges_found",banner="0"}"#,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GlobalQuery::SavedHangs => "saved_hangs",
            GlobalQuery::ExecsPerSec => "execs_per_sec",
            GlobalQuery::SavedCrashes => "saved_crashes",
            GlobalQuery::EdgesFound => "edges_found",
        }
    }
}

/// Per-job metrics accepted by name on `/api/stats/{guid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobMetric {
    ExecsPerSec,
    SavedCrashes,
    EdgesFound,
    CycleDone,
}

impl JobMetric {
    pub const ALL: [JobMetric; 4] = [
        JobMetric::ExecsPerSec,
        JobMetric::SavedCrashes,
        JobMetric::EdgesFound,
        JobMetric::CycleDone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JobMetric::ExecsPerSec => "execs_per_sec",
            JobMetric::SavedCrashes => "saved_crashes",
            JobMetric::EdgesFound => "edges_found",
            JobMetric::CycleDone => "cycle_done",
        }
    }
}

/// One `(timestamp, value)` sample. Values arrive as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, String)", into = "(f64, String)")]
pub struct Sample {
    pub timestamp: f64,
    pub value: String,
}

impl From<(f64, String)> for Sample {
    fn from((timestamp, value): (f64, String)) -> Self {
        Self { timestamp, value }
    }
}

impl From<Sample> for (f64, String) {
    fn from(s: Sample) -> Self {
        (s.timestamp, s.value)
    }
}

/// A labelled sequence of samples.
///
/// Range queries fill `values`; instant queries fill `value` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<Sample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Sample>,
}

impl MetricSeries {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metric.get(key).map(String::as_str)
    }

    /// Samples in order, folding an instant-vector `value` into a single sample.
    pub fn samples(&self) -> Vec<Sample> {
        if self.values.is_empty() {
            self.value.iter().cloned().collect()
        } else {
            self.values.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub result: Vec<MetricSeries>,
}

/// Body returned by the metric endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub data: QueryData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_response_parses() {
        let json = r#"{
            "status": "success",
            "data": {"resultType": "matrix", "result": [
                {"metric": {"guid": "a1"}, "values": [[1680000000.0, "12"], [1680000030.0, "15"]]}
            ]}
        }"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        let series = &resp.data.result[0];
        assert_eq!(series.label("guid"), Some("a1"));
        assert_eq!(series.samples().len(), 2);
        assert_eq!(series.samples()[1].value, "15");
    }

    #[test]
    fn test_instant_value_folds_into_samples() {
        let json = r#"{"metric": {"guid": "a2"}, "value": [1680000000, "7"]}"#;
        let series: MetricSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.samples(), vec![Sample::from((1680000000.0, "7".to_string()))]);
    }

    #[test]
    fn test_scope_paths() {
        assert_eq!(MetricScope::Global.path().to_string(), "/api/stats");
        assert_eq!(
            MetricScope::Job(JobGuid::new("j1")).path().segments(),
            ["api", "stats", "j1"]
        );
    }

    #[test]
    fn test_global_queries_match_backend_allow_list() {
        assert_eq!(
            GlobalQuery::ExecsPerSec.query(),
            "sum by (guid) (fuzzing{type=\"execs_per_sec\"})"
        );
        assert_eq!(
            GlobalQuery::EdgesFound.query(),
            "fuzzing{type=\"edges_found\",banner=\"0\"}"
        );
    }
}
