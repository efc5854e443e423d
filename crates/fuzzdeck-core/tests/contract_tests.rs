//! Parsing tests for payloads in the shape the orchestrator serves them.

use fuzzdeck_core::agent::*;
use fuzzdeck_core::crash::*;
use fuzzdeck_core::job::*;
use fuzzdeck_core::metrics::*;
use pretty_assertions::assert_eq;

#[test]
fn test_agents_collection() {
    let json = r#"[
        {"guid":"a1","description":"worker","agent_type":"linux","endpoint":"10.0.0.2:31337",
         "status":"up","cpus":4,"free_cpus":2,"ram":8000,"free_ram":4000},
        {"guid":"a2","description":"fresh","agent_type":"windows","endpoint":"10.0.0.3:31337",
         "status":"down","cpus":null,"free_cpus":null,"ram":null,"free_ram":null}
    ]"#;
    let agents: Vec<Agent> = serde_json::from_str(json).expect("deserialize");

    assert_eq!(agents.len(), 2);
    assert!(agents[0].is_up());
    assert_eq!(agents[0].ram_capacity(), (4000, 8000));
    assert_eq!(agents[1].agent_type, AgentType::Windows);
    assert_eq!(agents[1].cpu_capacity(), (0, 0));
}

#[test]
fn test_job_stats() {
    let stats: JobStats =
        serde_json::from_str(r#"{"alive":3,"completed":10,"error":1}"#).expect("deserialize");
    assert_eq!(
        stats,
        JobStats {
            alive: 3,
            completed: 10,
            error: 1
        }
    );
}

#[test]
fn test_crash_with_encoded_analysis() {
    let json = r#"{
        "guid":"c1","collection_guid":"j1","name":"id:000000,sig:11",
        "creation_date":"2023-04-01T10:00:00Z","size":1536,"hash":"ab12",
        "analyzed":"{\"gdb\":null,\"clusterfuzz\":{\"crash_type\":\"SEGV\"}}"
    }"#;
    let crash: Crash = serde_json::from_str(json).expect("deserialize");
    let decoded = Analysis::decode(crash.analyzed.as_deref().unwrap()).expect("decode");

    assert!(decoded.analysis.has(ReportKind::Clusterfuzz));
    assert!(!decoded.analysis.has(ReportKind::Gdb));
}

#[test]
fn test_crash_without_analysis() {
    let json = r#"{"guid":"c2","collection_guid":"j1","name":"hang","analyzed":null}"#;
    let crash: Crash = serde_json::from_str(json).expect("deserialize");
    assert_eq!(crash.analyzed, None);
    assert_eq!(crash.size, 0);
}

#[test]
fn test_agent_create_request_wire_shape() {
    let request = AgentCreateRequest {
        description: "worker".to_string(),
        agent_type: AgentType::Linux,
        endpoint: "10.0.0.2:31337".to_string(),
    };
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "description": "worker",
            "agent_type": "linux",
            "endpoint": "10.0.0.2:31337"
        })
    );
}

#[test]
fn test_stats_query_wire_shape() {
    let value = serde_json::to_value(StatsQuery::new(JobMetric::CycleDone.name())).expect("serialize");
    assert_eq!(value, serde_json::json!({"query": "cycle_done"}));
}
