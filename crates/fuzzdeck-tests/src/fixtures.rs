//! Backend payloads as the orchestrator sends them.

use serde_json::{Value, json};

pub fn agent(guid: &str, status: &str) -> Value {
    json!({
        "guid": guid,
        "description": "worker",
        "agent_type": "linux",
        "endpoint": "10.0.0.2:31337",
        "status": status,
        "cpus": 4,
        "free_cpus": 2,
        "ram": 8000,
        "free_ram": 4000
    })
}

pub fn job_collection(guid: &str, status: &str) -> Value {
    json!({
        "guid": guid,
        "name": "libpng",
        "description": "png decoder",
        "agent_type": "linux",
        "creation_date": "2023-04-01 10:00:00",
        "cpus": 8,
        "ram": 4096,
        "timeout": "12h",
        "target": "target.zip",
        "corpus": "corpus.zip",
        "status": status
    })
}

pub fn job_info(guid: &str, status: &str) -> Value {
    json!({
        "job_collection": job_collection(guid, status),
        "jobs": [
            {
                "agent_guid": "a1",
                "collection_guid": guid,
                "idx": 0,
                "master": true,
                "cpus": 4,
                "ram": 2048,
                "last_msg": "fuzzing",
                "status": status
            }
        ]
    })
}

pub fn crash(guid: &str, job: &str, analyzed: Value) -> Value {
    json!({
        "guid": guid,
        "collection_guid": job,
        "name": "id:000000,sig:11",
        "creation_date": "2023-04-01T10:00:00Z",
        "size": 2048,
        "hash": "",
        "analyzed": analyzed
    })
}

pub fn series(guid: &str, values: &[(f64, &str)]) -> Value {
    let values: Vec<Value> = values.iter().map(|(ts, v)| json!([ts, v])).collect();
    json!({ "metric": { "guid": guid }, "values": values })
}

pub fn query_result(series: Vec<Value>) -> Value {
    json!({ "status": "success", "data": { "resultType": "matrix", "result": series } })
}
