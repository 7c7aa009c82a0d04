//! Sync and async triggers, run history and component runs.

use super::fixtures::{http_pipeline, jq_inputs, jq_pipeline};
use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::{Method, RawResponse};
use serde_json::{json, Value};
use std::time::Duration;

const OPERATION_POLLS: usize = 100;
const OPERATION_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let id = vu.unique_id("trig");
    let dangling = vu.unique_id("dangling");

    let r = vu
        .send(Method::POST, &vu.pipelines_path(), Some(&jq_pipeline(&id)))
        .await?;
    if !vu.check("trigger setup: pipeline created", r.status == 201) {
        return Ok(());
    }
    let outcome = checks(vu, &id, &dangling).await;
    vu.cleanup_pipeline(&id).await;
    vu.cleanup_pipeline(&dangling).await;
    outcome
}

async fn trigger(vu: &VirtualUser, id: &str, action: &str, body: &Value) -> Result<RawResponse> {
    let path = format!("{}/{}", vu.pipeline_path(id), action);
    Ok(vu.send(Method::POST, &path, Some(body)).await?)
}

async fn checks(vu: &VirtualUser, id: &str, dangling: &str) -> Result<()> {
    let r = trigger(vu, id, "trigger", &jq_inputs(json!("bar"))).await?;
    vu.check("sync trigger: status 200", r.status == 200);
    vu.check(
        "sync trigger: run completed",
        r.body["metadata"]["status"] == "RUN_STATUS_COMPLETED",
    );
    vu.check(
        "sync trigger: outputs computed",
        r.body["outputs"] == json!([{ "answer": "bar" }]),
    );
    let completed_run = r.body["metadata"]["pipelineRunUid"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let r = trigger(vu, id, "trigger", &json!({ "inputs": [{}] })).await?;
    vu.check("sync trigger with failing component: status 200", r.status == 200);
    vu.check(
        "sync trigger with failing component: run failed",
        r.body["metadata"]["status"] == "RUN_STATUS_FAILED",
    );

    let r = vu
        .send(
            Method::POST,
            &vu.pipelines_path(),
            Some(&http_pipeline(dangling, &vu.unique_id("missing"))),
        )
        .await?;
    if r.status == 201 {
        let r = trigger(vu, dangling, "trigger", &json!({ "inputs": [{}] })).await?;
        vu.check("trigger with unresolved reference: status 400", r.status == 400);
    }

    let r = trigger(vu, id, "triggerAsync", &jq_inputs(json!(1))).await?;
    vu.check("async trigger: status 200", r.status == 200);
    let name = r.body["operation"]["name"].as_str().unwrap_or_default().to_string();
    vu.check("async trigger: operation name", name.starts_with("operations/"));

    let mut operation = Value::Null;
    if let Some(op_id) = name.strip_prefix("operations/") {
        for _ in 0..OPERATION_POLLS {
            let r = vu.send(Method::GET, &format!("operations/{}", op_id), None).await?;
            if r.body["operation"]["done"] == true {
                operation = r.body["operation"].clone();
                break;
            }
            tokio::time::sleep(OPERATION_POLL_INTERVAL).await;
        }
    }
    vu.check("async trigger: operation finished", operation["done"] == true);
    vu.check(
        "async trigger: outputs in operation response",
        operation["response"]["outputs"] == json!([{ "answer": 1 }]),
    );

    let r = vu
        .send(Method::GET, &format!("{}/runs", vu.pipeline_path(id)), None)
        .await?;
    vu.check("list runs: status 200", r.status == 200);
    vu.check("list runs: every trigger recorded", r.body["totalSize"] == 3);
    vu.check("list runs: page number reported", r.body["page"] == 0);

    let r = vu
        .send(
            Method::GET,
            &format!("pipeline-runs/{}/component-runs", completed_run),
            None,
        )
        .await?;
    vu.check("list component runs: status 200", r.status == 200);
    vu.check(
        "list component runs: one per component",
        r.body["componentRuns"].as_array().map(Vec::len) == Some(1),
    );

    Ok(())
}
