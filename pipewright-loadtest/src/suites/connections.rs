//! Connection CRUD, view gating, redaction and referenced pipelines.

use super::fixtures::{bearer_connection, http_pipeline};
use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::Method;
use serde_json::json;

/// Placeholder the server returns for secret setup values.
const REDACTED: &str = "*****";

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let id = vu.unique_id("conn");
    let pipeline = vu.unique_id("uses-conn");

    let r = vu
        .send(Method::POST, &vu.connections_path(), Some(&bearer_connection(&id)))
        .await?;
    if !vu.check("create connection: status 201", r.status == 201) {
        return Ok(());
    }
    vu.check(
        "create connection: secret setup redacted",
        r.body["connection"]["setup"]["authentication"] == REDACTED,
    );
    vu.check(
        "create connection: integration title filled",
        r.body["connection"]["integrationTitle"] == "HTTP",
    );

    let outcome = checks(vu, &id, &pipeline).await;
    vu.cleanup_pipeline(&pipeline).await;
    vu.cleanup_connection(&id).await;
    outcome
}

async fn checks(vu: &VirtualUser, id: &str, pipeline: &str) -> Result<()> {
    let r = vu
        .send(Method::POST, &vu.connections_path(), Some(&bearer_connection(id)))
        .await?;
    vu.check("create duplicate connection: status 409", r.status == 409);

    let r = vu.send(Method::GET, &vu.connection_path(id), None).await?;
    vu.check("get connection: status 200", r.status == 200);
    vu.check(
        "get connection: basic view omits setup",
        r.body["connection"].get("setup").is_none(),
    );

    let path = format!("{}?view=VIEW_FULL", vu.connection_path(id));
    let r = vu.send(Method::GET, &path, None).await?;
    vu.check(
        "get connection: full view has setup",
        r.body["connection"]["setup"].is_object(),
    );

    let r = vu
        .send(
            Method::PATCH,
            &vu.connection_path(id),
            Some(&json!({ "description": "changed" })),
        )
        .await?;
    vu.check(
        "update connection: description changed",
        r.status == 200 && r.body["connection"]["description"] == "changed",
    );

    let r = vu
        .send(Method::POST, &vu.pipelines_path(), Some(&http_pipeline(pipeline, id)))
        .await?;
    vu.check("create referencing pipeline: state active", r.body["pipeline"]["state"] == "STATE_ACTIVE");

    let path = format!("{}/referenced-pipelines", vu.connection_path(id));
    let r = vu.send(Method::GET, &path, None).await?;
    vu.check("referenced pipelines: status 200", r.status == 200);
    vu.check(
        "referenced pipelines: includes referencing pipeline",
        r.body["pipelineIds"]
            .as_array()
            .is_some_and(|ids| ids.iter().any(|p| p == pipeline)),
    );

    let r = vu.send(Method::DELETE, &vu.connection_path(id), None).await?;
    vu.check("delete connection: status 204", r.status == 204);

    let r = vu.send(Method::GET, &vu.connection_path(id), None).await?;
    vu.check("get deleted connection: status 404", r.status == 404);

    let r = vu.send(Method::GET, &vu.pipeline_path(pipeline), None).await?;
    vu.check(
        "pipeline after connection delete: state error",
        r.body["pipeline"]["state"] == "STATE_ERROR",
    );

    Ok(())
}
