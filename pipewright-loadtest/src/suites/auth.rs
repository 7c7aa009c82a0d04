//! Authentication and namespace authorization.
//!
//! The unknown-key checks expect a server with authentication enabled.

use super::fixtures::jq_pipeline;
use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::{Client, Method};

/// Key no server is configured with.
const UNKNOWN_KEY: &str = "pipewright-loadtest-unknown-key";

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let r = vu.anonymous.raw(Method::GET, "health/pipeline", None).await?;
    vu.check(
        "health without credentials: serving",
        r.status == 200 && r.body["status"] == "SERVING_STATUS_SERVING",
    );

    let id = vu.unique_id("auth");
    let r = vu
        .send(Method::POST, &vu.pipelines_path(), Some(&jq_pipeline(&id)))
        .await?;
    if !vu.check("auth setup: pipeline created", r.status == 201) {
        return Ok(());
    }

    let outcome = checks(vu, &id).await;
    vu.cleanup_pipeline(&id).await;
    outcome
}

async fn checks(vu: &VirtualUser, id: &str) -> Result<()> {
    let unknown = Client::new(vu.client.base_url())?.with_api_key(UNKNOWN_KEY);

    let r = unknown.raw(Method::GET, &vu.pipeline_path(id), None).await?;
    vu.check("unknown key on existing pipeline: status 401", r.status == 401);

    let missing = vu.unique_id("missing");
    let r = unknown.raw(Method::GET, &vu.pipeline_path(&missing), None).await?;
    vu.check("unknown key on missing pipeline: status 401", r.status == 401);

    let r = vu.anonymous.raw(Method::GET, &vu.pipelines_path(), None).await?;
    vu.check("no credentials on listing: status 401", r.status == 401);

    if let Some(foreign) = &vu.foreign {
        let r = foreign.raw(Method::GET, &vu.pipeline_path(id), None).await?;
        vu.check("foreign identity on pipeline: status 403", r.status == 403);

        let r = foreign.raw(Method::DELETE, &vu.pipeline_path(id), None).await?;
        vu.check("foreign identity delete: status 403", r.status == 403);

        let r = foreign.raw(Method::GET, &vu.connections_path(), None).await?;
        vu.check("foreign identity on connections: status 403", r.status == 403);
    }

    Ok(())
}
