//! Pipeline CRUD, validation, rename and look-up.

use super::fixtures::jq_pipeline;
use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::Method;
use serde_json::json;

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let id = vu.unique_id("pipe");
    let renamed = vu.unique_id("renamed");
    let collection = vu.pipelines_path();

    let r = vu.send(Method::POST, &collection, Some(&json!({}))).await?;
    vu.check("create pipeline without id: status 400", r.status == 400);

    let r = vu
        .send(Method::POST, &collection, Some(&json!({ "id": "Not A Valid Id" })))
        .await?;
    vu.check("create pipeline with invalid id: status 400", r.status == 400);

    let r = vu.send(Method::POST, &collection, Some(&jq_pipeline(&id))).await?;
    if !vu.check("create pipeline: status 201", r.status == 201) {
        return Ok(());
    }
    let pipeline = &r.body["pipeline"];
    vu.check("create pipeline: id echoed", pipeline["id"] == id.as_str());
    vu.check(
        "create pipeline: name is {ns}/pipelines/{id}",
        pipeline["name"] == format!("{}/pipelines/{}", vu.namespace, id).as_str(),
    );
    vu.check("create pipeline: state active", pipeline["state"] == "STATE_ACTIVE");
    let uid = pipeline["uid"].as_str().unwrap_or_default().to_string();
    vu.check("create pipeline: uid assigned", !uid.is_empty());

    let r = vu.send(Method::POST, &collection, Some(&jq_pipeline(&id))).await?;
    vu.check("create duplicate pipeline: status 409", r.status == 409);

    let r = vu.send(Method::GET, &vu.pipeline_path(&id), None).await?;
    vu.check("get pipeline: status 200", r.status == 200);
    vu.check(
        "get pipeline: basic view omits recipe",
        r.body["pipeline"].get("recipe").is_none(),
    );

    let path = format!("{}?view=VIEW_FULL", vu.pipeline_path(&id));
    let r = vu.send(Method::GET, &path, None).await?;
    vu.check(
        "get pipeline: full view has recipe",
        r.body["pipeline"]["recipe"].is_object(),
    );

    let r = vu
        .send(Method::GET, &vu.pipeline_path(&vu.unique_id("missing")), None)
        .await?;
    vu.check("get missing pipeline: status 404", r.status == 404);

    let r = vu
        .send(
            Method::PATCH,
            &format!("{}?updateMask=description", vu.pipeline_path(&id)),
            Some(&json!({ "description": "updated" })),
        )
        .await?;
    vu.check("update pipeline: status 200", r.status == 200);
    vu.check(
        "update pipeline: description changed",
        r.body["pipeline"]["description"] == "updated",
    );

    let r = vu
        .send(
            Method::PATCH,
            &vu.pipeline_path(&id),
            Some(&json!({ "uid": "00000000-0000-0000-0000-000000000000" })),
        )
        .await?;
    vu.check("update immutable field: status 400", r.status == 400);

    let r = vu
        .send(Method::POST, &format!("{}/validate", vu.pipeline_path(&id)), Some(&json!({})))
        .await?;
    vu.check("validate pipeline: success", r.status == 200 && r.body["success"] == true);

    let r = vu
        .send(
            Method::POST,
            &format!("{}/rename", vu.pipeline_path(&id)),
            Some(&json!({ "newPipelineId": renamed })),
        )
        .await?;
    let renamed_ok = vu.check("rename pipeline: status 200", r.status == 200);
    vu.check(
        "rename pipeline: uid kept",
        r.body["pipeline"]["uid"] == uid.as_str(),
    );
    let current = if renamed_ok { renamed } else { id };

    let r = vu
        .send(Method::GET, &format!("pipelines/{}/lookUp", uid), None)
        .await?;
    vu.check(
        "look up pipeline by uid: found",
        r.status == 200 && r.body["pipeline"]["id"] == current.as_str(),
    );

    let r = vu.send(Method::DELETE, &vu.pipeline_path(&current), None).await?;
    vu.check("delete pipeline: status 204", r.status == 204);

    let r = vu.send(Method::GET, &vu.pipeline_path(&current), None).await?;
    vu.check("get deleted pipeline: status 404", r.status == 404);

    Ok(())
}
