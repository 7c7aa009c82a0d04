//! Component definitions, operator definitions and integrations.

use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::{ListOptions, Method};

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let definitions = vu
        .client
        .list_component_definitions(&ListOptions::new().page_size(100))
        .await;
    let total = match &definitions {
        Ok(list) => list.total_size,
        Err(_) => 0,
    };
    vu.check("list component definitions: not empty", total > 0);

    let r = vu
        .send(
            Method::GET,
            &format!("component-definitions?pageSize=10&page={}", total + 1),
            None,
        )
        .await?;
    vu.check(
        "component definitions past the end: empty page",
        r.status == 200 && r.body["componentDefinitions"].as_array().is_some_and(Vec::is_empty),
    );
    vu.check(
        "component definitions past the end: total size kept",
        r.body["totalSize"] == total as u64,
    );

    let r = vu
        .send(Method::GET, "component-definitions?filter=q_title%3D%22jso%22", None)
        .await?;
    vu.check(
        "component definitions fuzzy filter: matches",
        r.body["componentDefinitions"]
            .as_array()
            .is_some_and(|items| !items.is_empty() && items.iter().all(|d| d["id"] == "json")),
    );

    let r = vu.send(Method::GET, "component-definitions/json?view=VIEW_FULL", None).await?;
    vu.check(
        "get component definition: spec in full view",
        r.status == 200 && r.body["componentDefinition"]["spec"].is_object(),
    );

    let operators = vu
        .client
        .list_operator_definitions(&ListOptions::new())
        .await?;
    vu.check(
        "list operator definitions: operators only",
        !operators.operator_definitions.is_empty()
            && operators
                .operator_definitions
                .iter()
                .all(|d| d.name.starts_with("operator-definitions/")),
    );

    let integrations = vu.client.list_integrations(&ListOptions::new()).await?;
    vu.check(
        "list integrations: not empty",
        !integrations.integrations.is_empty(),
    );
    if let Some(first) = integrations.integrations.first() {
        let r = vu
            .send(Method::GET, &format!("integrations/{}", first.id), None)
            .await?;
        vu.check("get integration: status 200", r.status == 200);
    }

    let r = vu
        .send(Method::GET, "component-definitions/no-such-component", None)
        .await?;
    vu.check("get missing component definition: status 404", r.status == 404);

    Ok(())
}
