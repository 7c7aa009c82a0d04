//! Page sizes, page tokens and filters over pipeline listings.

use super::fixtures::jq_pipeline;
use crate::error::Result;
use crate::vu::VirtualUser;
use pipewright_client::Method;
use std::collections::HashSet;

const PIPELINES: usize = 3;
const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

pub async fn run(vu: &VirtualUser) -> Result<()> {
    let prefix = vu.unique_id("page");
    let ids: Vec<String> = (0..PIPELINES).map(|i| format!("{}-{}", prefix, i)).collect();

    let mut created = Vec::new();
    for id in &ids {
        let r = vu
            .send(Method::POST, &vu.pipelines_path(), Some(&jq_pipeline(id)))
            .await?;
        if r.status == 201 {
            created.push(id.clone());
        }
    }
    vu.check("pagination setup: pipelines created", created.len() == PIPELINES);

    let outcome = checks(vu, &prefix, &ids).await;

    for id in &created {
        vu.cleanup_pipeline(id).await;
    }
    outcome
}

async fn checks(vu: &VirtualUser, prefix: &str, ids: &[String]) -> Result<()> {
    let collection = vu.pipelines_path();

    let r = vu.send(Method::GET, &collection, None).await?;
    let items = r.body["pipelines"].as_array().map(Vec::len).unwrap_or(0);
    vu.check("list pipelines: status 200", r.status == 200);
    vu.check("list pipelines: default page size respected", items <= DEFAULT_PAGE_SIZE);

    let r = vu
        .send(Method::GET, &format!("{}?pageSize=1000", collection), None)
        .await?;
    let items = r.body["pipelines"].as_array().map(Vec::len).unwrap_or(0);
    vu.check("list pipelines: page size capped", r.status == 200 && items <= MAX_PAGE_SIZE);

    let filter_raw = format!("q_title=\"{}\"", prefix);
    let filter = urlencoding::encode(&filter_raw);
    let mut seen = HashSet::new();
    let mut overlapping = false;
    let mut token = String::new();
    let mut pages = 0;
    loop {
        let path = format!(
            "{}?pageSize=1&filter={}&pageToken={}",
            collection, filter, token
        );
        let r = vu.send(Method::GET, &path, None).await?;
        if !vu.check("list filtered page: status 200", r.status == 200) {
            break;
        }
        vu.check(
            "list filtered page: total size matches",
            r.body["totalSize"] == ids.len() as u64,
        );
        for item in r.body["pipelines"].as_array().into_iter().flatten() {
            let id = item["id"].as_str().unwrap_or_default().to_string();
            overlapping |= !seen.insert(id);
        }
        token = r.body["nextPageToken"].as_str().unwrap_or_default().to_string();
        pages += 1;
        if token.is_empty() || pages > ids.len() {
            break;
        }
    }
    vu.check("page tokens: pages do not overlap", !overlapping);
    vu.check(
        "page tokens: every pipeline visited",
        ids.iter().all(|id| seen.contains(id)),
    );

    let filter_raw = format!("q_title=\"{}\"", ids[0]);
    let filter = urlencoding::encode(&filter_raw);
    let r = vu
        .send(Method::GET, &format!("{}?filter={}", collection, filter), None)
        .await?;
    vu.check("filter narrows listing", r.body["totalSize"] == 1);

    let r = vu
        .send(Method::GET, &format!("{}?pageToken=not-a-token", collection), None)
        .await?;
    vu.check("invalid page token: status 400", r.status == 400);

    let r = vu
        .send(Method::GET, &format!("{}?filter=colour%3D%22red%22", collection), None)
        .await?;
    vu.check("unknown filter field: status 400", r.status == 400);

    Ok(())
}

