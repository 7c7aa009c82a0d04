//! Connection lifecycle and pipeline reference lookup.

use crate::catalog::Catalog;
use crate::controller::ListQuery;
use crate::store::Stores;
use pipewright_core::filter::Filter;
use pipewright_core::mask::FieldMask;
use pipewright_core::model::{Connection, ConnectionResource, Pipeline};
use pipewright_core::pagination::{paginate_by_token, Page, PageLimits};
use pipewright_core::recipe::{Reference, ReferenceParser};
use pipewright_core::{Namespace, PipewrightError, Result, View};
use serde_json::Value;
use std::sync::Arc;

/// Connection operations.
#[derive(Clone)]
pub struct ConnectionController {
    stores: Stores,
    catalog: Arc<Catalog>,
    limits: PageLimits,
}

impl ConnectionController {
    /// Create a controller.
    pub fn new(stores: Stores, catalog: Arc<Catalog>, limits: PageLimits) -> Self {
        Self {
            stores,
            catalog,
            limits,
        }
    }

    fn render(&self, connection: &Connection, view: View) -> ConnectionResource {
        connection.to_resource(view, &self.catalog.secret_fields(&connection.integration_id))
    }

    /// Create a connection for a catalog integration.
    pub fn create(&self, namespace: &Namespace, body: &Value) -> Result<ConnectionResource> {
        let connection = Connection::from_create_body(namespace.clone(), body, |id| {
            self.catalog.integration(id).map(|i| i.title.clone())
        })?;
        let created = self.stores.connections.create(connection)?;

        tracing::info!(
            connection = %created.name(),
            integration = %created.integration_id,
            "Connection created"
        );
        Ok(self.render(&created, View::Full))
    }

    /// Get a connection.
    pub fn get(&self, namespace: &Namespace, id: &str, view: View) -> Result<ConnectionResource> {
        let connection = self.stores.connections.get(namespace, id)?;
        Ok(self.render(&connection, view))
    }

    /// List connections of a namespace, newest first.
    pub fn list(&self, namespace: &Namespace, query: &ListQuery) -> Result<Page<ConnectionResource>> {
        let filter = Filter::parse_for::<Connection>(query.filter.as_deref())?;
        let connections = filter.apply(self.stores.connections.list(namespace));
        let page = paginate_by_token(connections, &query.page, &self.limits, Connection::list_key)?;
        Ok(page.map(|c| self.render(&c, query.view)))
    }

    /// Apply a partial update.
    pub fn update(
        &self,
        namespace: &Namespace,
        id: &str,
        body: &Value,
        mask: Option<&str>,
    ) -> Result<ConnectionResource> {
        if !body.is_object() {
            return Err(PipewrightError::MissingField {
                field: "connection".to_string(),
            });
        }
        let mask = FieldMask::resolve(mask, body)?;
        let updated = self
            .stores
            .connections
            .update(namespace, id, |c| c.apply_update(body, &mask))?;

        tracing::info!(connection = %updated.name(), "Connection updated");
        Ok(self.render(&updated, View::Full))
    }

    /// Delete a connection.
    ///
    /// Pipelines that still reference it are left in place and fail
    /// validation until the connection is recreated.
    pub fn delete(&self, namespace: &Namespace, id: &str) -> Result<()> {
        let removed = self.stores.connections.delete(namespace, id)?;
        let dangling: Vec<String> = self
            .referencing(namespace, id)
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        if dangling.is_empty() {
            tracing::info!(connection = %removed.name(), "Connection deleted");
        } else {
            tracing::warn!(
                connection = %removed.name(),
                pipelines = ?dangling,
                "Connection deleted while still referenced"
            );
        }
        Ok(())
    }

    /// Ids of the pipelines whose recipes reference a connection.
    pub fn referenced_pipelines(
        &self,
        namespace: &Namespace,
        id: &str,
        query: &ListQuery,
    ) -> Result<Page<String>> {
        self.stores.connections.get(namespace, id)?;
        let page = paginate_by_token(
            self.referencing(namespace, id),
            &query.page,
            &self.limits,
            Pipeline::list_key,
        )?;
        Ok(page.map(|p| p.id.to_string()))
    }

    fn referencing(&self, namespace: &Namespace, id: &str) -> Vec<Pipeline> {
        self.stores
            .pipelines
            .list(None)
            .into_iter()
            .filter(|p| p.namespace.id == namespace.id && references_connection(p, id))
            .collect()
    }
}

fn references_connection(pipeline: &Pipeline, connection_id: &str) -> bool {
    let is_match =
        |r: &Reference| r.root == "connection" && r.first_field() == Some(connection_id);

    pipeline.recipe.component.values().any(|component| {
        let mut references = ReferenceParser::collect(&component.input).unwrap_or_default();
        if let Some(setup) = &component.setup {
            references.extend(ReferenceParser::collect(setup).unwrap_or_default());
        }
        if let Some(condition) = &component.condition {
            references.extend(ReferenceParser::parse_all(condition).unwrap_or_default());
        }
        references.iter().any(is_match)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipewright_core::model::REDACTED;
    use serde_json::json;

    fn controller() -> ConnectionController {
        ConnectionController::new(
            Stores::new(10, 10),
            Arc::new(Catalog::standard()),
            PageLimits::default(),
        )
    }

    fn ns() -> Namespace {
        Namespace::parse("users/admin").unwrap()
    }

    fn openai_body(id: &str) -> Value {
        json!({
            "id": id,
            "integrationId": "openai",
            "method": "METHOD_DICTIONARY",
            "setup": { "api-key": "sk-secret", "organization": "acme" }
        })
    }

    #[test]
    fn create_redacts_secrets() {
        let c = controller();
        let created = c.create(&ns(), &openai_body("my-openai")).unwrap();
        assert_eq!(created.integration_title, "OpenAI");
        let setup = created.setup.unwrap();
        assert_eq!(setup["api-key"], REDACTED);
        assert_eq!(setup["organization"], "acme");

        let basic = c.get(&ns(), "my-openai", View::Basic).unwrap();
        assert!(basic.setup.is_none());
    }

    #[test]
    fn unknown_integration_is_not_found() {
        let c = controller();
        let err = c
            .create(&ns(), &json!({ "id": "x", "integrationId": "nope" }))
            .unwrap_err();
        assert_eq!(err.code(), "E204");
    }

    #[test]
    fn update_keeps_redacted_secret() {
        let c = controller();
        c.create(&ns(), &openai_body("conn")).unwrap();
        c.update(
            &ns(),
            "conn",
            &json!({ "setup": { "api-key": REDACTED, "organization": "other" } }),
            None,
        )
        .unwrap();

        let stored = c.stores.connections.get(&ns(), "conn").unwrap();
        assert_eq!(stored.setup["api-key"], "sk-secret");
        assert_eq!(stored.setup["organization"], "other");
    }

    #[test]
    fn referenced_pipelines_and_delete() {
        let c = controller();
        c.create(&ns(), &openai_body("conn")).unwrap();
        let pipeline = Pipeline::from_create_body(
            ns(),
            &json!({
                "id": "uses-conn",
                "recipe": {
                    "component": {
                        "ai": {
                            "type": "openai",
                            "task": "TASK_TEXT_GENERATION",
                            "setup": "${connection.conn}",
                            "input": { "prompt": "hi" }
                        }
                    }
                }
            }),
        )
        .unwrap();
        c.stores.pipelines.create(pipeline).unwrap();
        c.stores
            .pipelines
            .create(Pipeline::from_create_body(ns(), &json!({ "id": "unrelated" })).unwrap())
            .unwrap();

        let page = c
            .referenced_pipelines(&ns(), "conn", &ListQuery::default())
            .unwrap();
        assert_eq!(page.items, vec!["uses-conn".to_string()]);

        c.delete(&ns(), "conn").unwrap();
        assert_eq!(c.get(&ns(), "conn", View::Basic).unwrap_err().code(), "E202");
        assert!(c.stores.pipelines.get(&ns(), "uses-conn").is_ok());
    }
}
