//! Glue that turns one resolver invocation into an upstream call and back.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::{Upstream, UpstreamClient, unwrap_root};
use crate::document::{Document, Field, OperationDefinition};
use crate::error::ForwardError;
use crate::reshape::reshape;
use crate::stitcher::stitch;

/// How one local field delegates to the registration service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardSpec {
    /// Dotted path from the local field to the subtree the upstream answers, e.g.
    /// `user.user`. `None` forwards the field as-is.
    pub path: Option<String>,
    /// Fields always requested from the upstream, whether or not the client asked.
    pub include: Vec<String>,
    /// Literal replacement for the field call sent upstream.
    pub head: Option<String>,
}

impl ForwardSpec {
    pub fn new(path: Option<&str>, include: &[&str]) -> Self {
        Self {
            path: path.map(str::to_string),
            include: include.iter().map(|s| s.to_string()).collect(),
            head: None,
        }
    }

    /// Copy of this spec that sends `head` instead of the client's own field call.
    pub fn with_head(&self, head: impl Into<String>) -> Self {
        Self {
            head: Some(head.into()),
            ..self.clone()
        }
    }
}

/// Everything about the current field invocation the forwarder needs to see.
#[derive(Debug, Clone, Copy)]
pub struct ForwardRequest<'a> {
    pub source: &'a str,
    pub document: &'a Document,
    pub operation: &'a OperationDefinition,
    pub field_nodes: &'a [&'a Field],
    pub variables: &'a Map<String, Value>,
}

#[derive(Clone)]
pub struct Forwarder {
    upstream: Arc<dyn Upstream>,
}

impl Forwarder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    /// Forwarder backed by the HTTP client.
    pub fn http(endpoint: &str, key: &str) -> Self {
        Self::new(Arc::new(UpstreamClient::new(endpoint, key)))
    }

    /// Resolves the requested subtree upstream and reshapes it to the local path.
    ///
    /// `Ok(None)` means there was nothing to forward and no call was made.
    pub async fn forward(
        &self,
        spec: &ForwardSpec,
        request: &ForwardRequest<'_>,
    ) -> Result<Option<Value>, ForwardError> {
        let Some(stitched) = stitch(
            request.source,
            request.document,
            request.operation,
            request.field_nodes,
            spec,
        )?
        else {
            tracing::debug!(path = ?spec.path, "No field node to forward");
            return Ok(None);
        };

        let bindings: Map<String, Value> = stitched
            .variables
            .iter()
            .filter_map(|name| {
                request
                    .variables
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();

        tracing::debug!(query = %stitched.query, "Forwarding query upstream");

        let data = self
            .upstream
            .execute(&stitched.query, bindings)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, path = ?spec.path, "Upstream call failed"))?;

        Ok(Some(reshape(unwrap_root(data), spec.path.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::root_fields;
    use crate::parser::parse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every call and answers with a fixed `data` object.
    struct Recorder {
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
        data: Value,
    }

    #[async_trait]
    impl Upstream for Recorder {
        async fn execute(
            &self,
            query: &str,
            variables: Map<String, Value>,
        ) -> Result<Value, ForwardError> {
            self.calls.lock().unwrap().push((query.to_string(), variables));
            Ok(self.data.clone())
        }
    }

    fn recorder(data: Value) -> Arc<Recorder> {
        Arc::new(Recorder {
            calls: Mutex::new(Vec::new()),
            data,
        })
    }

    #[tokio::test]
    async fn forwards_and_reshapes_with_only_declared_bindings() {
        let src = r#"
            query ($id: ID!, $other: Int) { user(id: $id) { user { name } tags { checked_in } } }
        "#;
        let doc = parse(src).unwrap();
        let op = doc.operation(None).unwrap();
        let nodes = root_fields(op);
        let variables = json!({ "id": "u1", "other": 3 }).as_object().cloned().unwrap();

        let upstream = recorder(json!({ "user": { "id": "u1", "name": "Ada" } }));
        let forwarder = Forwarder::new(upstream.clone());
        let spec = ForwardSpec::new(Some("user.user"), &["id"]);
        let request = ForwardRequest {
            source: src,
            document: &doc,
            operation: op,
            field_nodes: &nodes,
            variables: &variables,
        };

        let value = forwarder.forward(&spec, &request).await.unwrap();
        assert_eq!(value, Some(json!({ "user": { "id": "u1", "name": "Ada" } })));

        let calls = upstream.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "query($id: ID!) { user(id: $id) { id name } }");
        assert_eq!(Value::Object(calls[0].1.clone()), json!({ "id": "u1" }));
    }

    #[tokio::test]
    async fn no_target_means_no_call() {
        let src = "{ tags { name } }";
        let doc = parse(src).unwrap();
        let op = doc.operation(None).unwrap();
        let variables = Map::new();
        let upstream = recorder(json!({}));
        let forwarder = Forwarder::new(upstream.clone());
        let request = ForwardRequest {
            source: src,
            document: &doc,
            operation: op,
            field_nodes: &[],
            variables: &variables,
        };

        let spec = ForwardSpec::new(Some("user.user"), &["id"]);
        assert_eq!(forwarder.forward(&spec, &request).await.unwrap(), None);
        assert!(upstream.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn with_head_keeps_path_and_include() {
        let base = ForwardSpec::new(Some("check_in.user"), &["id", "name", "email"]);
        let derived = base.with_head("user(id: \"1\")");
        assert_eq!(derived.path, base.path);
        assert_eq!(derived.include, base.include);
        assert_eq!(derived.head.as_deref(), Some("user(id: \"1\")"));
        assert!(base.head.is_none());
    }
}
