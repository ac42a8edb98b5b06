//! Runs one `POST /graphql` request: parse, pick the operation, resolve root fields in
//! document order, project each result through its selection.

use axum::http::StatusCode;
use forward::document::{OperationDefinition, OperationKind};
use serde_json::{Map, Value};
use util::state::AppState;

use super::projection::Projector;
use super::request::{GraphQlError, GraphQlRequest, GraphQlResponse};
use super::resolvers::Resolver;
use super::schema::{RootField, Schema};
use crate::auth::Staff;

pub async fn execute(
    state: &AppState,
    schema: &Schema,
    staff: &Staff,
    request: GraphQlRequest,
) -> (StatusCode, GraphQlResponse) {
    let document = match forward::parse(&request.query) {
        Ok(document) => document,
        Err(e) => return bad_request(e.to_string()),
    };

    let Some(operation) = document.operation(request.operation_name.as_deref()) else {
        return bad_request(match &request.operation_name {
            Some(name) => format!("Unknown operation named \"{name}\"."),
            None if document.operations().next().is_none() => {
                "Document does not contain an operation.".to_string()
            }
            None => "Must provide operation name if query contains multiple operations.".to_string(),
        });
    };

    if operation.kind == OperationKind::Subscription {
        return bad_request("Subscriptions are served over the /ws/tag_change websocket.");
    }

    let variables = coalesce_variables(operation, request.variables.unwrap_or_default());
    let mut projector = Projector::new(&document, &variables);
    let root_type = operation.kind.root_type();

    let groups = projector.collect_fields(&[&operation.selection_set], Some(root_type));
    let mut plan = Vec::with_capacity(groups.len());
    for (key, fields) in groups {
        let name = fields[0].name.as_str();
        match RootField::lookup(operation.kind, name) {
            Some(root) => plan.push((key, root, fields)),
            None => {
                return bad_request(format!("Cannot query field \"{name}\" on type \"{root_type}\"."));
            }
        }
    }

    let resolver = Resolver {
        state,
        schema,
        staff,
        source: &request.query,
        document: &document,
        operation,
        variables: &variables,
    };

    // Mutations must run one after another; queries do too, which keeps errors in order.
    let mut data = Map::new();
    for (key, root, fields) in plan {
        let mut path = vec![Value::from(key.as_str())];
        let value = match resolver.resolve(root, &fields).await {
            Ok(node) => projector.project(&node, &fields, &mut path),
            Err(e) => {
                tracing::warn!(field = %key, staff = %staff.0, error = %e, "GraphQL field failed");
                projector.push_error(GraphQlError::at(e.to_string(), &path));
                Value::Null
            }
        };
        data.insert(key, value);
    }

    (
        StatusCode::OK,
        GraphQlResponse {
            data: Some(Value::Object(data)),
            errors: projector.into_errors(),
        },
    )
}

fn bad_request(message: impl Into<String>) -> (StatusCode, GraphQlResponse) {
    (
        StatusCode::BAD_REQUEST,
        GraphQlResponse::rejected(GraphQlError::new(message)),
    )
}

/// Client variables plus the operation's declared defaults for any that were not sent.
fn coalesce_variables(operation: &OperationDefinition, mut provided: Map<String, Value>) -> Map<String, Value> {
    for definition in &operation.variables {
        if provided.contains_key(&definition.name) {
            continue;
        }
        if let Some(default) = &definition.default_value {
            let value = default.to_json(&Map::new());
            provided.insert(definition.name.clone(), value);
        }
    }
    provided
}
