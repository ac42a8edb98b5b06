use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use util::state::AppState;

use super::executor::execute;
use super::request::{GraphQlRequest, GraphQlResponse};
use super::schema::Schema;
use crate::auth::Staff;

/// POST /graphql
///
/// ### Request Body
/// ```json
/// {
///   "query": "mutation ($id: ID!) { check_in(user: $id, tag: \"hackgt\") { user { name } tags { checked_in } } }",
///   "variables": { "id": "5d9d..." },
///   "operationName": null
/// }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ "data": {...}, "errors": [...] }`; failed fields are `null` and
///   listed in `errors` with their path
/// - `400 Bad Request` with `errors` only when the document cannot be parsed or no
///   operation can be selected
/// - `401 Unauthorized` without the admin key
pub async fn graphql_handler(
    State(state): State<AppState>,
    Extension(schema): Extension<Arc<Schema>>,
    staff: Staff,
    Json(request): Json<GraphQlRequest>,
) -> (StatusCode, Json<GraphQlResponse>) {
    let (status, response) = execute(&state, &schema, &staff, request).await;
    (status, Json(response))
}
