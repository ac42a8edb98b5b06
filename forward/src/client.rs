//! HTTP client for the registration service.
//!
//! One POST per forwarded field, authenticated with the shared registration key. The call
//! is neither retried nor timed out.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ForwardError;

/// Something that can execute a query document against the registration service.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Runs `query` with `variables` and returns the response's `data` object.
    async fn execute(&self, query: &str, variables: Map<String, Value>)
    -> Result<Value, ForwardError>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Map<String, Value>,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// `reqwest`-backed [`Upstream`].
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoint: String,
    authorization: String,
}

impl UpstreamClient {
    pub fn new(endpoint: impl Into<String>, key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            authorization: basic_authorization(key),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `Basic <base64(key)>`.
pub fn basic_authorization(key: &str) -> String {
    format!("Basic {}", Base64.encode(key))
}

#[async_trait]
impl Upstream for UpstreamClient {
    async fn execute(
        &self,
        query: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, ForwardError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.authorization)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let envelope = match serde_json::from_str::<GraphQlResponse>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ForwardError::MalformedResponse(format!(
                    "error decoding response body: {e}. Full response: {body}"
                )));
            }
            Err(_) => {
                return Err(ForwardError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ForwardError::Upstream(messages.join("; ")));
        }

        match envelope.data {
            Some(data) if !data.is_null() => Ok(data),
            _ if !status.is_success() => Err(ForwardError::Status {
                status: status.as_u16(),
                body,
            }),
            _ => Err(ForwardError::MalformedResponse(
                "response has neither data nor errors".to_string(),
            )),
        }
    }
}

/// Value of the single top-level field in a `data` object, `null` when there is none.
pub fn unwrap_root(data: Value) -> Value {
    match data {
        Value::Object(map) => map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(format!("{}/graphql", server.uri()), "secret")
    }

    #[tokio::test]
    async fn sends_query_with_basic_auth_and_returns_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Basic c2VjcmV0"))
            .and(body_json(json!({
                "query": "query($id: ID!) { user(id: $id) { id } }",
                "variables": { "id": "u1" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "user": { "id": "u1" } } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut vars = Map::new();
        vars.insert("id".into(), json!("u1"));
        let data = client_for(&server)
            .await
            .execute("query($id: ID!) { user(id: $id) { id } }", vars)
            .await
            .unwrap();
        assert_eq!(unwrap_root(data), json!({ "id": "u1" }));
    }

    #[tokio::test]
    async fn errors_array_is_a_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "User not found" }, { "message": "Denied" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute("{ user(id: \"x\") { id } }", Map::new())
            .await
            .unwrap_err();
        match err {
            ForwardError::Upstream(msg) => assert_eq!(msg, "User not found; Denied"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute("{ question_branches }", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Status { status: 502, ref body } if body == "bad gateway"));
    }

    #[tokio::test]
    async fn missing_data_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute("{ question_branches }", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = UpstreamClient::new("http://127.0.0.1:9/graphql", "secret");
        let err = client
            .execute("{ question_branches }", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::Transport(_)));
    }

    #[test]
    fn unwrap_root_takes_single_field() {
        assert_eq!(unwrap_root(json!({ "question_branches": ["a"] })), json!(["a"]));
        assert_eq!(unwrap_root(json!({})), Value::Null);
        assert_eq!(unwrap_root(Value::Null), Value::Null);
    }
}
