use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /graphql`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default, rename = "operationName")]
    pub operation_name: Option<String>,
}

/// Location of an error in the response: field keys and list indices.
pub type ResponsePath = Vec<Value>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphQlError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: ResponsePath,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn at(message: impl Into<String>, path: &[Value]) -> Self {
        Self {
            message: message.into(),
            path: path.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlResponse {
    /// Absent when the request failed before execution started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl GraphQlResponse {
    pub fn rejected(error: GraphQlError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }
}
