use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Returns true if the GraphQL endpoint at `url` answers a `{ __typename }` probe.
///
/// Any response below 500 counts as alive, since an endpoint that rejects the
/// credential-less probe with 400/401/405 is still up. `timeout_secs` caps the request.
pub async fn is_graphql_alive(url: &str, timeout_secs: u64) -> Result<bool, reqwest::Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    let resp = client
        .post(url)
        .json(&serde_json::json!({ "query": "{ __typename }" }))
        .send()
        .await?;

    let code = resp.status();
    Ok(code < StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn client_errors_still_count_as_alive() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        assert!(is_graphql_alive(&server.uri(), 2).await.unwrap());
    }

    #[tokio::test]
    async fn server_errors_are_down() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        assert!(!is_graphql_alive(&server.uri(), 2).await.unwrap());
    }
}
