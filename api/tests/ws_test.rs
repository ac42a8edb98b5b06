mod helpers;

#[cfg(test)]
mod tests {
    use crate::helpers::{StubUpstream, connect_ws, credentials, make_test_app, spawn_server};
    use futures::{SinkExt, Stream, StreamExt};
    use serde_json::{Value, json};
    use serial_test::serial;
    use services::tags::{NewTag, TagService};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message;

    async fn next_json<S>(socket: &mut S) -> Value
    where
        S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            let frame = timeout(Duration::from_secs(2), socket.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("socket closed")
                .expect("socket error");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    #[serial]
    async fn subscriber_receives_ready_pong_and_tag_change() {
        let app = make_test_app(StubUpstream::answering(json!({
            "user": { "id": "u7", "name": "Grace Hopper", "email": "grace@example.com" }
        })))
        .await;
        TagService::add(app.state.db(), NewTag::named("hackgt")).await.unwrap();
        let addr = spawn_server(app.state.clone()).await;

        let (mut socket, _) = connect_ws(&addr, "tag_change", &credentials("door"))
            .await
            .expect("connect");

        let ready = next_json(&mut socket).await;
        assert_eq!(ready["event"], "ready");
        assert_eq!(ready["payload"]["staff"], "door");

        socket
            .send(Message::Text(json!({ "type": "ping" }).to_string().into()))
            .await
            .unwrap();
        let pong = next_json(&mut socket).await;
        assert_eq!(pong["event"], "pong");

        let (_, result) = app
            .graphql(
                "scanner",
                json!({ "query": "mutation { check_in(user: \"u7\", tag: \"hackgt\") { user { name } } }" }),
            )
            .await;
        assert_eq!(result["data"]["check_in"]["user"]["name"], "Grace Hopper");

        let change = next_json(&mut socket).await;
        assert_eq!(change["type"], "event");
        assert_eq!(change["event"], "tag_change");
        assert_eq!(change["payload"]["tag"], "hackgt");
        assert_eq!(change["payload"]["user"]["email"], "grace@example.com");
        assert_eq!(change["payload"]["tags"][0]["checked_in_by"], "scanner");
        assert_eq!(change["payload"]["tags"][0]["checkin_success"], true);
    }

    #[tokio::test]
    #[serial]
    async fn subscription_without_admin_key_is_refused() {
        let app = make_test_app(StubUpstream::answering(json!({}))).await;
        let addr = spawn_server(app.state.clone()).await;

        let bad = base64_of("door:wrong");
        assert!(connect_ws(&addr, "tag_change", &bad).await.is_err());
    }

    fn base64_of(raw: &str) -> String {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.encode(raw)
    }
}
