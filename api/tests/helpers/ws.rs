use api::app;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::client::IntoClientRequest,
};
use url::Url;
use util::state::AppState;

/// Spawns the app over `state` on a random local port.
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = app(state).into_make_service_with_connect_info::<SocketAddr>();

    tokio::spawn(async move {
        axum::serve(listener, service).await.unwrap();
    });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    addr
}

/// Connects to `/ws/{topic}`, passing the Basic credentials as the `auth` query parameter.
pub async fn connect_ws(
    addr: &SocketAddr,
    topic: &str,
    credentials: &str,
) -> Result<
    (
        WebSocketStream<MaybeTlsStream<TcpStream>>,
        axum::http::Response<Option<Vec<u8>>>,
    ),
    tokio_tungstenite::tungstenite::Error,
> {
    let mut url = Url::parse(&format!("ws://{addr}/ws/{topic}")).unwrap();
    url.query_pairs_mut().append_pair("auth", credentials);

    let req = url.to_string().into_client_request().unwrap();
    connect_async(req).await
}
