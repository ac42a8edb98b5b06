use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagChangeIncoming {
    /// Keepalive from the client. Only reaches the handler when the framework's
    /// app-level ping handling is turned off.
    Ping,
}
