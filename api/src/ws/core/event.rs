use serde::Serialize;

/// A server-pushed event: its stable wire name and the topic it is published on.
pub trait Event: Serialize {
    const NAME: &'static str;
    fn topic_path(&self) -> String;
}
