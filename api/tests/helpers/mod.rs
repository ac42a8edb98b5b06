#![allow(dead_code)]

pub mod app;
pub mod upstream;
pub mod ws;

#[allow(unused_imports)]
pub use app::{ADMIN_KEY, TestApp, auth_header, credentials, make_test_app};
#[allow(unused_imports)]
pub use upstream::StubUpstream;
#[allow(unused_imports)]
pub use ws::{connect_ws, spawn_server};
