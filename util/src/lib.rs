pub mod config;
pub mod http;
pub mod keyed_lock;
pub mod state;
pub mod ws;
