//! Query forwarding to the registration service.
//!
//! A client query arrives at the local endpoint; for fields whose data lives upstream,
//! the relevant slice of the client's document is cut out ([`analyzer`]), stitched into a
//! standalone query ([`stitcher`]), sent upstream ([`client`]) and re-nested under the
//! local path ([`reshape`]). [`Forwarder`] runs the whole pipeline.

pub mod analyzer;
pub mod client;
pub mod document;
pub mod error;
pub mod forwarder;
pub mod parser;
pub mod reshape;
pub mod stitcher;

pub use client::{Upstream, UpstreamClient};
pub use error::{ForwardError, ParseError};
pub use forwarder::{ForwardRequest, ForwardSpec, Forwarder};
pub use parser::parse;
pub use stitcher::included_field;
