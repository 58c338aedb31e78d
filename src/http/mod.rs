//! Request and response values exchanged with the host
//!
//! The crate does not run an HTTP server; the host translates its own
//! requests into [`Request`] values and renders the returned [`Response`].

pub mod request;
pub mod response;

pub use request::{Method, Request};
pub use response::Response;
