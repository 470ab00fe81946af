//! # hivesync-client
//!
//! Client for the remote presence API. Exposes the [`api::PresenceApi`]
//! trait consumed by the engine and an HTTP implementation over `reqwest`.
//!
//! Authentication is a bearer credential attached per call; acquiring the
//! credential is the host application's concern, surfaced here only as the
//! [`token::TokenProvider`] seam.

pub mod api;
pub mod http;
pub mod token;

pub use api::PresenceApi;
pub use http::HttpPresenceApi;
pub use token::{StaticTokenProvider, TokenProvider};
