//! HTTP surface over the engine.
//!
//! Request/response schemas in [`protocol`], axum routing and error
//! translation in [`routes`]. Everything here is presentation: the engine's
//! scoring contract does not change based on who is asking.

pub mod protocol;
pub mod routes;

pub use routes::{create_router, AppState};
