//! Ilmquest API crate - axum HTTP boundary for the chat pipeline.
//!
//! Validates inbound requests, hands them to the `ChatService`, and maps
//! failures onto JSON error bodies.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
