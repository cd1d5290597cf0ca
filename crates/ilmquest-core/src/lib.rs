pub mod config;
pub mod error;
pub mod types;

pub use config::IlmquestConfig;
pub use error::{IlmquestError, Result};
pub use types::*;
