//! Zidian Server
//!
//! HTTP API over [`zidian_core`]: the due-card queue, review updates and the
//! dictionary. The `zidian` binary wraps it with a CLI.

pub mod api;
pub mod config;
pub mod state;

pub use api::{build_router, serve, ApiError};
pub use config::{ConfigError, ServerConfig};
pub use state::AppState;
