//! # recordbook-server
//!
//! HTTP JSON API over the recordbook record store.
//!
//! This crate provides:
//! - **REST API** (axum) for creating, listing/searching, fetching, updating,
//!   deleting and counting records
//! - **Error mapping** from store failures to status codes and a JSON error
//!   body the client can classify
//! - **Configuration** loaded once from the environment

pub mod api;
pub mod config;
pub mod error;
pub mod records;

pub use api::{build_router, serve, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
pub use records::RecordService;
