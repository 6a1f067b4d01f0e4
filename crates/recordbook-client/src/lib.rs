//! # recordbook-client
//!
//! Client side of recordbook: a typed HTTP client for the record API, the
//! form + table view state with its client-side checks, the loop that keeps
//! the view fresh, and plain-text rendering for the terminal front end.

pub mod api;
pub mod console;
pub mod form;
pub mod refresh;
pub mod render;
pub mod state;

pub use api::{ApiClient, ClientError};
pub use form::{FormErrors, FormField, RecordForm};
pub use refresh::{ViewCommand, ViewHandle};
pub use state::ClientView;
