//! # recordbook-shared
//!
//! Types shared by the recordbook server, store and client: the [`Record`]
//! entity as it travels over the wire, the create/update inputs and their
//! validation rules, listing queries and pages, and the JSON error body.

pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

pub use error::{ErrorBody, ErrorKind};
pub use models::*;
pub use validation::FieldError;
