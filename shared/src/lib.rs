//! Identity Service Shared Library
//!
//! Domain types, error taxonomy and request validation shared between the
//! backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Principal, Role, User};
pub use types::*;
