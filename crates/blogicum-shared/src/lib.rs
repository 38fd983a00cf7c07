//! # Blogicum Shared
//!
//! Form payloads and response bodies used by the web layer.

pub mod forms;
pub mod response;

pub use forms::FieldErrors;
pub use response::{ErrorResponse, HealthResponse};
