//! # Blogicum Core
//!
//! The domain layer of the blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the post visibility rules, pagination and the ports that
//! infrastructure has to implement.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod visibility;

pub use error::{DomainError, MutationError};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
pub use services::BlogService;
pub use visibility::{Denied, PostFilter, Viewer};
