//! Use cases composed from the ports.

mod blog;

pub use blog::{BlogService, PostFormChoices};
