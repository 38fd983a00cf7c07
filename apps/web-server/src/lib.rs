//! # Blogicum web server
//!
//! Server-rendered pages of the blog on Actix-web and Askama. The binary in
//! `main.rs` wires these modules together; tests build the same `App` on
//! in-memory storage.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
pub mod urls;
pub mod views;
