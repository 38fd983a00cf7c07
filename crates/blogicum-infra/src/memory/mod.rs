//! In-memory storage - used when `DATABASE_URL` is not set, and in tests.

mod store;

pub use store::InMemoryStore;
