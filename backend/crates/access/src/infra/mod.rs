//! Infrastructure Layer
//!
//! Document store clients and the implementations of the domain ports.

pub mod document;
pub mod identity;
pub mod memory;
pub mod postgres;

pub use document::{DocumentRepository, DocumentStore};
pub use identity::DocumentIdentityProvider;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
