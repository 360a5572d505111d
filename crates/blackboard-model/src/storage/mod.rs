//! Protocol documents and submission persistence
//!
//! - [`json`]: load and save protocol schemas as JSON documents
//! - [`repository`]: the persistence contract for protocols, centers and
//!   submissions, with an in-memory implementation

pub mod json;
pub mod repository;

pub use repository::{Center, InMemoryRepository, ProtocolRecord, Repository, StoredValue, Submission};
