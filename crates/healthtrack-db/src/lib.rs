//! Document-store layer for HealthTrack
//!
//! This crate abstracts the external document store behind the [`HealthStore`]
//! trait. Every operation is scoped to one user's collection path
//! (`users/{uid}/healthRecords`, `users/{uid}/insights`); ownership is a
//! property of the path, not of a filter on a global collection.
//!
//! Two implementations are provided:
//!
//! - [`FirestoreStore`]: talks to the Firestore REST API
//! - [`MemoryStore`]: in-process map with an operation counter, for tests

pub mod error;
pub mod firestore;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use store::{HealthStore, RecordQuery};
