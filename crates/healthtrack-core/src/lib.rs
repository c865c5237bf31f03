//! Core domain types for the HealthTrack backend
//!
//! This crate defines the domain model shared by every layer: identifiers,
//! the closed enum sets for record types, genders, roles, and insight types,
//! and the entities held in the document store (user profiles, health
//! records, health insights).

pub mod error;
pub mod insight;
pub mod record;
pub mod types;
pub mod user;

pub use error::DomainError;
pub use insight::{HealthInsight, HealthSummary, TrendData};
pub use record::{HealthRecord, HealthRecordDraft};
pub use types::{Gender, HealthRecordType, InsightId, InsightType, RecordId, UserId, UserRole};
pub use user::{ProfileUpdate, UserProfile};
