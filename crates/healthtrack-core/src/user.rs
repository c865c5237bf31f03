//! User profile entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Gender, UserId, UserRole};

/// A user profile document
///
/// Profiles are created lazily on first authenticated access and are never
/// hard-deleted by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity-provider subject id
    pub id: UserId,

    /// Email as reported by the identity provider
    pub email: String,

    /// Full display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Date of birth (calendar date, no time component)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    /// Self-reported gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    /// Height in centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<i32>,

    /// Role used by role-gated operations
    #[serde(default)]
    pub role: UserRole,

    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,

    /// Set on every successful profile update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Build the minimal profile written on first authenticated access
    pub fn minimal(id: UserId, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            date_of_birth: None,
            gender: None,
            height_cm: None,
            role: UserRole::default(),
            created_at: now,
            updated_at: None,
        }
    }

    /// Apply a partial update, leaving unspecified fields untouched
    ///
    /// `updated_at` is bumped unconditionally; callers only invoke this on a
    /// successful update path.
    pub fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(full_name) = update.full_name {
            self.full_name = Some(full_name);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(height_cm) = update.height_cm {
            self.height_cm = Some(height_cm);
        }
        self.updated_at = Some(now);
    }
}

/// Partial profile update; `None` means "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<i32>,
}
