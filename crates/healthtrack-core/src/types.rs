//! Identifier and enum definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::DomainError;

/// User identifier
///
/// This is the opaque subject id assigned by the external identity provider,
/// not something this system generates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Health record identifier using ULID (lexicographically sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Ulid);

impl RecordId {
    /// Generate a new RecordId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("{}: {}", s, e)))
    }
}

/// Health insight identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightId(Ulid);

impl InsightId {
    /// Generate a new InsightId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for InsightId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InsightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InsightId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("{}: {}", s, e)))
    }
}

/// The closed set of health record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthRecordType {
    BloodPressure,
    HeartRate,
    Weight,
    BloodGlucose,
    Sleep,
    Exercise,
    Temperature,
    Medication,
}

impl HealthRecordType {
    /// All variants, in declaration order
    pub const ALL: [HealthRecordType; 8] = [
        Self::BloodPressure,
        Self::HeartRate,
        Self::Weight,
        Self::BloodGlucose,
        Self::Sleep,
        Self::Exercise,
        Self::Temperature,
        Self::Medication,
    ];
}

impl fmt::Display for HealthRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BloodPressure => "BLOOD_PRESSURE",
            Self::HeartRate => "HEART_RATE",
            Self::Weight => "WEIGHT",
            Self::BloodGlucose => "BLOOD_GLUCOSE",
            Self::Sleep => "SLEEP",
            Self::Exercise => "EXERCISE",
            Self::Temperature => "TEMPERATURE",
            Self::Medication => "MEDICATION",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HealthRecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BLOOD_PRESSURE" => Ok(Self::BloodPressure),
            "HEART_RATE" => Ok(Self::HeartRate),
            "WEIGHT" => Ok(Self::Weight),
            "BLOOD_GLUCOSE" => Ok(Self::BloodGlucose),
            "SLEEP" => Ok(Self::Sleep),
            "EXERCISE" => Ok(Self::Exercise),
            "TEMPERATURE" => Ok(Self::Temperature),
            "MEDICATION" => Ok(Self::Medication),
            _ => Err(DomainError::invalid_enum("record type", s)),
        }
    }
}

/// Gender as self-reported on the user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
            Self::PreferNotToSay => "PREFER_NOT_TO_SAY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "OTHER" => Ok(Self::Other),
            "PREFER_NOT_TO_SAY" => Ok(Self::PreferNotToSay),
            _ => Err(DomainError::invalid_enum("gender", s)),
        }
    }
}

/// Role attached to a user profile, used for role-gated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Provider,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Patient
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => write!(f, "patient"),
            Self::Provider => write!(f, "provider"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "provider" => Ok(Self::Provider),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::invalid_enum("role", s)),
        }
    }
}

/// The closed set of insight kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightType {
    TrendAnalysis,
    Recommendation,
    RiskAlert,
    Achievement,
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TrendAnalysis => "TREND_ANALYSIS",
            Self::Recommendation => "RECOMMENDATION",
            Self::RiskAlert => "RISK_ALERT",
            Self::Achievement => "ACHIEVEMENT",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for InsightType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TREND_ANALYSIS" => Ok(Self::TrendAnalysis),
            "RECOMMENDATION" => Ok(Self::Recommendation),
            "RISK_ALERT" => Ok(Self::RiskAlert),
            "ACHIEVEMENT" => Ok(Self::Achievement),
            _ => Err(DomainError::invalid_enum("insight type", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_string_round_trip() {
        let id = RecordId::new();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_record_id_rejects_garbage() {
        assert!("not-a-ulid".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_type_round_trip() {
        for kind in HealthRecordType::ALL {
            let parsed: HealthRecordType = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_record_type_rejects_unknown() {
        assert!("STEPS".parse::<HealthRecordType>().is_err());
    }

    #[test]
    fn test_role_default() {
        assert_eq!(UserRole::default(), UserRole::Patient);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("provider".parse::<UserRole>().unwrap(), UserRole::Provider);
        assert!("superuser".parse::<UserRole>().is_err());
    }
}
