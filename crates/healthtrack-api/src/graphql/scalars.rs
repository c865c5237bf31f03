//! Custom scalar types
//!
//! Timestamps travel as RFC 3339 strings, calendar dates as `YYYY-MM-DD`.

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use chrono::{DateTime, NaiveDate, Utc};

/// RFC 3339 timestamp scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GqlDateTime(pub DateTime<Utc>);

#[Scalar(name = "DateTime")]
impl ScalarType for GqlDateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| GqlDateTime(dt.with_timezone(&Utc)))
                .map_err(|e| InputValueError::custom(format!("invalid timestamp: {e}"))),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

/// Calendar date scalar without a time component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GqlDate(pub NaiveDate);

#[Scalar(name = "Date")]
impl ScalarType for GqlDate {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(GqlDate)
                .map_err(|e| InputValueError::custom(format!("invalid date: {e}"))),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.format("%Y-%m-%d").to_string())
    }
}
