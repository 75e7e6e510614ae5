use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::Document;

/// Fields owned by the store; entity payloads may never carry them.
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Errors raised while turning request input into an entity
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("All fields are required.")]
    MissingRequiredFields(Vec<String>),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Invalid id: {0}")]
    InvalidId(String),
}

impl RecordError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RecordError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds a `MissingRequiredFields` naming the absent ones of
    /// `(name, present)` pairs.
    pub fn missing(fields: &[(&str, bool)]) -> Self {
        RecordError::MissingRequiredFields(
            fields
                .iter()
                .filter(|(_, present)| !present)
                .map(|(name, _)| name.to_string())
                .collect(),
        )
    }
}

/// Blank strings count as absent for required text fields.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Rejects a blank replacement value for a required text field.
pub fn require_text(field: &str, value: String) -> Result<String, RecordError> {
    non_blank(Some(value)).ok_or_else(|| RecordError::invalid(field, "must not be empty"))
}

pub fn parse_id(raw: &str) -> Result<Uuid, RecordError> {
    Uuid::parse_str(raw).map_err(|_| RecordError::InvalidId(raw.to_string()))
}

/// A typed entity together with the fields the store assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
    #[serde(with = "dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "dates")]
    pub updated_at: DateTime<Utc>,
}

impl<T: DeserializeOwned> Record<T> {
    pub fn from_document(document: Document) -> Result<Self, DatabaseError> {
        let data = serde_json::from_value(Value::Object(document.data))
            .map_err(|e| DatabaseError::Decode(format!("{} ({})", e, document.id)))?;
        Ok(Record {
            id: document.id,
            data,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }
}

/// Serializes an entity into the JSON object the store persists.
pub fn to_document_data<T: Serialize>(entity: &T) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(mut map)) => {
            for field in SYSTEM_FIELDS {
                map.remove(*field);
            }
            Ok(map)
        }
        Ok(other) => Err(DatabaseError::Decode(format!("entity serialized to non-object: {}", other))),
        Err(e) => Err(DatabaseError::Decode(e.to_string())),
    }
}

/// Date handling shared by every entity with a date field.
///
/// Input accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight
/// UTC). Output is always RFC 3339 in UTC.
pub mod dates {
    use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Start and end (exclusive) of the UTC calendar day containing `raw`.
    pub fn day_bounds(raw: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse(raw)?
            .date_naive()
            .and_hms_opt(0, 0, 0)?
            .and_utc();
        Some((start, start + Duration::days(1)))
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw)))
    }

    /// For optional input fields: absent or null stays `None`.
    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw))),
            }
        }
    }
}
