//! Rows of the hosted `bdd_users` and `projects` tables

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::CloudError;
use crate::core::SchemaState;

/// Ids come back as text or numbers depending on the column type
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// `bdd_users` row, also the persisted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Full `projects` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub user_id: String,
    pub name: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectRecord {
    /// Decodes the stored schema blob
    pub fn schema(&self) -> Result<SchemaState, CloudError> {
        serde_json::from_value(self.data.clone()).map_err(|e| CloudError::Decode(e.to_string()))
    }
}

/// Project metadata used by the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectSummary {
    /// Last modification, falling back to creation time
    pub fn touched_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Date shown in the project list, in the browser's time zone
    pub fn display_date(&self) -> String {
        self.display_date_in(&Local)
    }

    pub fn display_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        self.touched_at()
            .map(|t| t.with_timezone(tz).format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl From<&ProjectRecord> for ProjectSummary {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Upsert payload, unique on `(user_id, name)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectUpsert {
    pub user_id: String,
    pub name: String,
    pub data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// New `bdd_users` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_numeric_ids_become_strings() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id": 42, "username": "bob", "password": "pw"}"#).unwrap();
        assert_eq!(user.id, "42");
    }

    #[test]
    fn test_project_record_from_postgrest_row() {
        let row = r#"{
            "id": "7d0c4f0e-4e6b-4a53-9f0e-1b6f7d3c2a10",
            "user_id": 3,
            "name": "My Database",
            "data": {"tables": []},
            "created_at": "2025-01-02T10:00:00.123456+00:00",
            "updated_at": "2025-01-03T11:30:00+00:00"
        }"#;
        let record: ProjectRecord = serde_json::from_str(row).unwrap();

        assert_eq!(record.user_id, "3");
        assert!(record.schema().unwrap().is_empty());
        assert_eq!(
            record.updated_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 3, 11, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_bad_blob_is_decode_error() {
        let record = ProjectRecord {
            id: "p".into(),
            user_id: "u".into(),
            name: "x".into(),
            data: serde_json::json!({"tables": 5}),
            created_at: None,
            updated_at: None,
        };
        assert!(matches!(record.schema(), Err(CloudError::Decode(_))));
    }

    #[test]
    fn test_display_date_falls_back_to_created_at() {
        let summary = ProjectSummary {
            id: "p".into(),
            name: "x".into(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap()),
            updated_at: None,
        };
        assert_eq!(summary.display_date_in(&Utc), "2024-05-06");
    }

    #[test]
    fn test_display_date_uses_local_offset() {
        let summary = ProjectSummary {
            id: "p".into(),
            name: "x".into(),
            created_at: None,
            updated_at: Some(Utc.with_ymd_and_hms(2024, 12, 31, 22, 30, 0).unwrap()),
        };
        let almaty = FixedOffset::east_opt(5 * 3600).unwrap();
        let honolulu = FixedOffset::west_opt(10 * 3600).unwrap();

        assert_eq!(summary.display_date_in(&Utc), "2024-12-31");
        assert_eq!(summary.display_date_in(&almaty), "2025-01-01");
        assert_eq!(summary.display_date_in(&honolulu), "2024-12-31");
        assert_eq!(
            summary.display_date(),
            summary.display_date_in(&chrono::Local)
        );
        assert!(ProjectSummary { updated_at: None, ..summary }.display_date().is_empty());
    }
}
