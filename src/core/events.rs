//! Window-level custom events shared between UI parts.
//!
//! Details travel as JSON strings in `CustomEvent.detail`.

use serde::{Deserialize, Serialize};

use super::schema::SchemaState;

pub const TABLE_SELECTED: &str = "table-selected";
pub const COLUMN_SELECTED: &str = "column-selected";
pub const CLOUD_LOAD: &str = "cloud-load";
pub const CLOUD_LOGOUT: &str = "cloud-logout";

/// Event with a typed JSON detail
pub trait AppEvent: Serialize + for<'de> Deserialize<'de> {
    const NAME: &'static str;

    fn to_detail(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn from_detail(detail: &str) -> Option<Self> {
        serde_json::from_str(detail).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSelected {
    pub table_id: String,
}

impl AppEvent for TableSelected {
    const NAME: &'static str = TABLE_SELECTED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSelected {
    pub table_id: String,
    pub column_id: String,
}

impl AppEvent for ColumnSelected {
    const NAME: &'static str = COLUMN_SELECTED;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLoad {
    pub state: SchemaState,
}

impl AppEvent for CloudLoad {
    const NAME: &'static str = CLOUD_LOAD;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CloudLogout {}

impl AppEvent for CloudLogout {
    const NAME: &'static str = CLOUD_LOGOUT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_selected_detail_shape() {
        let event = ColumnSelected {
            table_id: "t1".into(),
            column_id: "c1".into(),
        };
        assert_eq!(event.to_detail(), r#"{"tableId":"t1","columnId":"c1"}"#);
        assert_eq!(ColumnSelected::from_detail(&event.to_detail()), Some(event));
    }

    #[test]
    fn test_cloud_load_carries_state() {
        let detail = r#"{"state":{"tables":[]}}"#;
        let event = CloudLoad::from_detail(detail).unwrap();
        assert!(event.state.is_empty());
    }

    #[test]
    fn test_malformed_detail_is_ignored() {
        assert!(TableSelected::from_detail("not json").is_none());
    }
}
