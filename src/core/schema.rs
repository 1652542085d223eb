use serde::{Deserialize, Serialize};

/// Full designer state: tables in canvas order plus the connector lines
/// between their columns.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SchemaState {
    pub tables: Vec<Table>,
    /// Blobs saved before relationships existed have no such field
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl SchemaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Table on the canvas
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    /// Canvas position, stored as `posX` / `posY`
    pub pos_x: f64,
    pub pos_y: f64,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pos_x: 0.0,
            pos_y: 0.0,
            columns: Vec::new(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.pos_x = x;
        self.pos_y = y;
        self
    }

    pub fn add_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn position(&self) -> (f64, f64) {
        (self.pos_x, self.pos_y)
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }
}

/// Table column
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Column {
    pub id: String,
    pub name: String,
    /// Declared SQL type, kept verbatim as typed by the user
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub pk: bool,
    #[serde(default)]
    pub fk: bool,
}

impl Column {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type: data_type.into(),
            pk: false,
            fk: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.pk = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.fk = true;
        self
    }
}

/// Connector line between two columns
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl Relationship {
    pub fn touches_column(&self, column_id: &str) -> bool {
        self.source_column == column_id || self.target_column == column_id
    }

    pub fn touches_table(&self, table_id: &str) -> bool {
        self.source_table == table_id || self.target_table == table_id
    }
}

/// Reference to a column inside a table
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    pub table_id: String,
    pub column_id: String,
}

impl ColumnRef {
    pub fn new(table_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column_id: column_id.into(),
        }
    }
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Demo schema shown from the empty canvas
pub fn create_demo_state() -> SchemaState {
    let users = Table::new("tbl_users", "users")
        .with_position(100.0, 100.0)
        .add_column(Column::new("col_users_id", "id", "INT").primary_key())
        .add_column(Column::new("col_users_username", "username", "VARCHAR(255)"))
        .add_column(Column::new("col_users_email", "email", "VARCHAR(255)"));

    let posts = Table::new("tbl_posts", "posts")
        .with_position(450.0, 140.0)
        .add_column(Column::new("col_posts_id", "id", "INT").primary_key())
        .add_column(Column::new("col_posts_user_id", "user_id", "INT").foreign_key())
        .add_column(Column::new("col_posts_title", "title", "VARCHAR(255)"))
        .add_column(Column::new("col_posts_body", "body", "TEXT"));

    SchemaState {
        tables: vec![users, posts],
        relationships: vec![Relationship {
            id: "rel_posts_users".to_string(),
            source_table: "tbl_posts".to_string(),
            source_column: "col_posts_user_id".to_string(),
            target_table: "tbl_users".to_string(),
            target_column: "col_users_id".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_serializes_camel_case_positions() {
        let table = Table::new("t1", "users").with_position(10.0, 20.5);
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["posX"], 10.0);
        assert_eq!(json["posY"], 20.5);
        assert!(json.get("pos_x").is_none());
    }

    #[test]
    fn test_column_type_field_name() {
        let column = Column::new("c1", "id", "INT").primary_key();
        let json = serde_json::to_value(&column).unwrap();

        assert_eq!(json["type"], "INT");
        assert_eq!(json["pk"], true);
        assert_eq!(json["fk"], false);
    }

    #[test]
    fn test_state_without_relationships_field() {
        let blob = r#"{"tables":[{"id":"t1","name":"users","posX":1,"posY":2,"columns":[
            {"id":"c1","name":"id","type":"INT","pk":true,"fk":false}]}]}"#;
        let state: SchemaState = serde_json::from_str(blob).unwrap();

        assert_eq!(state.tables.len(), 1);
        assert!(state.relationships.is_empty());
        assert!(state.tables[0].columns[0].pk);
    }

    #[test]
    fn test_new_id_prefix_and_uniqueness() {
        let a = new_id("tbl");
        let b = new_id("tbl");
        assert!(a.starts_with("tbl_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_demo_state_is_consistent() {
        let state = create_demo_state();
        for rel in &state.relationships {
            let source = state.tables.iter().find(|t| t.id == rel.source_table).unwrap();
            assert!(source.columns.iter().any(|c| c.id == rel.source_column));
            let target = state.tables.iter().find(|t| t.id == rel.target_table).unwrap();
            assert!(target.columns.iter().any(|c| c.id == rel.target_column));
        }
    }
}
