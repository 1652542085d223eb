//! Mutation operations over [`SchemaState`].
//!
//! The UI keeps the state in an `RwSignal<SchemaState>`; every operation here
//! runs inside `state.update(..)`, so the signal is what notifies subscribers.

use super::schema::{Column, ColumnRef, Relationship, SchemaState, Table, new_id};

/// Store error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Relationship '{0}' not found")]
    RelationshipNotFound(String),

    #[error("A column cannot be connected to itself")]
    SelfConnection,

    #[error("These columns are already connected")]
    DuplicateConnection,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Partial table update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePatch {
    pub name: Option<String>,
    pub position: Option<(f64, f64)>,
    pub columns: Option<Vec<Column>>,
}

/// Partial column update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub pk: Option<bool>,
    pub fk: Option<bool>,
}

impl ColumnPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn data_type(data_type: impl Into<String>) -> Self {
        Self {
            data_type: Some(data_type.into()),
            ..Default::default()
        }
    }
}

pub const DEFAULT_COLUMN_TYPE: &str = "VARCHAR(255)";

/// Schema editing operations
pub trait SchemaOps {
    fn find_table(&self, table_id: &str) -> Option<&Table>;
    fn find_column(&self, table_id: &str, column_id: &str) -> Option<&Column>;

    fn add_table(&mut self, position: (f64, f64)) -> String;
    fn update_table(&mut self, table_id: &str, patch: TablePatch) -> StoreResult<()>;
    fn rename_table(&mut self, table_id: &str, name: &str) -> StoreResult<()>;
    fn move_table(&mut self, table_id: &str, x: f64, y: f64) -> StoreResult<()>;
    fn remove_table(&mut self, table_id: &str) -> StoreResult<Table>;

    fn add_column(&mut self, table_id: &str) -> StoreResult<String>;
    fn update_column(
        &mut self,
        table_id: &str,
        column_id: &str,
        patch: ColumnPatch,
    ) -> StoreResult<()>;
    fn remove_column(&mut self, table_id: &str, column_id: &str) -> StoreResult<Column>;
    fn reorder_columns(&mut self, table_id: &str, ordered_ids: &[String]) -> StoreResult<()>;

    fn connect_columns(&mut self, source: &ColumnRef, target: &ColumnRef) -> StoreResult<String>;
    fn disconnect(&mut self, relationship_id: &str) -> StoreResult<Relationship>;

    fn replace(&mut self, state: SchemaState);
}

impl SchemaState {
    fn table_mut(&mut self, table_id: &str) -> StoreResult<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.id == table_id)
            .ok_or_else(|| StoreError::TableNotFound(table_id.to_string()))
    }

    fn next_table_name(&self) -> String {
        let mut n = self.tables.len() + 1;
        loop {
            let candidate = format!("table_{}", n);
            if !self.tables.iter().any(|t| t.name == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn next_column_name(table: &Table) -> String {
    let mut n = table.columns.len() + 1;
    loop {
        let candidate = format!("column_{}", n);
        if !table.columns.iter().any(|c| c.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Orders `columns` by `ordered_ids`. Unknown ids are skipped and columns the
/// list does not mention keep their relative order at the end.
pub fn reorder_by_ids(columns: Vec<Column>, ordered_ids: &[String]) -> Vec<Column> {
    let mut remaining: Vec<Option<Column>> = columns.into_iter().map(Some).collect();
    let mut result = Vec::with_capacity(remaining.len());

    for id in ordered_ids {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|c| &c.id == id))
        {
            if let Some(column) = slot.take() {
                result.push(column);
            }
        }
    }

    result.extend(remaining.into_iter().flatten());
    result
}

impl SchemaOps for SchemaState {
    fn find_table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    fn find_column(&self, table_id: &str, column_id: &str) -> Option<&Column> {
        self.find_table(table_id)?
            .columns
            .iter()
            .find(|c| c.id == column_id)
    }

    fn add_table(&mut self, position: (f64, f64)) -> String {
        let id = new_id("tbl");
        let table = Table::new(id.clone(), self.next_table_name())
            .with_position(position.0, position.1)
            .add_column(Column::new(new_id("col"), "id", "INT").primary_key());
        self.tables.push(table);
        id
    }

    fn update_table(&mut self, table_id: &str, patch: TablePatch) -> StoreResult<()> {
        let table = self.table_mut(table_id)?;
        if let Some(name) = patch.name {
            table.name = name;
        }
        if let Some((x, y)) = patch.position {
            table.pos_x = x;
            table.pos_y = y;
        }
        if let Some(columns) = patch.columns {
            table.columns = columns;
        }
        Ok(())
    }

    fn rename_table(&mut self, table_id: &str, name: &str) -> StoreResult<()> {
        self.update_table(
            table_id,
            TablePatch {
                name: Some(name.trim().to_string()),
                ..Default::default()
            },
        )
    }

    fn move_table(&mut self, table_id: &str, x: f64, y: f64) -> StoreResult<()> {
        self.update_table(
            table_id,
            TablePatch {
                position: Some((x, y)),
                ..Default::default()
            },
        )
    }

    fn remove_table(&mut self, table_id: &str) -> StoreResult<Table> {
        let index = self
            .tables
            .iter()
            .position(|t| t.id == table_id)
            .ok_or_else(|| StoreError::TableNotFound(table_id.to_string()))?;
        let table = self.tables.remove(index);
        self.relationships.retain(|r| !r.touches_table(table_id));
        Ok(table)
    }

    fn add_column(&mut self, table_id: &str) -> StoreResult<String> {
        let table = self.table_mut(table_id)?;
        let id = new_id("col");
        let name = next_column_name(table);
        table
            .columns
            .push(Column::new(id.clone(), name, DEFAULT_COLUMN_TYPE));
        Ok(id)
    }

    fn update_column(
        &mut self,
        table_id: &str,
        column_id: &str,
        patch: ColumnPatch,
    ) -> StoreResult<()> {
        let table = self.table_mut(table_id)?;
        let column = table
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;

        if let Some(name) = patch.name {
            column.name = name.trim().to_string();
        }
        if let Some(data_type) = patch.data_type {
            column.data_type = data_type.trim().to_string();
        }
        if let Some(pk) = patch.pk {
            column.pk = pk;
        }
        if let Some(fk) = patch.fk {
            column.fk = fk;
        }
        Ok(())
    }

    fn remove_column(&mut self, table_id: &str, column_id: &str) -> StoreResult<Column> {
        let table = self.table_mut(table_id)?;
        let index = table
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
        let column = table.columns.remove(index);
        self.relationships.retain(|r| !r.touches_column(column_id));
        Ok(column)
    }

    fn reorder_columns(&mut self, table_id: &str, ordered_ids: &[String]) -> StoreResult<()> {
        let table = self.table_mut(table_id)?;
        let columns = std::mem::take(&mut table.columns);
        table.columns = reorder_by_ids(columns, ordered_ids);
        Ok(())
    }

    fn connect_columns(&mut self, source: &ColumnRef, target: &ColumnRef) -> StoreResult<String> {
        if source.column_id == target.column_id {
            return Err(StoreError::SelfConnection);
        }
        if self.find_column(&target.table_id, &target.column_id).is_none() {
            return Err(StoreError::ColumnNotFound(target.column_id.clone()));
        }
        let duplicate = self.relationships.iter().any(|r| {
            (r.source_column == source.column_id && r.target_column == target.column_id)
                || (r.source_column == target.column_id && r.target_column == source.column_id)
        });
        if duplicate {
            return Err(StoreError::DuplicateConnection);
        }

        // Помечаем исходную колонку как внешний ключ
        self.update_column(
            &source.table_id,
            &source.column_id,
            ColumnPatch {
                fk: Some(true),
                ..Default::default()
            },
        )?;

        let id = new_id("rel");
        self.relationships.push(Relationship {
            id: id.clone(),
            source_table: source.table_id.clone(),
            source_column: source.column_id.clone(),
            target_table: target.table_id.clone(),
            target_column: target.column_id.clone(),
        });
        Ok(id)
    }

    fn disconnect(&mut self, relationship_id: &str) -> StoreResult<Relationship> {
        let index = self
            .relationships
            .iter()
            .position(|r| r.id == relationship_id)
            .ok_or_else(|| StoreError::RelationshipNotFound(relationship_id.to_string()))?;
        Ok(self.relationships.remove(index))
    }

    fn replace(&mut self, state: SchemaState) {
        *self = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(columns: &[Column]) -> Vec<&str> {
        columns.iter().map(|c| c.id.as_str()).collect()
    }

    fn cols(list: &[&str]) -> Vec<Column> {
        list.iter()
            .map(|id| Column::new(*id, *id, "INT"))
            .collect()
    }

    #[test]
    fn test_reorder_follows_given_ids() {
        let result = reorder_by_ids(cols(&["a", "b", "c"]), &["c".into(), "a".into(), "b".into()]);
        assert_eq!(ids(&result), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reorder_ignores_unknown_ids() {
        let result = reorder_by_ids(cols(&["a", "b"]), &["x".into(), "b".into(), "a".into()]);
        assert_eq!(ids(&result), vec!["b", "a"]);
    }

    #[test]
    fn test_reorder_keeps_unmentioned_columns() {
        let result = reorder_by_ids(cols(&["a", "b", "c", "d"]), &["c".into()]);
        assert_eq!(ids(&result), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_reorder_duplicate_ids_do_not_duplicate_columns() {
        let result = reorder_by_ids(cols(&["a", "b"]), &["b".into(), "b".into()]);
        assert_eq!(ids(&result), vec!["b", "a"]);
    }

    #[test]
    fn test_add_table_names_and_pk() {
        let mut state = SchemaState::new();
        let first = state.add_table((10.0, 20.0));
        let second = state.add_table((0.0, 0.0));

        let t1 = state.find_table(&first).unwrap();
        assert_eq!(t1.name, "table_1");
        assert_eq!(t1.position(), (10.0, 20.0));
        assert_eq!(t1.columns.len(), 1);
        assert!(t1.columns[0].pk);
        assert_eq!(t1.columns[0].name, "id");

        assert_eq!(state.find_table(&second).unwrap().name, "table_2");
    }

    #[test]
    fn test_add_table_skips_taken_name() {
        let mut state = SchemaState::new().with_table(Table::new("x", "table_1"));
        let id = state.add_table((0.0, 0.0));
        assert_eq!(state.find_table(&id).unwrap().name, "table_2");
    }

    #[test]
    fn test_column_crud() {
        let mut state = SchemaState::new();
        let table = state.add_table((0.0, 0.0));
        let col = state.add_column(&table).unwrap();

        let column = state.find_column(&table, &col).unwrap();
        assert_eq!(column.name, "column_2");
        assert_eq!(column.data_type, DEFAULT_COLUMN_TYPE);

        state
            .update_column(&table, &col, ColumnPatch::name("  email "))
            .unwrap();
        state
            .update_column(&table, &col, ColumnPatch::data_type("TEXT"))
            .unwrap();
        let column = state.find_column(&table, &col).unwrap();
        assert_eq!(column.name, "email");
        assert_eq!(column.data_type, "TEXT");

        let removed = state.remove_column(&table, &col).unwrap();
        assert_eq!(removed.name, "email");
        assert!(state.find_column(&table, &col).is_none());
    }

    #[test]
    fn test_missing_targets_are_errors() {
        let mut state = SchemaState::new();
        assert_eq!(
            state.rename_table("nope", "x"),
            Err(StoreError::TableNotFound("nope".into()))
        );
        let table = state.add_table((0.0, 0.0));
        assert_eq!(
            state.update_column(&table, "nope", ColumnPatch::default()),
            Err(StoreError::ColumnNotFound("nope".into()))
        );
        assert!(state.add_column("nope").is_err());
        assert!(state.disconnect("nope").is_err());
    }

    #[test]
    fn test_connect_marks_source_fk_and_rejects_duplicates() {
        let mut state = SchemaState::new();
        let users = state.add_table((0.0, 0.0));
        let posts = state.add_table((300.0, 0.0));
        let user_id = state.find_table(&users).unwrap().columns[0].id.clone();
        let author = state.add_column(&posts).unwrap();

        let source = ColumnRef::new(&posts, &author);
        let target = ColumnRef::new(&users, &user_id);
        state.connect_columns(&source, &target).unwrap();

        assert!(state.find_column(&posts, &author).unwrap().fk);
        assert_eq!(state.relationships.len(), 1);
        assert_eq!(
            state.connect_columns(&target, &source),
            Err(StoreError::DuplicateConnection)
        );
        assert_eq!(
            state.connect_columns(&source, &source),
            Err(StoreError::SelfConnection)
        );
    }

    #[test]
    fn test_removals_drop_relationships() {
        let mut state = SchemaState::new();
        let a = state.add_table((0.0, 0.0));
        let b = state.add_table((0.0, 0.0));
        let a_col = state.find_table(&a).unwrap().columns[0].id.clone();
        let b_col = state.add_column(&b).unwrap();
        let b_col2 = state.add_column(&b).unwrap();

        state
            .connect_columns(&ColumnRef::new(&b, &b_col), &ColumnRef::new(&a, &a_col))
            .unwrap();
        state
            .connect_columns(&ColumnRef::new(&b, &b_col2), &ColumnRef::new(&a, &a_col))
            .unwrap();

        state.remove_column(&b, &b_col).unwrap();
        assert_eq!(state.relationships.len(), 1);

        state.remove_table(&a).unwrap();
        assert!(state.relationships.is_empty());
    }
}
