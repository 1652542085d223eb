//! Canvas reconciliation
//!
//! Brings the rendered node tree in line with a [`SchemaState`] without
//! recreating nodes whose entity is still alive. The tree itself is behind
//! [`CanvasSurface`], so the same algorithm drives the browser DOM and the
//! in-memory surface used in tests.
//!
//! Rules per render pass:
//! - table nodes missing from state are unregistered from the connector
//!   registry and removed;
//! - a table name is written only while its name element is not focused;
//! - a table position is written only while the node is not being dragged;
//! - column content is rewritten only when it changed and neither editable
//!   part of the row is focused;
//! - column nodes end up in exactly the order of the column collection.

use super::connectors::{Connection, ConnectorRegistry};
use super::schema::{Column, SchemaState, Table};

/// Everything a column row displays
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnContent {
    pub name: String,
    pub data_type: String,
    pub pk: bool,
    pub fk: bool,
}

impl From<&Column> for ColumnContent {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            pk: column.pk,
            fk: column.fk,
        }
    }
}

/// Rendered node tree the reconciler operates on.
///
/// Implementations must treat unknown ids as no-ops.
pub trait CanvasSurface {
    fn table_ids(&self) -> Vec<String>;
    fn create_table(&mut self, table: &Table);
    fn remove_table(&mut self, table_id: &str);
    fn is_name_focused(&self, table_id: &str) -> bool;
    fn set_table_name(&mut self, table_id: &str, name: &str);
    fn is_dragging(&self, table_id: &str) -> bool;
    fn set_table_position(&mut self, table_id: &str, x: f64, y: f64);

    fn column_ids(&self, table_id: &str) -> Vec<String>;
    fn create_column(&mut self, table_id: &str, column: &Column);
    fn remove_column(&mut self, table_id: &str, column_id: &str);
    fn is_column_focused(&self, column_id: &str) -> bool;
    fn column_content(&self, column_id: &str) -> Option<ColumnContent>;
    fn set_column_content(&mut self, table_id: &str, column_id: &str, content: &ColumnContent);
    /// Moves the column node to `index` inside its table
    fn place_column(&mut self, table_id: &str, column_id: &str, index: usize);

    /// Endpoints inside the table node need re-measuring
    fn revalidate(&mut self, _table_id: &str) {}
}

/// Counters of what a render pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub tables_created: usize,
    pub tables_updated: usize,
    pub tables_removed: usize,
    pub columns_created: usize,
    pub columns_removed: usize,
    pub columns_rewritten: usize,
    pub columns_moved: usize,
}

impl RenderReport {
    pub fn is_noop(&self) -> bool {
        self.tables_created == 0
            && self.tables_removed == 0
            && self.columns_created == 0
            && self.columns_removed == 0
            && self.columns_rewritten == 0
            && self.columns_moved == 0
    }

    /// Nodes were created or removed
    pub fn is_structural(&self) -> bool {
        self.tables_created + self.tables_removed + self.columns_created + self.columns_removed > 0
    }
}

pub struct Reconciler<S: CanvasSurface> {
    surface: S,
    connectors: ConnectorRegistry,
}

impl<S: CanvasSurface> Reconciler<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            connectors: ConnectorRegistry::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn connectors(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.connectors.connections().to_vec()
    }

    pub fn render(&mut self, state: &SchemaState) -> RenderReport {
        let mut report = RenderReport::default();

        for table_id in self.surface.table_ids() {
            if state.tables.iter().any(|t| t.id == table_id) {
                continue;
            }
            let column_ids = self.surface.column_ids(&table_id);
            self.connectors
                .remove_element(column_ids.iter().map(String::as_str));
            self.surface.remove_table(&table_id);
            report.tables_removed += 1;
        }

        let rendered: Vec<String> = self.surface.table_ids();
        for table in &state.tables {
            if rendered.contains(&table.id) {
                report.tables_updated += 1;
            } else {
                self.surface.create_table(table);
                report.tables_created += 1;
            }
            self.update_table(table, &mut report);
        }

        self.connectors.sync(&state.relationships);
        self.connectors.repaint_everything();

        if cfg!(debug_assertions) && report.is_structural() {
            leptos::logging::log!("canvas reconciled: {:?}", report);
        }
        report
    }

    fn update_table(&mut self, table: &Table, report: &mut RenderReport) {
        if !self.surface.is_name_focused(&table.id) {
            self.surface.set_table_name(&table.id, &table.name);
        }
        if !self.surface.is_dragging(&table.id) {
            self.surface
                .set_table_position(&table.id, table.pos_x, table.pos_y);
        }

        // Rendered order is read once and mirrored locally below
        let mut rendered = Vec::new();
        for column_id in self.surface.column_ids(&table.id) {
            if table.columns.iter().any(|c| c.id == column_id) {
                rendered.push(column_id);
                continue;
            }
            self.connectors.unmake_source(&column_id);
            self.connectors.unmake_target(&column_id);
            self.surface.remove_column(&table.id, &column_id);
            report.columns_removed += 1;
        }

        let mut content_changed = false;
        for (index, column) in table.columns.iter().enumerate() {
            if !rendered.contains(&column.id) {
                self.surface.create_column(&table.id, column);
                self.connectors.make_source(&column.id);
                self.connectors.make_target(&column.id);
                rendered.push(column.id.clone());
                report.columns_created += 1;
            }

            let content = ColumnContent::from(column);
            if !self.surface.is_column_focused(&column.id)
                && self.surface.column_content(&column.id).as_ref() != Some(&content)
            {
                self.surface
                    .set_column_content(&table.id, &column.id, &content);
                report.columns_rewritten += 1;
                content_changed = true;
            }

            if rendered.get(index) != Some(&column.id) {
                self.surface.place_column(&table.id, &column.id, index);
                if let Some(from) = rendered.iter().position(|id| *id == column.id) {
                    let id = rendered.remove(from);
                    rendered.insert(index.min(rendered.len()), id);
                }
                report.columns_moved += 1;
            }
        }

        if content_changed {
            self.surface.revalidate(&table.id);
        }
    }
}
