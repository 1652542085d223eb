//! Connector registry for relationship lines
//!
//! Column nodes register as connection sources and targets when they are
//! rendered and unregister when their node goes away. The drawable
//! connection set is the subset of relationships whose both endpoints are
//! currently registered.

use std::collections::HashSet;

use super::schema::{Relationship, SchemaState, Table};

// Геометрия узла таблицы на канвасе
pub const NODE_WIDTH: f64 = 240.0;
pub const HEADER_HEIGHT: f64 = 40.0;
pub const ROW_HEIGHT: f64 = 30.0;
const GAP: f64 = 30.0;

/// Connection currently drawn on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub relationship_id: String,
    pub source_column: String,
    pub target_column: String,
}

#[derive(Debug, Default)]
pub struct ConnectorRegistry {
    sources: HashSet<String>,
    targets: HashSet<String>,
    connections: Vec<Connection>,
    repaints: u64,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_source(&mut self, column_id: &str) {
        self.sources.insert(column_id.to_string());
    }

    pub fn make_target(&mut self, column_id: &str) {
        self.targets.insert(column_id.to_string());
    }

    /// Unregisters the column as a source and detaches its connections
    pub fn unmake_source(&mut self, column_id: &str) {
        self.sources.remove(column_id);
        self.connections.retain(|c| c.source_column != column_id);
    }

    /// Unregisters the column as a target and detaches its connections
    pub fn unmake_target(&mut self, column_id: &str) {
        self.targets.remove(column_id);
        self.connections.retain(|c| c.target_column != column_id);
    }

    /// Drops every endpoint of a removed table node
    pub fn remove_element<'a>(&mut self, column_ids: impl IntoIterator<Item = &'a str>) {
        for id in column_ids {
            self.unmake_source(id);
            self.unmake_target(id);
        }
    }

    pub fn is_source(&self, column_id: &str) -> bool {
        self.sources.contains(column_id)
    }

    pub fn is_target(&self, column_id: &str) -> bool {
        self.targets.contains(column_id)
    }

    pub fn endpoint_count(&self) -> usize {
        self.sources.len() + self.targets.len()
    }

    /// Rebuilds the connection list from the relationships in state
    pub fn sync(&mut self, relationships: &[Relationship]) {
        self.connections = relationships
            .iter()
            .filter(|r| self.is_source(&r.source_column) && self.is_target(&r.target_column))
            .map(|r| Connection {
                relationship_id: r.id.clone(),
                source_column: r.source_column.clone(),
                target_column: r.target_column.clone(),
            })
            .collect();
    }

    pub fn repaint_everything(&mut self) {
        self.repaints += 1;
    }

    pub fn repaints(&self) -> u64 {
        self.repaints
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// SVG path for a drawn connection, or `None` if an endpoint is gone
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub relationship_id: String,
    pub d: String,
}

fn column_anchor(table: &Table, column_id: &str) -> Option<f64> {
    let index = table.columns.iter().position(|c| c.id == column_id)?;
    Some(table.pos_y + HEADER_HEIGHT + index as f64 * ROW_HEIGHT + ROW_HEIGHT / 2.0)
}

fn locate<'a>(state: &'a SchemaState, column_id: &str) -> Option<(&'a Table, f64)> {
    state
        .tables
        .iter()
        .find_map(|t| column_anchor(t, column_id).map(|y| (t, y)))
}

/// Orthogonal path between two column rows
pub fn connector_path(state: &SchemaState, connection: &Connection) -> Option<ConnectorPath> {
    let (from, from_y) = locate(state, &connection.source_column)?;
    let (to, to_y) = locate(state, &connection.target_column)?;

    let from_left = from.pos_x;
    let from_right = from.pos_x + NODE_WIDTH;
    let to_left = to.pos_x;
    let to_right = to.pos_x + NODE_WIDTH;

    let d = if to_left >= from_right + 10.0 {
        // Цель справа
        let mid_x = (from_right + to_left) / 2.0;
        format!(
            "M {} {} L {} {} L {} {} L {} {}",
            from_right, from_y, mid_x, from_y, mid_x, to_y, to_left, to_y
        )
    } else if from_left >= to_right + 10.0 {
        // Цель слева
        let mid_x = (from_left + to_right) / 2.0;
        format!(
            "M {} {} L {} {} L {} {} L {} {}",
            from_left, from_y, mid_x, from_y, mid_x, to_y, to_right, to_y
        )
    } else {
        // Таблицы перекрываются по горизонтали - обходим справа
        let out_x = from_right.max(to_right) + GAP;
        format!(
            "M {} {} L {} {} L {} {} L {} {}",
            from_right, from_y, out_x, from_y, out_x, to_y, to_right, to_y
        )
    };

    Some(ConnectorPath {
        relationship_id: connection.relationship_id.clone(),
        d,
    })
}
