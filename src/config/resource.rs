//! Per-resource declaration: table, id column, write allow-list, column type tags.

use std::collections::HashMap;

/// Declared type tag for a column, controlling value transformation and the
/// placeholder cast. Columns without a tag bind untransformed and uncast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Jsonb,
    IntArray,
    TextArray,
}

impl ColumnType {
    /// SQL spelling used in the placeholder cast (`$n::int[]`).
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Jsonb => "jsonb",
            ColumnType::IntArray => "int[]",
            ColumnType::TextArray => "text[]",
        }
    }
}

/// One resource's configuration. Constructed once at startup, immutable
/// thereafter; identifiers here are trusted and spliced into SQL text, so
/// they must never come from request input.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    pub table: &'static str,
    pub id_column: &'static str,
    /// Ordered write allow-list; body fields outside it are silently ignored.
    pub allowed_columns: Vec<&'static str>,
    pub list_order: &'static str,
    /// Whether UPDATE stamps `updated_at = NOW()`.
    pub has_updated_at: bool,
    pub column_types: HashMap<&'static str, ColumnType>,
}

impl ResourceConfig {
    pub fn new(table: &'static str, allowed_columns: &[&'static str]) -> Self {
        Self {
            table,
            id_column: "id",
            allowed_columns: allowed_columns.to_vec(),
            list_order: "created_at DESC",
            has_updated_at: true,
            column_types: HashMap::new(),
        }
    }

    pub fn column_type(mut self, column: &'static str, ty: ColumnType) -> Self {
        self.column_types.insert(column, ty);
        self
    }

    pub fn list_order(mut self, order: &'static str) -> Self {
        self.list_order = order;
        self
    }

    pub fn id_column(mut self, column: &'static str) -> Self {
        self.id_column = column;
        self
    }

    pub fn has_updated_at(mut self, value: bool) -> Self {
        self.has_updated_at = value;
        self
    }

    pub fn type_of(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }
}
