//! Registry of the tables and views of one dashboard

use std::sync::Arc;

use dash_core::values::distinct_sorted;
use dash_core::{Column, ColumnType, NumericSpec, Row, TableSpec, Value, ViewSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sources::{construct_table, Table, TableContext};
use crate::view::{FilterRegistry, TableRegistry, View};
use crate::DataError;

/// Persisted form of a whole manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerRecord {
    #[serde(default)]
    pub tables: IndexMap<String, TableSpec>,
    #[serde(default)]
    pub views: IndexMap<String, ViewSpec>,
}

/// Owns the named tables and views and answers cross-table queries
pub struct DataManager {
    tables: TableRegistry,
    views: IndexMap<String, View>,
    context: TableContext,
}

impl DataManager {
    /// Create an empty manager; `context` is handed to every table it builds
    pub fn new(context: TableContext) -> Self {
        Self {
            tables: TableRegistry::new(),
            views: IndexMap::new(),
            context,
        }
    }

    /// Rebuild a manager from the record produced by [`DataManager::to_record`]
    pub fn from_record(record: ManagerRecord, context: TableContext) -> Result<Self, DataError> {
        let mut manager = Self::new(context);
        for (name, spec) in record.tables {
            manager.add_table(&name, spec)?;
        }
        for (name, spec) in record.views {
            manager.add_view(&name, spec);
        }
        Ok(manager)
    }

    /// Add or replace a table
    pub fn add_table(&mut self, name: &str, spec: TableSpec) -> Result<(), DataError> {
        let table = construct_table(name, spec, &self.context)?;
        info!("Adding table '{}'", name);

        if let Some(previous) = self.tables.insert(name.to_string(), table) {
            previous.stop_polling();
        }
        Ok(())
    }

    /// Add or replace a view
    pub fn add_view(&mut self, name: &str, spec: ViewSpec) {
        info!("Adding view '{}' over table '{}'", name, spec.table);
        self.views.insert(name.to_string(), View::new(spec));
    }

    /// Remove a table, stopping its poll timer. Returns whether it existed.
    pub fn remove_table(&mut self, name: &str) -> bool {
        match self.tables.shift_remove(name) {
            Some(table) => {
                info!("Removing table '{}'", name);
                table.stop_polling();
                true
            }
            None => false,
        }
    }

    /// Remove a view. Returns whether it existed.
    pub fn remove_view(&mut self, name: &str) -> bool {
        let removed = self.views.shift_remove(name).is_some();
        if removed {
            info!("Removing view '{}'", name);
        }
        removed
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn view_names(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    pub fn table(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.tables.get(name).cloned()
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    /// Column schema of a table
    pub fn columns(&self, table: &str) -> Option<&[Column]> {
        self.tables.get(table).map(|t| t.columns())
    }

    /// Names of the tables that declare `column`
    pub fn tables_with_column(&self, column: &str) -> Vec<String> {
        self.tables
            .iter()
            .filter(|(_, t)| t.column_index(column).is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// `(table, column)` pairs declared with `column_type`
    pub fn columns_of_type(&self, column_type: ColumnType) -> Vec<(String, String)> {
        self.tables
            .iter()
            .flat_map(|(name, table)| {
                table
                    .columns()
                    .iter()
                    .filter(move |c| c.column_type == column_type)
                    .map(move |c| (name.clone(), c.name.clone()))
            })
            .collect()
    }

    /// Names of the views built over `table`
    pub fn views_for_table(&self, table: &str) -> Vec<String> {
        self.views
            .iter()
            .filter(|(_, v)| v.table() == table)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Tables in scope for a column query: the named table if it has the
    /// column, otherwise every table that has it
    fn scope<'a>(&'a self, column: &str, table: Option<&str>) -> Vec<&'a Arc<dyn Table>> {
        let has_column = |t: &&Arc<dyn Table>| t.column_index(column).is_some();
        match table {
            Some(name) => self.tables.get(name).into_iter().filter(has_column).collect(),
            None => self.tables.values().filter(has_column).collect(),
        }
    }

    /// Distinct declared types of `column` across the scope
    pub fn get_types(&self, column: &str, table: Option<&str>) -> Vec<ColumnType> {
        let mut types = Vec::new();
        for t in self.scope(column, table) {
            if let Some(column_type) = t.schema().column_type(column) {
                if !types.contains(&column_type) {
                    types.push(column_type);
                }
            }
        }
        types
    }

    /// Distinct values of `column` across the scope, sorted ascending.
    ///
    /// Sorting is numeric only when every contributing table declares the
    /// column as a number.
    pub async fn get_all_values(
        &self,
        column: &str,
        table: Option<&str>,
    ) -> Result<Vec<Value>, DataError> {
        let scope = self.scope(column, table);
        let numeric = !scope.is_empty()
            && scope
                .iter()
                .all(|t| t.schema().column_type(column).is_some_and(ColumnType::is_numeric));

        let mut values = Vec::new();
        for t in scope {
            values.extend(t.all_values(column).await?);
        }
        Ok(distinct_sorted(values, numeric))
    }

    /// Numeric spec of `column` across the tables declaring it a number.
    ///
    /// Bounds are the overall min and max; the increment is the smallest of
    /// the per-table increments, not recomputed from the merged values.
    pub async fn get_numeric_spec(
        &self,
        column: &str,
        table: Option<&str>,
    ) -> Result<Option<NumericSpec>, DataError> {
        let mut merged: Option<NumericSpec> = None;

        for t in self.scope(column, table) {
            if !t.schema().column_type(column).is_some_and(ColumnType::is_numeric) {
                continue;
            }
            if let Some(spec) = t.numeric_spec(column).await? {
                merged = Some(match merged {
                    Some(current) => current.merge(spec),
                    None => spec,
                });
            }
        }
        Ok(merged)
    }

    /// Run a named view against this manager's tables.
    ///
    /// `None` when the view does not exist or cannot be resolved.
    pub async fn view_data(
        &self,
        view: &str,
        filters: &FilterRegistry,
    ) -> Result<Option<Vec<Row>>, DataError> {
        match self.views.get(view) {
            Some(v) => v.get_data(filters, &self.tables).await,
            None => {
                debug!("View '{}' not found", view);
                Ok(None)
            }
        }
    }

    /// Replace the rows of an in-memory table and notify its listeners.
    ///
    /// Returns `false` when there is no such table or it is remote.
    pub fn replace_rows(&self, table: &str, rows: Vec<Row>) -> bool {
        match self.tables.get(table).and_then(|t| t.as_explicit()) {
            Some(explicit) => {
                explicit.replace_rows(rows);
                true
            }
            None => false,
        }
    }

    pub fn to_record(&self) -> ManagerRecord {
        ManagerRecord {
            tables: self
                .tables
                .iter()
                .map(|(name, t)| (name.clone(), t.to_record()))
                .collect(),
            views: self
                .views
                .iter()
                .map(|(name, v)| (name.clone(), v.to_record()))
                .collect(),
        }
    }
}

impl Default for DataManager {
    fn default() -> Self {
        Self::new(TableContext::default())
    }
}
