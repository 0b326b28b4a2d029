pub mod explicit_table;
pub mod remote_table;

pub use explicit_table::ExplicitTable;
pub use remote_table::RemoteTable;

use std::sync::Arc;

use async_trait::async_trait;
use dash_core::{
    Column, FilterSpec, ListenerSet, NumericSpec, Row, TableSchema, TableSpec, UpdateListener,
    Value,
};
use tracing::debug;

use crate::config::DataConfig;
use crate::fetch::RemoteFetcher;
use crate::DataError;

/// A named table with a column schema and uniform data operations
#[async_trait]
pub trait Table: Send + Sync {
    /// Name and columns of this table
    fn schema(&self) -> &TableSchema;

    fn name(&self) -> &str {
        &self.schema().name
    }

    fn columns(&self) -> &[Column] {
        &self.schema().columns
    }

    /// Resolve a column name to its position
    fn column_index(&self, name: &str) -> Option<usize> {
        self.schema().column_index(name)
    }

    /// All rows
    async fn rows(&self) -> Result<Vec<Row>, DataError>;

    /// Rows passing `filter`, or every row when there is none
    async fn filtered_rows(&self, filter: Option<&FilterSpec>) -> Result<Vec<Row>, DataError>;

    /// Distinct values of a column, sorted ascending
    async fn all_values(&self, column: &str) -> Result<Vec<Value>, DataError>;

    /// Observed numeric domain of a column, `None` when it has no numeric values
    async fn numeric_spec(&self, column: &str) -> Result<Option<NumericSpec>, DataError>;

    /// Listeners told when this table's data changes
    fn listeners(&self) -> &ListenerSet;

    fn register_update_listener(&self, listener: Arc<dyn UpdateListener>) {
        self.listeners().register(listener);
    }

    fn deregister_update_listener(&self, listener: &Arc<dyn UpdateListener>) {
        self.listeners().deregister(listener);
    }

    /// Tell every registered listener that this table was updated
    fn notify_updated(&self) {
        self.listeners().notify(self.name());
    }

    /// Persisted form of this table
    fn to_record(&self) -> TableSpec;

    /// Cancel any recurring poll timer
    fn stop_polling(&self) {}

    /// Downcast to an in-memory table
    fn as_explicit(&self) -> Option<&ExplicitTable> {
        None
    }
}

/// Collaborators handed to every table at construction
#[derive(Clone, Default)]
pub struct TableContext {
    /// Performs remote requests; required for remote tables
    pub fetcher: Option<Arc<dyn RemoteFetcher>>,

    /// Registered on every table whose connector polls
    pub update_listener: Option<Arc<dyn UpdateListener>>,

    pub config: DataConfig,
}

impl TableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_update_listener(mut self, listener: Arc<dyn UpdateListener>) -> Self {
        self.update_listener = Some(listener);
        self
    }

    pub fn with_config(mut self, config: DataConfig) -> Self {
        self.config = config;
        self
    }
}

/// Build a table from its specification record.
///
/// `rows` makes an [`ExplicitTable`], `connector` a [`RemoteTable`]; having
/// both or neither is an error.
pub fn construct_table(
    name: &str,
    spec: TableSpec,
    context: &TableContext,
) -> Result<Arc<dyn Table>, DataError> {
    let TableSpec { columns, rows, connector } = spec;
    let schema = TableSchema::new(name, columns);

    match (rows, connector) {
        (Some(rows), None) => {
            debug!("Creating explicit table '{}' with {} rows", name, rows.len());
            Ok(Arc::new(ExplicitTable::new(schema, rows)))
        }
        (None, Some(connector)) => {
            let fetcher = context
                .fetcher
                .clone()
                .ok_or_else(|| DataError::NoFetcher(name.to_string()))?;
            let polls = connector.interval.is_some();

            debug!("Creating remote table '{}' at {}", name, connector.url);
            let table = RemoteTable::new(schema, connector, fetcher, &context.config);

            if polls {
                if let Some(listener) = &context.update_listener {
                    table.register_update_listener(listener.clone());
                }
            }
            Ok(Arc::new(table))
        }
        _ => Err(DataError::InvalidTableSpec(name.to_string())),
    }
}
