use async_trait::async_trait;
use dash_core::values::{distinct_sorted, numeric_spec};
use dash_core::{
    Filter, FilterSpec, ListenerSet, NumericSpec, Row, TableSchema, TableSpec, Value,
};
use parking_lot::RwLock;
use tracing::debug;

use super::Table;
use crate::DataError;

/// A table whose rows are held in memory
pub struct ExplicitTable {
    schema: TableSchema,
    /// Replaced wholesale, never edited per cell
    rows: RwLock<Vec<Row>>,
    listeners: ListenerSet,
}

impl ExplicitTable {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows: RwLock::new(rows),
            listeners: ListenerSet::new(),
        }
    }

    /// Replace every row and notify listeners
    pub fn replace_rows(&self, rows: Vec<Row>) {
        debug!("Reloading table '{}' with {} rows", self.schema.name, rows.len());
        *self.rows.write() = rows;
        self.notify_updated();
    }

    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Values of one column, in row order
    fn column_values(&self, index: usize) -> Vec<Value> {
        self.rows
            .read()
            .iter()
            .filter_map(|row| row.get(index).cloned())
            .collect()
    }
}

#[async_trait]
impl Table for ExplicitTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    async fn rows(&self) -> Result<Vec<Row>, DataError> {
        Ok(self.rows.read().clone())
    }

    async fn filtered_rows(&self, filter: Option<&FilterSpec>) -> Result<Vec<Row>, DataError> {
        let Some(spec) = filter else {
            return self.rows().await;
        };

        let filter = Filter::construct(&self.schema, spec)?;
        let rows = self.rows.read();
        Ok(filter.matching_rows(&rows))
    }

    async fn all_values(&self, column: &str) -> Result<Vec<Value>, DataError> {
        let Some(index) = self.column_index(column) else {
            return Ok(Vec::new());
        };
        let numeric = self.schema.columns[index].column_type.is_numeric();

        Ok(distinct_sorted(self.column_values(index), numeric))
    }

    async fn numeric_spec(&self, column: &str) -> Result<Option<NumericSpec>, DataError> {
        let Some(index) = self.column_index(column) else {
            return Ok(None);
        };

        Ok(numeric_spec(&self.column_values(index)))
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn to_record(&self) -> TableSpec {
        TableSpec::explicit(self.schema.columns.clone(), self.rows.read().clone())
    }

    fn as_explicit(&self) -> Option<&ExplicitTable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::{listener_from_fn, Column, ColumnType};
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;
    use std::sync::Arc;

    fn people(rows: Vec<Row>) -> ExplicitTable {
        ExplicitTable::new(
            TableSchema::new(
                "people",
                vec![
                    Column::new("name", ColumnType::String),
                    Column::new("age", ColumnType::Number),
                ],
            ),
            rows,
        )
    }

    fn random_rows(seed: u64) -> Vec<Row> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..20)
            .map(|i| vec![json!(format!("name{}", i)), json!(rng.gen_range(20..70))])
            .collect()
    }

    #[tokio::test]
    async fn test_filtered_rows_range() {
        let rows = random_rows(11);
        let table = people(rows.clone());

        let mut ages: Vec<i64> = rows.iter().map(|r| r[1].as_i64().unwrap()).collect();
        ages.sort();
        let (lo, hi) = (ages[3], ages[7]);

        let spec = FilterSpec::in_range("age", lo as f64, hi as f64);
        let result = table.filtered_rows(Some(&spec)).await.unwrap();

        let expected: Vec<Row> = rows
            .iter()
            .filter(|r| {
                let a = r[1].as_i64().unwrap();
                lo <= a && a <= hi
            })
            .cloned()
            .collect();
        assert_eq!(result, expected);
        assert!(result.len() >= 5);
    }

    #[tokio::test]
    async fn test_no_filter_returns_everything() {
        let rows = random_rows(2);
        let table = people(rows.clone());

        assert_eq!(table.filtered_rows(None).await.unwrap(), rows);
        assert_eq!(table.rows().await.unwrap(), rows);
    }

    #[tokio::test]
    async fn test_malformed_filter_is_rejected() {
        let table = people(random_rows(2));
        let spec = FilterSpec::Not { arguments: vec![] };

        assert!(matches!(
            table.filtered_rows(Some(&spec)).await,
            Err(DataError::Filter(_))
        ));
    }

    #[tokio::test]
    async fn test_all_values() {
        let table = people(vec![
            vec![json!("bob"), json!(30)],
            vec![json!("alice"), json!(4)],
            vec![json!("bob"), json!(30)],
            vec![json!("carol"), json!(100)],
        ]);

        assert_eq!(
            table.all_values("name").await.unwrap(),
            vec![json!("alice"), json!("bob"), json!("carol")]
        );
        assert_eq!(
            table.all_values("age").await.unwrap(),
            vec![json!(4), json!(30), json!(100)]
        );
        assert!(table.all_values("height").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_spec() {
        let table = people(vec![vec![json!("a"), json!(1)], vec![json!("b"), json!(2)]]);

        assert_eq!(
            table.numeric_spec("age").await.unwrap(),
            Some(NumericSpec { min_val: 1.0, max_val: 2.0, increment: 1.0 })
        );
        assert_eq!(table.numeric_spec("height").await.unwrap(), None);
        assert_eq!(people(vec![]).numeric_spec("age").await.unwrap(), None);
    }

    #[test]
    fn test_replace_rows_notifies() {
        let table = people(random_rows(5));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        table.register_update_listener(listener_from_fn(move |t| sink.lock().push(t.to_string())));

        table.replace_rows(vec![vec![json!("only"), json!(1)]]);

        assert_eq!(table.row_count(), 1);
        assert_eq!(*seen.lock(), vec!["people".to_string()]);
        assert_eq!(table.to_record().rows.unwrap(), vec![vec![json!("only"), json!(1)]]);
    }
}
