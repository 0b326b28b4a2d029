//! Named projections over a single table

use std::sync::Arc;

use dash_core::{FilterSpec, Row, Value, ViewSpec};
use indexmap::IndexMap;
use tracing::debug;

use crate::sources::Table;
use crate::DataError;

/// Filter specifications by name, supplied by the caller
pub type FilterRegistry = IndexMap<String, FilterSpec>;

/// Tables by name
pub type TableRegistry = IndexMap<String, Arc<dyn Table>>;

/// Selected columns of one table, filtered by the AND of named filters
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    spec: ViewSpec,
}

impl View {
    pub fn new(spec: ViewSpec) -> Self {
        Self { spec }
    }

    /// Name of the underlying table
    pub fn table(&self) -> &str {
        &self.spec.table
    }

    pub fn columns(&self) -> &[String] {
        &self.spec.columns
    }

    pub fn filter_names(&self) -> &[String] {
        &self.spec.filter_names
    }

    pub fn to_record(&self) -> ViewSpec {
        self.spec.clone()
    }

    /// Combine the named filters found in `filters`.
    ///
    /// Names missing from the registry are skipped. No filters gives `None`,
    /// one gives that spec unchanged, several give an `AND` in name order.
    pub fn resolve_filter(&self, filters: &FilterRegistry) -> Option<FilterSpec> {
        let mut resolved: Vec<FilterSpec> = self
            .spec
            .filter_names
            .iter()
            .filter_map(|name| {
                let spec = filters.get(name);
                if spec.is_none() {
                    debug!("Filter '{}' not found, skipping", name);
                }
                spec.cloned()
            })
            .collect();

        match resolved.len() {
            0 => None,
            1 => resolved.pop(),
            _ => Some(FilterSpec::and(resolved)),
        }
    }

    /// Filtered rows projected onto the selected columns, in selection order.
    ///
    /// `None` when the table is not in `tables` or a selected column does not
    /// exist in it.
    pub async fn get_data(
        &self,
        filters: &FilterRegistry,
        tables: &TableRegistry,
    ) -> Result<Option<Vec<Row>>, DataError> {
        let Some(table) = tables.get(&self.spec.table) else {
            debug!("View table '{}' not found", self.spec.table);
            return Ok(None);
        };

        let indices: Option<Vec<usize>> = self
            .spec
            .columns
            .iter()
            .map(|c| table.column_index(c))
            .collect();
        let Some(indices) = indices else {
            debug!("View selects a column missing from '{}'", self.spec.table);
            return Ok(None);
        };

        let filter = self.resolve_filter(filters);
        let rows = table.filtered_rows(filter.as_ref()).await?;

        Ok(Some(
            rows.into_iter()
                .map(|row| {
                    indices
                        .iter()
                        .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ExplicitTable;
    use dash_core::{Column, ColumnType, TableSchema};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    fn test_rows() -> Vec<Row> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..20)
            .map(|i| vec![json!(format!("name{}", i)), json!(rng.gen_range(20..70))])
            .collect()
    }

    fn registry(rows: Vec<Row>) -> TableRegistry {
        let table = ExplicitTable::new(
            TableSchema::new(
                "people",
                vec![
                    Column::new("name", ColumnType::String),
                    Column::new("age", ColumnType::Number),
                ],
            ),
            rows,
        );
        let mut tables = TableRegistry::new();
        tables.insert("people".to_string(), Arc::new(table) as Arc<dyn Table>);
        tables
    }

    fn view(columns: &[&str], filters: &[&str]) -> View {
        View::new(ViewSpec {
            table: "people".to_string(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            filter_names: filters.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_to_record_round_trip() {
        let spec: ViewSpec = serde_json::from_value(json!({
            "table": "people", "columns": ["age", "name"], "filterNames": ["f1"]
        }))
        .unwrap();
        let record = View::new(spec.clone()).to_record();

        assert_eq!(record, spec);
        assert_eq!(
            serde_json::to_value(record).unwrap(),
            json!({"table": "people", "columns": ["age", "name"], "filterNames": ["f1"]})
        );
    }

    #[test]
    fn test_resolve_filter() {
        let a = FilterSpec::in_range("age", 20.0, 30.0);
        let b = FilterSpec::in_list("name", vec![json!("name1")]);
        let mut filters = FilterRegistry::new();
        filters.insert("a".to_string(), a.clone());
        filters.insert("b".to_string(), b.clone());

        assert_eq!(view(&["name"], &[]).resolve_filter(&filters), None);
        assert_eq!(view(&["name"], &["missing"]).resolve_filter(&filters), None);
        assert_eq!(view(&["name"], &["a", "missing"]).resolve_filter(&filters), Some(a.clone()));
        assert_eq!(
            view(&["name"], &["b", "a"]).resolve_filter(&filters),
            Some(FilterSpec::and(vec![b, a]))
        );
    }

    #[tokio::test]
    async fn test_get_data_projection() {
        let rows = test_rows();
        let tables = registry(rows.clone());

        let names: Vec<Value> = rows[5..].iter().map(|r| r[0].clone()).collect();
        let mut filters = FilterRegistry::new();
        filters.insert("tail".to_string(), FilterSpec::in_list("name", names));

        let data = view(&["name"], &["tail"])
            .get_data(&filters, &tables)
            .await
            .unwrap()
            .unwrap();
        let expected: Vec<Row> = rows[5..].iter().map(|r| vec![r[0].clone()]).collect();
        assert_eq!(data, expected);

        let missing = view(&["name"], &["tail"])
            .get_data(&filters, &TableRegistry::new())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_data_reorders_columns() {
        let rows = test_rows();
        let tables = registry(rows.clone());

        let data = view(&["age", "name"], &[])
            .get_data(&FilterRegistry::new(), &tables)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data[0], vec![rows[0][1].clone(), rows[0][0].clone()]);
        assert_eq!(data.len(), 20);

        let bad = view(&["name", "height"], &[])
            .get_data(&FilterRegistry::new(), &tables)
            .await
            .unwrap();
        assert!(bad.is_none());
    }

    #[tokio::test]
    async fn test_filter_on_unknown_column_matches_nothing() {
        let tables = registry(test_rows());
        let mut filters = FilterRegistry::new();
        filters.insert("tall".to_string(), FilterSpec::in_range("height", 0.0, 300.0));

        let data = view(&["name"], &["tall"])
            .get_data(&filters, &tables)
            .await
            .unwrap();
        assert_eq!(data, Some(Vec::new()));
    }
}
