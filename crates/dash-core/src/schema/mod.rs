//! Column schema and the plain records exchanged with the dashboard layer

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single row, positionally aligned with the table's columns
pub type Row = Vec<Value>;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Date,
}

impl ColumnType {
    /// Whether values of this type are ordered numerically
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Number)
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Name and ordered column list of a table.
///
/// Column position 0 is conventionally the category column used in summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Resolve a column name to its position, `None` if absent
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Declared type of a column, if the table has it
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(|c| c.column_type)
    }

    /// Column names in schema order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Remote table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub url: String,

    /// Dashboard scope sent with every request
    #[serde(
        rename = "dashboardName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dashboard_name: Option<String>,

    /// Poll interval in seconds, kept as written so `1` stays `1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Number>,
}

impl Connector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dashboard_name: None,
            interval: None,
        }
    }

    pub fn with_dashboard_name(mut self, name: impl Into<String>) -> Self {
        self.dashboard_name = Some(name.into());
        self
    }

    pub fn with_interval(mut self, seconds: impl Into<Number>) -> Self {
        self.interval = Some(seconds.into());
        self
    }

    /// Poll interval as seconds, if set
    pub fn interval_secs(&self) -> Option<f64> {
        self.interval.as_ref().and_then(Number::as_f64)
    }
}

/// Table specification record.
///
/// Exactly one of `rows` (explicit table) and `connector` (remote table) is
/// expected; the table factory rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,
}

impl TableSpec {
    pub fn explicit(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows: Some(rows),
            connector: None,
        }
    }

    pub fn remote(columns: Vec<Column>, connector: Connector) -> Self {
        Self {
            columns,
            rows: None,
            connector: Some(connector),
        }
    }
}

/// View specification record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub table: String,
    pub columns: Vec<String>,
    #[serde(rename = "filterNames")]
    pub filter_names: Vec<String>,
}

/// Observed numeric domain of a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSpec {
    pub min_val: f64,
    pub max_val: f64,
    pub increment: f64,
}

impl NumericSpec {
    /// Combine two specs: overall bounds, smaller increment
    pub fn merge(self, other: NumericSpec) -> NumericSpec {
        NumericSpec {
            min_val: self.min_val.min(other.min_val),
            max_val: self.max_val.max(other.max_val),
            increment: self.increment.min(other.increment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_index() {
        let schema = TableSchema::new(
            "people",
            vec![
                Column::new("name", ColumnType::String),
                Column::new("age", ColumnType::Number),
            ],
        );

        assert_eq!(schema.column_index("name"), Some(0));
        assert_eq!(schema.column_index("age"), Some(1));
        assert_eq!(schema.column_index("height"), None);
        assert_eq!(schema.column_type("age"), Some(ColumnType::Number));
    }

    #[test]
    fn test_connector_omits_unset_fields() {
        let spec = TableSpec::remote(
            vec![Column::new("age", ColumnType::Number)],
            Connector::new("http://localhost:5000"),
        );
        let record = serde_json::to_value(&spec).unwrap();

        assert_eq!(
            record,
            json!({
                "columns": [{"name": "age", "type": "number"}],
                "connector": {"url": "http://localhost:5000"}
            })
        );
    }

    #[test]
    fn test_table_spec_parses_legacy_record() {
        let spec: TableSpec = serde_json::from_value(json!({
            "columns": [{"name": "name", "type": "string"}, {"name": "when", "type": "date"}],
            "connector": {"url": "http://example", "dashboardName": "sales", "interval": 2}
        }))
        .unwrap();

        let connector = spec.connector.unwrap();
        assert_eq!(connector.dashboard_name.as_deref(), Some("sales"));
        assert_eq!(connector.interval_secs(), Some(2.0));
        assert_eq!(spec.columns[1].column_type, ColumnType::Date);
        assert!(spec.rows.is_none());
    }

    #[test]
    fn test_integer_interval_stays_integer() {
        let record = json!({
            "columns": [{"name": "age", "type": "number"}],
            "connector": {"url": "http://h", "interval": 2}
        });
        let spec: TableSpec = serde_json::from_value(record.clone()).unwrap();

        assert_eq!(serde_json::to_value(&spec).unwrap(), record);
        assert_eq!(Connector::new("http://h").with_interval(1u64).interval_secs(), Some(1.0));
    }

    #[test]
    fn test_numeric_spec_merge() {
        let a = NumericSpec { min_val: 1.0, max_val: 5.0, increment: 0.5 };
        let b = NumericSpec { min_val: 10.0, max_val: 20.0, increment: 2.0 };

        assert_eq!(
            a.merge(b),
            NumericSpec { min_val: 1.0, max_val: 20.0, increment: 0.5 }
        );
    }
}
