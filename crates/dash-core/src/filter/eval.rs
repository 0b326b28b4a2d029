use ahash::AHashSet;
use serde_json::Value;

use super::{FilterError, FilterSpec};
use crate::schema::{Row, TableSchema};
use crate::values::{as_number, values_equal};

/// A filter bound to one table.
///
/// The binding is the table's name and is only consulted by equality. Column
/// references are resolved when the filter is built; a column the table does
/// not have resolves to `None` and matches no row.
#[derive(Debug, Clone)]
pub struct Filter {
    table: String,
    kind: FilterKind,
}

/// Predicate variants
#[derive(Debug, Clone)]
pub enum FilterKind {
    /// Cell is one of a set of values
    InList {
        column: Option<usize>,
        values: Vec<Value>,
    },
    /// Cell lies in `[min_val, max_val]`
    InRange {
        column: Option<usize>,
        min_val: f64,
        max_val: f64,
    },
    Not(Box<Filter>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Build a filter tree from its specification
    pub fn construct(table: &TableSchema, spec: &FilterSpec) -> Result<Self, FilterError> {
        let kind = match spec {
            FilterSpec::InList { column, values } => {
                let mut set: Vec<Value> = Vec::with_capacity(values.len());
                for value in values {
                    if !set.iter().any(|v| values_equal(v, value)) {
                        set.push(value.clone());
                    }
                }
                FilterKind::InList {
                    column: Self::resolve(table, column),
                    values: set,
                }
            }
            FilterSpec::InRange {
                column,
                min_val,
                max_val,
            } => FilterKind::InRange {
                column: Self::resolve(table, column),
                min_val: *min_val,
                max_val: *max_val,
            },
            FilterSpec::Not { arguments } => {
                if arguments.len() != 1 {
                    return Err(FilterError::Arity {
                        operator: "NOT",
                        count: arguments.len(),
                    });
                }
                FilterKind::Not(Box::new(Self::construct(table, &arguments[0])?))
            }
            FilterSpec::And { arguments } => {
                FilterKind::And(Self::construct_all(table, arguments)?)
            }
            FilterSpec::Or { arguments } => FilterKind::Or(Self::construct_all(table, arguments)?),
        };

        Ok(Self {
            table: table.name.clone(),
            kind,
        })
    }

    fn construct_all(
        table: &TableSchema,
        specs: &[FilterSpec],
    ) -> Result<Vec<Filter>, FilterError> {
        specs.iter().map(|s| Self::construct(table, s)).collect()
    }

    fn resolve(table: &TableSchema, column: &str) -> Option<usize> {
        let index = table.column_index(column);
        if index.is_none() {
            tracing::debug!("Column '{}' not found in table '{}'", column, table.name);
        }
        index
    }

    /// Name of the table this filter is bound to
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Indices of the rows that pass, ascending and without duplicates
    pub fn matching_row_indices(&self, rows: &[Row]) -> Vec<usize> {
        match &self.kind {
            FilterKind::InList { column, values } => Self::scan(rows, *column, |cell| {
                values.iter().any(|v| values_equal(v, cell))
            }),
            FilterKind::InRange {
                column,
                min_val,
                max_val,
            } => Self::scan(rows, *column, |cell| {
                let n = as_number(cell);
                // NaN fails both comparisons
                *min_val <= n && n <= *max_val
            }),
            FilterKind::Not(child) => {
                let excluded: AHashSet<usize> =
                    child.matching_row_indices(rows).into_iter().collect();
                (0..rows.len()).filter(|i| !excluded.contains(i)).collect()
            }
            FilterKind::And(children) => {
                let mut indices: Vec<usize> = (0..rows.len()).collect();
                for child in children {
                    if indices.is_empty() {
                        break;
                    }
                    let passing: AHashSet<usize> =
                        child.matching_row_indices(rows).into_iter().collect();
                    indices.retain(|i| passing.contains(i));
                }
                indices
            }
            FilterKind::Or(children) => {
                let mut indices: Vec<usize> = children
                    .iter()
                    .flat_map(|child| child.matching_row_indices(rows))
                    .collect();
                indices.sort_unstable();
                indices.dedup();
                indices
            }
        }
    }

    /// The passing rows, in their original order
    pub fn matching_rows(&self, rows: &[Row]) -> Vec<Row> {
        self.matching_row_indices(rows)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect()
    }

    /// Row-scanning template shared by the leaf predicates
    fn scan<F>(rows: &[Row], column: Option<usize>, passes: F) -> Vec<usize>
    where
        F: Fn(&Value) -> bool,
    {
        let Some(column) = column else {
            return Vec::new();
        };

        rows.iter()
            .enumerate()
            .filter(|(_, row)| row.get(column).is_some_and(&passes))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Children match as sets: each child in one list has an equal counterpart in
/// the other. The lists must also be the same length.
fn children_equal(a: &[Filter], b: &[Filter]) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| x == y))
        && b.iter().all(|y| a.iter().any(|x| x == y))
}

fn value_sets_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| values_equal(x, y)))
        && b.iter().all(|y| a.iter().any(|x| values_equal(x, y)))
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        if self.table != other.table {
            return false;
        }

        match (&self.kind, &other.kind) {
            (
                FilterKind::InList { column: c1, values: v1 },
                FilterKind::InList { column: c2, values: v2 },
            ) => c1 == c2 && value_sets_equal(v1, v2),
            (
                FilterKind::InRange {
                    column: c1,
                    min_val: lo1,
                    max_val: hi1,
                },
                FilterKind::InRange {
                    column: c2,
                    min_val: lo2,
                    max_val: hi2,
                },
            ) => c1 == c2 && lo1 == lo2 && hi1 == hi2,
            (FilterKind::Not(a), FilterKind::Not(b)) => a == b,
            (FilterKind::And(a), FilterKind::And(b)) => children_equal(a, b),
            (FilterKind::Or(a), FilterKind::Or(b)) => children_equal(a, b),
            _ => false,
        }
    }
}
