//! Row-selection predicates
//!
//! A [`FilterSpec`] is the serializable description of a predicate. A
//! [`Filter`] is built from a spec against one table's schema each time it is
//! needed and then evaluated over that table's rows.

mod eval;
mod spec;

pub use eval::{Filter, FilterKind};
pub use spec::FilterSpec;

use thiserror::Error;

/// Errors raised while building a filter from its specification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{operator} takes exactly one argument, got {count}")]
    Arity {
        operator: &'static str,
        count: usize,
    },

    #[error("Malformed filter specification: {0}")]
    Malformed(String),
}
