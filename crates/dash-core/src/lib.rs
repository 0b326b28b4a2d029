//! Core functionality for the dashboard data layer
//!
//! This crate provides the plain records (table, view, filter and numeric
//! specifications), the filter evaluator and the update-listener plumbing.
//! Nothing in here performs I/O; the asynchronous table implementations live
//! in `dash-data`.

pub mod events;
pub mod filter;
pub mod schema;
pub mod values;

// Re-export commonly used types
pub use events::{listener_from_fn, ListenerSet, UpdateListener};
pub use filter::{Filter, FilterError, FilterKind, FilterSpec};
pub use schema::{
    Column, ColumnType, Connector, NumericSpec, Row, TableSchema, TableSpec, ViewSpec,
};
pub use values::Value;
