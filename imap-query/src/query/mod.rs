//! Search query building
//!
//! Queries are built with [`QueryBuilder`], which records an ordered list of
//! [`Statement`]s and the [`ExecutionOptions`] used when the search runs.

pub mod builder;
pub mod options;
pub mod statement;

pub use builder::QueryBuilder;
pub use options::{ExecutionOptions, FetchMode};
pub use statement::{SearchKey, SearchValue, Statement, DATE_FORMAT};
