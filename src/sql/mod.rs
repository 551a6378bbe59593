//! Dynamic SQL command layer.
//!
//! - `dialect.rs` - identifier quoting and merge syntax per target store
//! - `builder.rs` - parameterized DML construction from value/key maps
//! - `context.rs` - injected execution seam and scoped transactions
//! - `executor.rs` - builds, logs and runs commands

mod builder;
mod context;
mod dialect;
mod executor;

pub use builder::{BuiltCommand, Parameter, SqlCommandBuilder};
pub use context::{ExecutionContext, ScopedTransaction, TableData, TransactionToken};
pub use dialect::{BoundColumn, Dialect, PostgresDialect, SqlServerDialect};
pub use executor::CommandExecutor;
