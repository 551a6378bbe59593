// ============================================================================
// rowbridge Library
// ============================================================================

pub mod codegen;
pub mod core;
pub mod infer;
pub mod json;
pub mod model;
pub mod project;
pub mod sql;
pub mod synth;

// Re-export main types for convenience
pub use crate::core::{BridgeError, Column, DataType, Record, Result, Row, Schema, Value};
pub use crate::infer::{InferenceOptions, SchemaInferer};
pub use crate::model::TableModel;
pub use crate::project::RowProjector;
pub use crate::sql::{
    BuiltCommand, CommandExecutor, Dialect, ExecutionContext, Parameter, PostgresDialect,
    ScopedTransaction, SqlCommandBuilder, SqlServerDialect, TableData, TransactionToken,
};
pub use crate::synth::{DynamicModel, ModelDescriptor, TypeSynthesizer};

// Derive macro for declaring table models
pub use rowbridge_derive::TableModel;
