use async_trait::async_trait;

use std::sync::Arc;

use crate::core::{Result, Row};
use crate::sql::builder::Parameter;

/// Opaque handle naming one open transaction on an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionToken(pub u64);

impl std::fmt::Display for TransactionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// Tabular result of a query: column names plus value rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The injected seam to a real store.
///
/// This trait keeps the command layer agnostic to the underlying driver.
/// Wrap a production client (Postgres, SQL Server, an in-memory engine) to
/// implement it, or use a recording fake in tests. Implementors bind each
/// [`Parameter`] by name, mapping `Value::Null` to the store's null token
/// and translating `@name` placeholders if the driver uses another style.
///
/// Concurrency follows the implementor's own contract; the command layer
/// adds no pooling, retries, or timeouts of its own.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Runs one statement that modifies data, returning the affected-row
    /// count. `tx` scopes the statement to an open transaction.
    async fn execute(
        &self,
        sql: &str,
        params: &[Parameter],
        tx: Option<TransactionToken>,
    ) -> Result<u64>;

    /// Runs a statement that returns rows.
    async fn query(
        &self,
        sql: &str,
        params: &[Parameter],
        tx: Option<TransactionToken>,
    ) -> Result<TableData>;

    /// Opens a transaction and returns its token.
    async fn begin_transaction(&self) -> Result<TransactionToken>;

    /// Commits the transaction named by `tx`.
    async fn commit(&self, tx: TransactionToken) -> Result<()>;

    /// Rolls back the transaction named by `tx`.
    async fn rollback(&self, tx: TransactionToken) -> Result<()>;
}

/// One open transaction bound to the context that started it.
///
/// Commit and rollback consume the value, so a transaction ends at most
/// once. Dropping it without calling either leaves the transaction to the
/// context's own abandonment rules; nothing is committed implicitly.
pub struct ScopedTransaction {
    context: Arc<dyn ExecutionContext>,
    token: TransactionToken,
}

impl ScopedTransaction {
    pub fn new(context: Arc<dyn ExecutionContext>, token: TransactionToken) -> Self {
        Self { context, token }
    }

    /// Token to pass into execution calls scoped to this transaction.
    pub fn token(&self) -> TransactionToken {
        self.token
    }

    pub async fn commit(self) -> Result<()> {
        self.context.commit(self.token).await
    }

    pub async fn rollback(self) -> Result<()> {
        self.context.rollback(self.token).await
    }
}
