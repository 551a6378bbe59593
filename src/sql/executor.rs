//! Command execution.
//!
//! [`CommandExecutor`] builds a statement, hands it to the injected
//! [`ExecutionContext`] and returns the affected-row count. Store failures
//! propagate unchanged; there are no retries and no implicit transactions.

use std::sync::Arc;

use tracing::{Level, event};

use crate::core::{BridgeError, Record, Result};
use crate::sql::builder::{BuiltCommand, SqlCommandBuilder};
use crate::sql::context::{ExecutionContext, ScopedTransaction, TableData, TransactionToken};
use crate::sql::dialect::Dialect;

pub struct CommandExecutor {
    context: Arc<dyn ExecutionContext>,
    builder: SqlCommandBuilder,
}

impl CommandExecutor {
    /// Executor with the default dialect.
    pub fn new(context: Arc<dyn ExecutionContext>) -> Self {
        Self {
            context,
            builder: SqlCommandBuilder::default(),
        }
    }

    pub fn with_dialect(context: Arc<dyn ExecutionContext>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            context,
            builder: SqlCommandBuilder::new(dialect),
        }
    }

    pub fn builder(&self) -> &SqlCommandBuilder {
        &self.builder
    }

    pub async fn insert(
        &self,
        table: &str,
        values: &Record,
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.insert(table, values)?;
        self.run(command, tx).await
    }

    pub async fn update(
        &self,
        table: &str,
        values: &Record,
        keys: &Record,
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.update(table, values, keys)?;
        self.run(command, tx).await
    }

    pub async fn delete(
        &self,
        table: &str,
        keys: &Record,
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.delete(table, keys)?;
        self.run(command, tx).await
    }

    pub async fn upsert(
        &self,
        table: &str,
        values: &Record,
        keys: &Record,
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.upsert(table, values, keys)?;
        self.run(command, tx).await
    }

    pub async fn insert_range(
        &self,
        table: &str,
        items: &[Record],
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.insert_range(table, items)?;
        self.run(command, tx).await
    }

    pub async fn upsert_range(
        &self,
        table: &str,
        items: &[Record],
        key_columns: &[String],
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        let command = self.builder.upsert_range(table, items, key_columns)?;
        self.run(command, tx).await
    }

    /// Reads a whole table as column names plus rows.
    pub async fn query_table(
        &self,
        table: &str,
        tx: Option<TransactionToken>,
    ) -> Result<TableData> {
        if table.trim().is_empty() {
            return Err(BridgeError::Validation(
                "Table name cannot be empty".to_string(),
            ));
        }

        let sql = format!("SELECT * FROM {}", self.builder.dialect().quote(table));
        event!(Level::DEBUG, sql = %sql, "querying table");
        self.context.query(&sql, &[], tx).await
    }

    /// Opens a transaction on the underlying context. The returned value
    /// owns the commit/rollback decision; this executor never ends a
    /// transaction on its own.
    pub async fn begin_transaction(&self) -> Result<ScopedTransaction> {
        let token = self.context.begin_transaction().await?;
        event!(Level::DEBUG, token = %token, "transaction opened");
        Ok(ScopedTransaction::new(Arc::clone(&self.context), token))
    }

    async fn run(&self, command: BuiltCommand, tx: Option<TransactionToken>) -> Result<u64> {
        event!(
            Level::DEBUG,
            sql = %command.sql,
            params = command.params.len(),
            "executing command"
        );
        let affected = self
            .context
            .execute(&command.sql, &command.params, tx)
            .await?;
        event!(Level::DEBUG, affected = affected, "command finished");
        Ok(affected)
    }
}
