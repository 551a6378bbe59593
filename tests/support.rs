#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rowbridge::{
    BridgeError, ExecutionContext, Parameter, Result, TableData, TransactionToken,
};

/// One statement as the context received it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<Parameter>,
    pub tx: Option<TransactionToken>,
}

/// Recording stand-in for a real store connection.
///
/// Every execute/query call is captured verbatim. Query results and the
/// affected-row count are scripted up front; `fail_next` makes the next
/// call fail with an execution error instead.
pub struct FakeContext {
    affected: u64,
    calls: Mutex<Vec<RecordedCall>>,
    table: Mutex<TableData>,
    fail_with: Mutex<Option<String>>,
    next_token: AtomicU64,
    committed: Mutex<Vec<TransactionToken>>,
    rolled_back: Mutex<Vec<TransactionToken>>,
}

impl FakeContext {
    pub fn new() -> Self {
        Self::with_affected(1)
    }

    pub fn with_affected(affected: u64) -> Self {
        Self {
            affected,
            calls: Mutex::new(Vec::new()),
            table: Mutex::new(TableData::default()),
            fail_with: Mutex::new(None),
            next_token: AtomicU64::new(1),
            committed: Mutex::new(Vec::new()),
            rolled_back: Mutex::new(Vec::new()),
        }
    }

    /// Result served by every subsequent `query` call.
    pub fn serve_table(&self, table: TableData) {
        *self.table.lock().unwrap() = table;
    }

    /// Makes the next execute or query call fail.
    pub fn fail_next(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn committed(&self) -> Vec<TransactionToken> {
        self.committed.lock().unwrap().clone()
    }

    pub fn rolled_back(&self) -> Vec<TransactionToken> {
        self.rolled_back.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Option<BridgeError> {
        self.fail_with
            .lock()
            .unwrap()
            .take()
            .map(BridgeError::Execution)
    }

    fn record(&self, sql: &str, params: &[Parameter], tx: Option<TransactionToken>) {
        self.calls.lock().unwrap().push(RecordedCall {
            sql: sql.to_string(),
            params: params.to_vec(),
            tx,
        });
    }
}

#[async_trait]
impl ExecutionContext for FakeContext {
    async fn execute(
        &self,
        sql: &str,
        params: &[Parameter],
        tx: Option<TransactionToken>,
    ) -> Result<u64> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(sql, params, tx);
        Ok(self.affected)
    }

    async fn query(
        &self,
        sql: &str,
        params: &[Parameter],
        tx: Option<TransactionToken>,
    ) -> Result<TableData> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(sql, params, tx);
        Ok(self.table.lock().unwrap().clone())
    }

    async fn begin_transaction(&self) -> Result<TransactionToken> {
        Ok(TransactionToken(
            self.next_token.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn commit(&self, tx: TransactionToken) -> Result<()> {
        self.committed.lock().unwrap().push(tx);
        Ok(())
    }

    async fn rollback(&self, tx: TransactionToken) -> Result<()> {
        self.rolled_back.lock().unwrap().push(tx);
        Ok(())
    }
}
