//! redb-based storage for orders and the recency index

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::error::{AppError, AppResult};
use shared::order::{Order, OrderSummary};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Orders table: key = order id, value = JSON
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Single-record recency index: newest-first order summaries, JSON
const RECENT_TABLE: TableDefinition<(), &[u8]> = TableDefinition::new("recent_orders");

/// The recency index never grows past this many summaries
pub const MAX_RECENT: usize = 200;

#[derive(Debug, Error)]
pub enum OrderStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type OrderStorageResult<T> = Result<T, OrderStorageError>;

impl From<OrderStorageError> for AppError {
    fn from(err: OrderStorageError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Order storage
///
/// Full records live under the orders table keyed by id; a single bounded
/// index record keeps the newest summaries for listing without a scan.
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> OrderStorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> OrderStorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> OrderStorageResult<Self> {
        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(RECENT_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Persist a new order and unshift its summary into the recency index
    pub fn create(&self, order: &Order) -> OrderStorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), value.as_slice())?;

            let mut idx_table = txn.open_table(RECENT_TABLE)?;
            let mut summaries = match idx_table.get(())? {
                Some(guard) => serde_json::from_slice::<Vec<OrderSummary>>(guard.value())?,
                None => Vec::new(),
            };
            summaries.insert(0, order.summary());
            summaries.truncate(MAX_RECENT);
            let bytes = serde_json::to_vec(&summaries)?;
            idx_table.insert((), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get an order by ID
    pub fn get(&self, id: &str) -> OrderStorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(id)? {
            Some(guard) => {
                let order: Order = serde_json::from_slice(guard.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Read-modify-write an order inside one write transaction
    ///
    /// redb serializes writers, so two concurrent updates to the same order
    /// cannot interleave. A mutator error aborts the transaction and leaves
    /// the stored record untouched. The matching index summary has its
    /// status patched in place without reordering.
    pub fn update<F>(&self, id: &str, mutate: F) -> AppResult<Order>
    where
        F: FnOnce(&mut Order) -> AppResult<()>,
    {
        let txn = self.db.begin_write().map_err(OrderStorageError::from)?;
        let order = {
            let mut table = txn
                .open_table(ORDERS_TABLE)
                .map_err(OrderStorageError::from)?;

            let bytes = {
                let guard = table.get(id).map_err(OrderStorageError::from)?;
                match guard {
                    Some(guard) => guard.value().to_vec(),
                    None => return Err(AppError::order_not_found(id)),
                }
            };
            let mut order: Order =
                serde_json::from_slice(&bytes).map_err(OrderStorageError::from)?;

            mutate(&mut order)?;

            let value = serde_json::to_vec(&order).map_err(OrderStorageError::from)?;
            table
                .insert(id, value.as_slice())
                .map_err(OrderStorageError::from)?;

            let mut idx_table = txn
                .open_table(RECENT_TABLE)
                .map_err(OrderStorageError::from)?;
            let summaries = match idx_table.get(()).map_err(OrderStorageError::from)? {
                Some(guard) => Some(
                    serde_json::from_slice::<Vec<OrderSummary>>(guard.value())
                        .map_err(OrderStorageError::from)?,
                ),
                None => None,
            };
            if let Some(mut summaries) = summaries {
                if let Some(entry) = summaries.iter_mut().find(|s| s.id == id) {
                    entry.status = order.status;
                    let bytes =
                        serde_json::to_vec(&summaries).map_err(OrderStorageError::from)?;
                    idx_table
                        .insert((), bytes.as_slice())
                        .map_err(OrderStorageError::from)?;
                }
            }

            order
        };
        txn.commit().map_err(OrderStorageError::from)?;
        Ok(order)
    }

    /// The bounded recency index, newest first
    pub fn list(&self) -> OrderStorageResult<Vec<OrderSummary>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECENT_TABLE)?;

        match table.get(())? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }
}
