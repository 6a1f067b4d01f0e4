//! Async facade over the synchronous record store.
//!
//! The SQLite connection lives behind a mutex; every call runs on tokio's
//! blocking pool so request tasks never wait on disk I/O.

use std::sync::{Arc, Mutex};

use recordbook_shared::{ListQuery, NewRecord, Record, RecordPage, RecordPatch};
use recordbook_store::Database;

use crate::error::ServerError;

#[derive(Clone)]
pub struct RecordService {
    db: Arc<Mutex<Database>>,
}

impl RecordService {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub async fn create(&self, input: NewRecord) -> Result<Record, ServerError> {
        self.run(move |db| db.create_record(&input)).await
    }

    pub async fn list(&self, query: ListQuery) -> Result<RecordPage, ServerError> {
        self.run(move |db| db.list_records(&query)).await
    }

    pub async fn get(&self, id: i64) -> Result<Record, ServerError> {
        self.run(move |db| db.get_record(id)).await
    }

    pub async fn update(&self, id: i64, patch: RecordPatch) -> Result<Record, ServerError> {
        self.run(move |db| db.update_record(id, &patch)).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServerError> {
        self.run(move |db| db.delete_record(id)).await
    }

    pub async fn count(&self) -> Result<u64, ServerError> {
        self.run(|db| db.count_records()).await
    }

    async fn run<T, F>(&self, op: F) -> Result<T, ServerError>
    where
        F: FnOnce(&Database) -> recordbook_store::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))?;
            op(&*guard).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("Store task failed: {e}")))?
    }
}
