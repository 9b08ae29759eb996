//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Foreign keys are enforced on every
//! connection, so cascade deletes and dangling-reference checks happen in
//! the engine.

pub mod chat;
pub mod pool;
pub mod preference;
pub mod recommendation;

mod support;

#[cfg(test)]
pub(crate) mod test_support {
    use super::pool::DatabasePool;

    /// Fresh migrated database in a temporary directory.
    pub(crate) async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }
}
