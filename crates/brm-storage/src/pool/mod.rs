//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brm_core::errors::BrmResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
///
/// The writer is shared through `Arc` with the rule runner, which executes
/// rule SQL against the same database.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Arc<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> BrmResult<Self> {
        let writer = Arc::new(WriteConnection::open(path, busy_timeout_ms)?);
        let readers = Arc::new(ReadPool::open(path, read_pool_size, busy_timeout_ms)?);
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory connection pool (for testing).
    /// Readers are separate databases and never see the writer's data, so
    /// callers route reads through the writer in this mode.
    pub fn open_in_memory() -> BrmResult<Self> {
        let writer = Arc::new(WriteConnection::open_in_memory()?);
        let readers = Arc::new(ReadPool::open_in_memory(1)?);
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
