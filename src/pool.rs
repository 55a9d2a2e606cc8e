//! A bounded pool of SQLite connections shared by all request handlers.
//!
//! Pooling is done by [r2d2]. Callers that find the pool exhausted wait for a
//! connection to be released rather than failing, and a connection goes back
//! to the pool when its guard is dropped.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use r2d2::ManageConnection;
use rusqlite::{Connection, OpenFlags};

use crate::{Error, db::initialize};

/// The number of connections opened when no size is specified.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// How long a connection waits on a locked database file before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a caller waits for a free connection.
///
/// Long enough that a saturated pool queues callers instead of failing them.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// A connection checked out from a [ConnectionPool].
///
/// The connection goes back to the pool when this guard is dropped.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    // A shared-cache URI, so every connection sees the same database.
    Memory(String),
}

/// Opens and checks rusqlite connections for [r2d2].
#[derive(Debug, Clone)]
pub struct SqliteConnectionManager {
    source: Source,
}

impl SqliteConnectionManager {
    /// Connections to the database file at `path`, in WAL mode.
    pub fn file(path: &Path) -> Self {
        Self {
            source: Source::File(path.to_owned()),
        }
    }

    /// Connections to a new, empty in-memory database.
    ///
    /// The database lives as long as at least one connection to it is open.
    pub fn memory() -> Self {
        static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

        let uri = format!(
            "file:fintrack-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::Relaxed)
        );

        Self {
            source: Source::Memory(uri),
        }
    }
}

impl ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> Result<Connection, rusqlite::Error> {
        match &self.source {
            Source::File(path) => {
                let connection = Connection::open(path)?;
                connection.busy_timeout(BUSY_TIMEOUT)?;
                let journal_mode: String =
                    connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                        row.get(0)
                    })?;
                tracing::debug!("Opened {} with journal mode {journal_mode}", path.display());

                Ok(connection)
            }
            Source::Memory(uri) => Connection::open_with_flags(
                uri,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            ),
        }
    }

    fn is_valid(&self, connection: &mut Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch("")
    }

    fn has_broken(&self, _connection: &mut Connection) -> bool {
        false
    }
}

/// A cheaply cloneable handle to a fixed set of database connections.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    inner: r2d2::Pool<SqliteConnectionManager>,
    closed: Arc<AtomicBool>,
}

impl ConnectionPool {
    /// Open `size` connections to the SQLite database file at `path`.
    ///
    /// The file is created if it does not exist and the schema is created if
    /// it is missing.
    ///
    /// # Errors
    /// Returns an error if a connection cannot be opened or the database
    /// cannot be initialized.
    pub fn open(path: &Path, size: u32) -> Result<Self, Error> {
        Self::build(SqliteConnectionManager::file(path), size)
    }

    /// Open `size` connections to a private in-memory database.
    ///
    /// The connections share one database, which lives until the pool is
    /// dropped. Every call creates a new, empty database.
    ///
    /// # Errors
    /// Returns an error if a connection cannot be opened or the database
    /// cannot be initialized.
    pub fn open_in_memory(size: u32) -> Result<Self, Error> {
        Self::build(SqliteConnectionManager::memory(), size)
    }

    fn build(manager: SqliteConnectionManager, size: u32) -> Result<Self, Error> {
        let size = size.max(1);

        // Connections are never reaped so that an in-memory database is not
        // dropped with its last idle connection.
        let inner = r2d2::Pool::builder()
            .max_size(size)
            .min_idle(Some(size))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        initialize(&*inner.get()?)?;

        Ok(Self {
            inner,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Check out a connection, waiting for one to be released if all are in use.
    ///
    /// # Errors
    /// Returns [Error::PoolClosed] if the pool has been closed, or
    /// [Error::Pool] if no connection could be checked out.
    pub async fn get(&self) -> Result<PooledConnection, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }

        // r2d2 blocks the calling thread while it waits.
        let pool = self.inner.clone();
        tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(|error| Error::Pool(error.to_string()))?
            .map_err(Error::from)
    }

    /// The total number of connections owned by the pool.
    pub fn size(&self) -> u32 {
        self.inner.max_size()
    }

    /// The number of connections not currently checked out.
    pub fn idle_count(&self) -> u32 {
        self.inner.state().idle_connections
    }

    /// Stop handing out connections.
    ///
    /// Later calls to [ConnectionPool::get] return [Error::PoolClosed].
    /// Connections already checked out stay usable until dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{Error, pool::ConnectionPool};

    #[tokio::test]
    async fn pool_is_bounded_to_its_size() {
        let pool = ConnectionPool::open_in_memory(3).expect("could not open pool");

        assert_eq!(pool.size(), 3);
        assert_eq!(pool.idle_count(), 3);
    }

    #[tokio::test]
    async fn connections_are_returned_on_drop() {
        let pool = ConnectionPool::open_in_memory(2).expect("could not open pool");

        {
            let _first = pool.get().await.expect("could not get connection");
            let _second = pool.get().await.expect("could not get connection");
            assert_eq!(pool.idle_count(), 0);
        }

        assert_eq!(pool.idle_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_pool_waits_instead_of_failing() {
        let pool = ConnectionPool::open_in_memory(1).expect("could not open pool");
        let held = pool.get().await.expect("could not get connection");

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.get().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "want caller to wait for a connection");

        drop(held);

        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter was never given a connection")
            .expect("waiter task panicked");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closed_pool_rejects_callers() {
        let pool = ConnectionPool::open_in_memory(1).expect("could not open pool");
        pool.close();

        let result = pool.get().await;

        assert!(matches!(result, Err(Error::PoolClosed)));
    }

    #[tokio::test]
    async fn connections_share_one_database() {
        let pool = ConnectionPool::open_in_memory(2).expect("could not open pool");
        let first = pool.get().await.expect("could not get connection");
        let second = pool.get().await.expect("could not get connection");

        first
            .execute(
                "INSERT INTO transactions (title, amount, type) VALUES ('Rent', 10.0, 'expense')",
                (),
            )
            .expect("could not insert row");
        let count: i64 = second
            .query_row("SELECT COUNT(id) FROM transactions", [], |row| row.get(0))
            .expect("could not count rows");

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn in_memory_pools_are_isolated() {
        let first = ConnectionPool::open_in_memory(1).expect("could not open pool");
        let second = ConnectionPool::open_in_memory(1).expect("could not open pool");

        first
            .get()
            .await
            .unwrap()
            .execute(
                "INSERT INTO transactions (title, amount, type) VALUES ('Rent', 10.0, 'expense')",
                (),
            )
            .unwrap();
        let count: i64 = second
            .get()
            .await
            .unwrap()
            .query_row("SELECT COUNT(id) FROM transactions", [], |row| row.get(0))
            .unwrap();

        assert_eq!(count, 0);
    }
}
