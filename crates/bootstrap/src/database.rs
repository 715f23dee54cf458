//! Lazily connected database handle shared by the storage stages.

use launchpad_db::DbPool;
use tokio::sync::OnceCell;

/// Connects on first use so that a stage which never touches storage
/// never opens a connection.
pub struct Database {
    url: String,
    max_connections: u32,
    pool: OnceCell<DbPool>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Wrap an already connected pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            url: String::new(),
            max_connections: 0,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// The connection pool, connecting if this is the first call.
    pub async fn pool(&self) -> Result<&DbPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| async {
                let pool = launchpad_db::create_pool(&self.url, self.max_connections).await?;
                tracing::info!(max_connections = self.max_connections, "Database connection pool created");
                Ok::<_, sqlx::Error>(pool)
            })
            .await
    }
}
