//! Postgres-backed store implementation.
//!
//! All durable state lives here; request handlers hold no connection state
//! of their own. The pool is constructed once at process start and handed
//! to the services explicitly.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate order_number under concurrent creation, duplicate part_number |
//! | Database (serialization failure) | `40001` | `Conflict` | Concurrent transaction conflict |
//! | Database (other) | Any other | `Database` | FK violations, constraint failures, other database errors |
//! | PoolClosed | N/A | `Database` | Connection pool was closed |
//! | Other | N/A | `Database` | Network errors, connection failures, etc. |

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::StoreError;

mod customers;
mod orders;
mod products;

/// Postgres store: one pool shared by the customer, product, and order
/// trait implementations.
///
/// `Send + Sync` via the SQLx pool; clone freely, clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a fresh pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self { pool })
    }

    /// Wrap an already-built pool (tests, pool tuning at the call site).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl super::HealthStore for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}

/// Map SQLx errors to StoreError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation: concurrent duplicate (order_number) or
                // caller-visible duplicate (part_number).
                Some("23505") => StoreError::Conflict(msg),
                // Serialization failure under concurrent transactions.
                Some("40001") => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Shorthand for column-decoding failures outside `sqlx::Error` paths.
pub(crate) fn decode_error(operation: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("failed to decode row in {operation}: {err}"))
}
