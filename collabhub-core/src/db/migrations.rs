/// Database migration runner
///
/// Schema changes ship as `{timestamp}_{name}.sql` files under the crate's
/// `migrations/` directory and are embedded into the binary with
/// `sqlx::migrate!`, so a deployed service carries everything it needs to
/// bring a database up to the current CollabHub schema (users, projects,
/// memberships, tasks, comments, files, activities, notifications).
///
/// # Example
///
/// ```no_run
/// use collabhub_core::db::pool::{create_pool, DatabaseConfig};
/// use collabhub_core::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     // Run all pending migrations
///     run_migrations(&pool).await?;
///
///     // Check status
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Snapshot of the `_sqlx_migrations` bookkeeping table
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of successfully applied migrations
    pub applied_migrations: usize,

    /// Timestamp version of the most recent applied migration
    pub latest_version: Option<i64>,

    /// Whether the schema has been migrated at all
    pub is_up_to_date: bool,
}

/// Applies every migration that has not run yet, in timestamp order
///
/// Safe to call on every startup; already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or a previously applied
/// migration's checksum no longer matches its file.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Applying pending schema migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Schema is current");
            Ok(())
        }
        Err(e) => {
            warn!("Schema migration failed: {}", e);
            Err(e)
        }
    }
}

/// Reads the applied-migration state from the bookkeeping table
///
/// A database that has never been migrated reports zero applied migrations
/// rather than an error.
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Reading migration status");

    // On a fresh database the bookkeeping table itself is absent
    let bookkeeping_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
              AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !bookkeeping_exists {
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: false,
        });
    }

    let (applied, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version)
         FROM _sqlx_migrations
         WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(applied, latest_version = ?latest_version, "Migration status read");

    // Up-to-dateness against the embedded set would need the migrator's
    // manifest; a non-empty bookkeeping table is close enough for health
    // reporting
    Ok(MigrationStatus {
        applied_migrations: applied as usize,
        latest_version,
        is_up_to_date: applied > 0,
    })
}

/// Creates the target database when it is missing
///
/// Development and test convenience; production databases are provisioned
/// out of band.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
    } else {
        info!("Creating missing database");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}

/// Drops the target database and everything in it
///
/// Test teardown only. Missing databases are not an error.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    warn!("Dropping database: {}", database_url);

    if Postgres::database_exists(database_url).await? {
        Postgres::drop_database(database_url).await?;
    } else {
        debug!("Database does not exist, nothing to drop");
    }

    Ok(())
}
