// storage/migrations.rs
// Database migration management

use sqlx::SqlitePool;

/// Runs SQLx migrations located in the `migrations/` directory.
///
/// Creates the range tables and the published-generation table. Safe to run
/// on every start; applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}
