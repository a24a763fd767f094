//! SQLite connection pool factory and table bootstrap.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::TableSchema;

/// Open a connection pool for the configured database.
///
/// File databases are created if missing. In-memory databases get exactly one
/// connection that is never recycled, otherwise each pooled connection would
/// see its own empty database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true);

    let pool_options = if settings.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.url))?;

    tracing::info!(
        target: "bookshelf-db",
        url = %settings.url,
        in_memory = settings.is_in_memory(),
        "database pool ready"
    );

    Ok(pool)
}

/// Open a private in-memory database, mostly useful for tests.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    connect(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
}

/// Create every table contributed by the registered modules.
pub async fn apply_schema(
    pool: &SqlitePool,
    tables: &[(String, TableSchema)],
) -> anyhow::Result<()> {
    for (module, schema) in tables {
        sqlx::query(schema.ddl)
            .execute(pool)
            .await
            .with_context(|| {
                format!(
                    "failed to create table '{}' for module '{}'",
                    schema.table, module
                )
            })?;

        tracing::info!(target: "bookshelf-db", %module, table = schema.table, "table ready");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_table() -> (String, TableSchema) {
        (
            "notes".to_string(),
            TableSchema {
                table: "notes",
                ddl: "CREATE TABLE IF NOT EXISTS notes (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL)",
            },
        )
    }

    #[tokio::test]
    async fn test_in_memory_pool_shares_one_database() {
        let pool = connect_in_memory().await.unwrap();
        apply_schema(&pool, &[notes_table()]).await.unwrap();

        sqlx::query("INSERT INTO notes (id, body) VALUES ('a', 'first')")
            .execute(&pool)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_apply_schema_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        apply_schema(&pool, &[notes_table()]).await.unwrap();
        apply_schema(&pool, &[notes_table()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_broken_ddl_reports_table_and_module() {
        let pool = connect_in_memory().await.unwrap();
        let broken = (
            "broken".to_string(),
            TableSchema {
                table: "nope",
                ddl: "CREATE TABLE nope (",
            },
        );

        let err = apply_schema(&pool, &[broken]).await.unwrap_err();
        assert!(err.to_string().contains("table 'nope' for module 'broken'"));
    }
}
