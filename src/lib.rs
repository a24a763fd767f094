//! Bookshelf application library
//!
//! Wires the books module, the database pool and the HTTP server together.

pub mod modules;
pub mod validation;

use anyhow::Context;
use sqlx::SqlitePool;

use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build a registry with every module wired to `pool`.
pub fn build_registry(pool: &SqlitePool) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, pool)?;
    Ok(registry)
}

/// Connect to the database and create the tables every module needs.
pub async fn prepare_database(
    settings: &Settings,
) -> anyhow::Result<(SqlitePool, ModuleRegistry)> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(&pool)?;

    bookshelf_db::apply_schema(&pool, &registry.collect_schema())
        .await
        .context("failed to prepare database tables")?;

    Ok((pool, registry))
}

/// Run the service until a shutdown signal arrives.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let (pool, registry) = prepare_database(&settings).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    pool.close().await;

    served
}
