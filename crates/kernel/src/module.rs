use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Table definition contributed by a module.
///
/// Statements are applied on every startup and must be idempotent
/// (`CREATE TABLE IF NOT EXISTS ...`).
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: &'static str,
    pub ddl: &'static str,
}

/// Core module trait that all bookshelf modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module, also its URL prefix
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup after tables exist
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under `/{module_name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON
    /// Will be merged with other modules' specs
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Tables this module reads and writes
    fn schema(&self) -> Vec<TableSchema> {
        vec![]
    }

    /// Called once the module is initialized, before the server accepts requests
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
