//! Core traits, settings, and module registry for bookshelf.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, TableSchema};
pub use registry::ModuleRegistry;
