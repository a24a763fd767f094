pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module, TableSchema};
use serde_json::json;

pub use store::{BookStore, StoreError};

/// Books resource: CRUD over the `books` table
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn schema(&self) -> Vec<TableSchema> {
        vec![store::BOOKS_TABLE]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module over the given store
pub fn create_module(store: BookStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}

fn json_content(schema: serde_json::Value) -> serde_json::Value {
    json!({ "application/json": { "schema": schema } })
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": json_content(json!({ "$ref": "#/components/schemas/ErrorResponse" }))
    })
}

fn isbn_parameter() -> serde_json::Value {
    json!([{
        "name": "isbn",
        "in": "path",
        "required": true,
        "description": "ISBN of the book",
        "schema": { "type": "string" }
    }])
}

fn openapi_fragment() -> serde_json::Value {
    let book_response = json!({
        "type": "object",
        "properties": { "book": { "$ref": "#/components/schemas/Book" } },
        "required": ["book"]
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Every stored book",
                            "content": json_content(json!({
                                "type": "object",
                                "properties": {
                                    "books": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                },
                                "required": ["books"]
                            }))
                        },
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": json_content(json!({ "$ref": "#/components/schemas/Book" }))
                    },
                    "responses": {
                        "201": {
                            "description": "Book created",
                            "content": json_content(book_response.clone())
                        },
                        "400": error_response("Invalid payload or duplicate isbn")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": isbn_parameter(),
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": json_content(book_response.clone())
                        },
                        "404": error_response("No book with this isbn")
                    }
                },
                "put": {
                    "summary": "Replace a book's fields",
                    "tags": ["Books"],
                    "parameters": isbn_parameter(),
                    "requestBody": {
                        "required": true,
                        "content": json_content(json!({ "$ref": "#/components/schemas/BookChanges" }))
                    },
                    "responses": {
                        "200": {
                            "description": "Updated book",
                            "content": json_content(book_response)
                        },
                        "400": error_response("Invalid payload or no book with this isbn")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": isbn_parameter(),
                    "responses": {
                        "200": {
                            "description": "Book deleted",
                            "content": json_content(json!({
                                "type": "object",
                                "properties": { "message": { "type": "string" } },
                                "required": ["message"]
                            }))
                        },
                        "404": error_response("No book with this isbn")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "isbn": { "type": "string", "minLength": 1 },
                        "amazon_url": { "type": "string" },
                        "author": { "type": "string" },
                        "language": { "type": "string" },
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": { "type": "string" },
                        "title": { "type": "string" },
                        "year": { "type": "integer" }
                    },
                    "required": [
                        "isbn", "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                },
                "BookChanges": {
                    "type": "object",
                    "properties": {
                        "amazon_url": { "type": "string" },
                        "author": { "type": "string" },
                        "language": { "type": "string" },
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": { "type": "string" },
                        "title": { "type": "string" },
                        "year": { "type": "integer" }
                    },
                    "required": [
                        "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route() {
        let spec = openapi_fragment();
        for method in ["get", "post"] {
            assert!(spec["paths"]["/"][method].is_object(), "missing / {method}");
        }
        for method in ["get", "put", "delete"] {
            assert!(
                spec["paths"]["/{isbn}"][method].is_object(),
                "missing /{{isbn}} {method}"
            );
        }
    }

    #[test]
    fn openapi_book_schema_matches_contract() {
        let spec = openapi_fragment();
        let required = spec["components"]["schemas"]["Book"]["required"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(required, models::BOOK_CONTRACT.fields.len());
    }
}
