//! HTTP handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use bookshelf_http::error::AppError;

use super::models::{
    Book, BookChanges, BookResponse, BooksResponse, MessageResponse, BOOK_CHANGES_CONTRACT,
    BOOK_CONTRACT,
};
use super::store::{BookStore, StoreError};
use crate::validation::{validate, FieldContract};

/// Router for the books resource, relative to the `/books` mount point.
pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// Validate a raw JSON body and only then convert it into `T`.
fn parse_payload<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
    contract: &FieldContract,
) -> Result<T, AppError> {
    let Json(payload) = payload?;

    let errors = validate(&payload, contract);
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    serde_json::from_value(payload).map_err(|err| AppError::validation([err.to_string()]))
}

async fn list_books(State(store): State<BookStore>) -> Result<Json<BooksResponse>, AppError> {
    let books = store.find_all().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(BooksResponse { books }))
}

async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book: Book = parse_payload(payload, &BOOK_CONTRACT)?;
    let book = store.create(&book).await?;

    tracing::info!(isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

async fn get_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = store.find_one(&isbn).await?;
    tracing::debug!(isbn = %book.isbn, "book fetched");
    Ok(Json(BookResponse { book }))
}

async fn update_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let changes: BookChanges = parse_payload(payload, &BOOK_CHANGES_CONTRACT)?;

    // A missing target is a bad request here, not a 404
    let book = store.update(&isbn, &changes).await.map_err(|err| match err {
        StoreError::NotFound(_) => AppError::bad_request(err.to_string()),
        other => other.into(),
    })?;

    tracing::info!(isbn = %book.isbn, "book updated");
    Ok(Json(BookResponse { book }))
}

async fn delete_book(
    State(store): State<BookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    store.remove(&isbn).await?;

    tracing::info!(%isbn, "book deleted");
    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
