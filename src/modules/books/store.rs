use sqlx::SqlitePool;
use thiserror::Error;

use bookshelf_http::error::AppError;
use bookshelf_kernel::TableSchema;

use super::models::{Book, BookChanges};

pub const BOOKS_TABLE: TableSchema = TableSchema {
    table: "books",
    ddl: r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn       TEXT    PRIMARY KEY NOT NULL,
            amazon_url TEXT    NOT NULL,
            author     TEXT    NOT NULL,
            language   TEXT    NOT NULL,
            pages      INTEGER NOT NULL,
            publisher  TEXT    NOT NULL,
            title      TEXT    NOT NULL,
            year       INTEGER NOT NULL
        )
        "#,
};

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no book with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    Duplicate(String),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found(err.to_string()),
            StoreError::Duplicate(_) => AppError::bad_request(err.to_string()),
            StoreError::Database(db) => AppError::Internal(anyhow::Error::new(db)),
        }
    }
}

/// Data access for the `books` table.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new book. Uniqueness of the isbn is left to the primary key.
    pub async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO books ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.isbn)
            .bind(&book.amazon_url)
            .bind(&book.author)
            .bind(&book.language)
            .bind(book.pages)
            .bind(&book.publisher)
            .bind(&book.title)
            .bind(book.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Duplicate(book.isbn.clone())
                }
                other => StoreError::Database(other),
            })
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM books ORDER BY title, isbn");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    pub async fn find_one(&self, isbn: &str) -> Result<Book, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE isbn = ?");
        sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    /// Overwrite every mutable field of the book stored under `isbn`.
    pub async fn update(&self, isbn: &str, changes: &BookChanges) -> Result<Book, StoreError> {
        let sql = format!(
            "UPDATE books SET amazon_url = ?, author = ?, language = ?, pages = ?, \
             publisher = ?, title = ?, year = ? WHERE isbn = ? RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&changes.amazon_url)
            .bind(&changes.author)
            .bind(&changes.language)
            .bind(changes.pages)
            .bind(&changes.publisher)
            .bind(&changes.title)
            .bind(changes.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    pub async fn remove(&self, isbn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(isbn.to_string()));
        }
        Ok(())
    }
}
