use serde::{Deserialize, Serialize};

use crate::validation::{FieldContract, FieldRule};

/// A book record as stored in the `books` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier, also the URL path key
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Replacement values for every mutable field of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChanges {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

impl Book {
    /// Assemble a full record from a path isbn and a change set.
    pub fn from_changes(isbn: impl Into<String>, changes: BookChanges) -> Self {
        Self {
            isbn: isbn.into(),
            amazon_url: changes.amazon_url,
            author: changes.author,
            language: changes.language,
            pages: changes.pages,
            publisher: changes.publisher,
            title: changes.title,
            year: changes.year,
        }
    }
}

/// Body shape for single-book responses.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
}

/// Body shape for the collection response.
#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

const AMAZON_URL: FieldRule = FieldRule::text("amazon_url");
const AUTHOR: FieldRule = FieldRule::text("author");
const LANGUAGE: FieldRule = FieldRule::text("language");
const PAGES: FieldRule = FieldRule::integer("pages").at_least(1);
const PUBLISHER: FieldRule = FieldRule::text("publisher");
const TITLE: FieldRule = FieldRule::text("title");
const YEAR: FieldRule = FieldRule::integer("year");

const BOOK_FIELDS: &[FieldRule] = &[
    FieldRule::text("isbn").non_empty(),
    AMAZON_URL,
    AUTHOR,
    LANGUAGE,
    PAGES,
    PUBLISHER,
    TITLE,
    YEAR,
];

const BOOK_CHANGE_FIELDS: &[FieldRule] =
    &[AMAZON_URL, AUTHOR, LANGUAGE, PAGES, PUBLISHER, TITLE, YEAR];

/// Contract for `POST /books`: isbn plus every mutable field.
pub const BOOK_CONTRACT: FieldContract = FieldContract::new("book", BOOK_FIELDS);

/// Contract for `PUT /books/{isbn}`: the isbn comes from the path instead.
pub const BOOK_CHANGES_CONTRACT: FieldContract =
    FieldContract::new("book_changes", BOOK_CHANGE_FIELDS);
