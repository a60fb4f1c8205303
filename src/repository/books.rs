//! Book store
//!
//! An ordered `Vec<Book>` behind a single lock. Every compound operation
//! (insert-then-verify, find-and-replace, find-and-remove) holds the write
//! guard for its whole duration.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::book::{generate_book_id, Book, BookFilter, BookInput, BookSummary},
};

#[derive(Clone, Default)]
pub struct BooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries of the books matching `filter`, in insertion order
    pub async fn search(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.books
            .read()
            .await
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Book> {
        self.books.read().await.iter().find(|book| book.id == id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.books.read().await.len()
    }

    /// Append a new book with a fresh id and stamp both timestamps
    pub async fn create(&self, input: BookInput) -> AppResult<Book> {
        let mut books = self.books.write().await;

        let mut id = generate_book_id();
        while books.iter().any(|book| book.id == id) {
            id = generate_book_id();
        }

        let book = Book::new(id, input, Utc::now());
        books.push(book.clone());

        if !books.iter().any(|stored| stored.id == book.id) {
            return Err(AppError::Internal("Buku gagal ditambahkan".to_string()));
        }
        Ok(book)
    }

    /// Replace the mutable fields of the first book with `id`.
    /// Returns `None` when no book matches.
    pub async fn update(&self, id: &str, input: BookInput, recompute_finished: bool) -> Option<Book> {
        let mut books = self.books.write().await;
        let book = books.iter_mut().find(|book| book.id == id)?;
        book.apply_update(input, Utc::now(), recompute_finished);
        Some(book.clone())
    }

    /// Remove the first book with `id`, keeping the order of the others
    pub async fn delete(&self, id: &str) -> Option<Book> {
        let mut books = self.books.write().await;
        let index = books.iter().position(|book| book.id == id)?;
        Some(books.remove(index))
    }
}
