//! Book catalog service

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookAction, BookFilter, BookPayload, BookQuery, BookSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    config: CatalogConfig,
}

impl BooksService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Validate and store a new book
    pub async fn create(&self, payload: &BookPayload) -> AppResult<Book> {
        let input = payload.validate(BookAction::Create)?;
        let book = self.repository.books.create(input).await?;
        tracing::info!("Book created: id={} name={:?}", book.id, book.name);
        Ok(book)
    }

    /// List book summaries matching the query filters
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let filter = BookFilter::from(query);
        let books = self.repository.books.search(&filter).await;
        if !filter.is_empty() {
            tracing::debug!("Book filter {:?} matched {} book(s)", filter, books.len());
        }
        Ok(books)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await
            .ok_or_else(|| AppError::NotFound("Buku tidak ditemukan".to_string()))
    }

    /// Validate and apply a full replacement of a book's mutable fields.
    /// Validation runs before the lookup.
    pub async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<Book> {
        let input = payload.validate(BookAction::Update)?;
        let book = self
            .repository
            .books
            .update(id, input, self.config.recompute_finished_on_update)
            .await
            .ok_or_else(|| {
                AppError::NotFound("Gagal memperbarui buku. Id tidak ditemukan".to_string())
            })?;
        tracing::info!("Book updated: id={}", book.id);
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let book = self.repository.books.delete(id).await.ok_or_else(|| {
            AppError::NotFound("Buku gagal dihapus. Id tidak ditemukan".to_string())
        })?;
        tracing::info!("Book deleted: id={}", book.id);
        Ok(())
    }

    /// Number of stored books (for readiness)
    pub async fn count(&self) -> usize {
        self.repository.books.count().await
    }
}
