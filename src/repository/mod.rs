//! Repository layer: the in-memory book store

pub mod books;

/// Main repository struct holding the stores
#[derive(Clone, Default)]
pub struct Repository {
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a repository with an empty store
    pub fn new() -> Self {
        Self::default()
    }
}
