use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{debug, info};
use crate::books::domain::model::{BookEntity, BookPatch};
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::LibraryResult;

pub(crate) struct CatalogServiceImpl {
    branch_id: String,
    book_repository: Box<dyn BookRepository>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            book_repository,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        let created = self.book_repository.create(&BookEntity::from(book)).await?;
        info!(branch = %self.branch_id, isbn = %created.id(), "book added");
        Ok(BookDto::from(&created))
    }

    async fn remove_book(&self, isbn: &str) -> LibraryResult<()> {
        let _ = self.book_repository.delete(isbn).await?;
        info!(branch = %self.branch_id, isbn = %isbn, "book removed");
        Ok(())
    }

    async fn update_book(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookDto> {
        let updated = self.book_repository.update(isbn, patch).await?;
        info!(branch = %self.branch_id, isbn = %updated.id(), "book updated");
        Ok(BookDto::from(&updated))
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(isbn).await.map(|b| BookDto::from(&b))
    }

    async fn find_books(&self, filter: &HashMap<String, String>) -> LibraryResult<Vec<BookDto>> {
        let res = self.book_repository.query(filter).await?;
        debug!(branch = %self.branch_id, filters = filter.len(), found = res.len(), "books queried");
        Ok(res.iter().map(BookDto::from).collect())
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            amazon_url: other.amazon_url.clone(),
            author: other.author.clone(),
            language: other.language.clone(),
            pages: other.pages,
            publisher: other.publisher.clone(),
            title: other.title.to_string(),
            year: other.year,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            amazon_url: other.amazon_url.clone(),
            author: other.author.clone(),
            language: other.language.clone(),
            pages: other.pages,
            publisher: other.publisher.clone(),
            title: other.title.to_string(),
            year: other.year,
        }
    }
}
