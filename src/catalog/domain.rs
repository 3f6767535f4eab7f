pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::books::domain::model::BookPatch;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;

#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn remove_book(&self, isbn: &str) -> LibraryResult<()>;
    async fn update_book(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookDto>;
    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn find_books(&self, filter: &HashMap<String, String>) -> LibraryResult<Vec<BookDto>>;
}
