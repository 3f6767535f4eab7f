use crate::books::repository::BookRepository;
use crate::books::repository::sql_book_repository::SqlBookRepository;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::utils::sql::{build_pool, create_table};

pub(crate) const BOOKS_TABLE: &str = "books";

pub(crate) async fn create_book_repository(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn BookRepository>> {
    let pool = build_pool(store, config).await?;
    create_table(&pool, BOOKS_TABLE).await?;
    Ok(Box::new(SqlBookRepository::new(pool, BOOKS_TABLE)))
}
