use std::sync::Arc;
use crate::books::factory;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;

pub async fn create_catalog_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Arc<dyn CatalogService>> {
    let book_repo = factory::create_book_repository(config, store).await?;
    Ok(Arc::new(CatalogServiceImpl::new(config, book_repo)))
}
