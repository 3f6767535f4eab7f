use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::core::library::LibraryResult;

#[async_trait]
pub trait Repository<Entity, Patch>: Sync + Send {
    // create an entity and return it as stored
    async fn create(&self, entity: &Entity) -> LibraryResult<Entity>;

    // merges patch into an existing entity and returns the result
    async fn update(&self, id: &str, patch: &Patch) -> LibraryResult<Entity>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: &str) -> LibraryResult<usize>;

    // find all entities matching every predicate exactly
    async fn query(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<Entity>>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    // file or url backed database from configuration
    Sqlite,
    // private in-memory database, used in dev mode and tests
    LocalSqlite,
}
