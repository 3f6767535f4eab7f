use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use crate::books::domain::model::BookPatch;
use crate::books::dto::BookDto;
use crate::books::schema::{normalize, validate, BookSchema};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) const IMMUTABLE_KEY_MESSAGE: &str = "Not allowed.";

pub(crate) struct UpdateBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct UpdateBookCommandRequest {
    pub isbn: String,
    pub patch: BookPatch,
}

impl UpdateBookCommandRequest {
    pub fn new(isbn: &str, patch: BookPatch) -> Self {
        Self {
            isbn: isbn.to_string(),
            patch,
        }
    }

    // parse rejects any attempt to change the key before looking at the other fields,
    // then checks the body against the update schema
    pub fn parse(isbn: &str, mut body: Value) -> Result<Self, CommandError> {
        if body.get("isbn").is_some() {
            return Err(CommandError::validation(vec![IMMUTABLE_KEY_MESSAGE.to_string()]));
        }
        validate(&body, BookSchema::Update).into_result().map_err(CommandError::validation)?;
        normalize(&mut body);
        let patch: BookPatch = serde_json::from_value(body)?;
        Ok(Self::new(isbn, patch))
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct UpdateBookCommandResponse {
    pub book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        self.catalog_service.update_book(req.isbn.as_str(), &req.patch)
            .await.map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::books::domain::model::BookPatch;
    use crate::books::dto::BookDto;
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest, IMMUTABLE_KEY_MESSAGE};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;

    #[tokio::test]
    async fn test_should_run_update_book() {
        let svc = factory::create_catalog_service(&Configuration::new("test"), RepositoryStore::LocalSqlite)
            .await.expect("should build service");
        let add_cmd = AddBookCommand::new(svc.clone());
        let update_cmd = UpdateBookCommand::new(svc);

        let mut book = BookDto::new("isbn", "test book");
        book.author = Some("someone".to_string());
        let _ = add_cmd.execute(AddBookCommandRequest::new(book.clone()))
                                    .await.expect("should add book");
        let req = UpdateBookCommandRequest::parse("isbn", json!({"title": "Updated Book", "year": 1999}))
            .expect("should parse");
        let res = update_cmd.execute(req).await.expect("should update book");
        assert_eq!("isbn", res.book.isbn.as_str());
        assert_eq!("Updated Book", res.book.title.as_str());
        assert_eq!(Some(1999), res.book.year);
        assert_eq!(book.author, res.book.author);
    }

    #[tokio::test]
    async fn test_should_fail_update_missing_book() {
        let svc = factory::create_catalog_service(&Configuration::new("test"), RepositoryStore::LocalSqlite)
            .await.expect("should build service");
        let patch = BookPatch { title: Some("x".to_string()), ..Default::default() };
        let res = UpdateBookCommand::new(svc).execute(UpdateBookCommandRequest::new("3579", patch)).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_isbn_before_other_checks() {
        let res = UpdateBookCommandRequest::parse("isbn", json!({"isbn": "other", "mamamia": 1, "pages": -1}));
        match res {
            Err(CommandError::Validation { messages }) => {
                assert_eq!(vec![IMMUTABLE_KEY_MESSAGE.to_string()], messages);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_reject_unknown_field() {
        let res = UpdateBookCommandRequest::parse("isbn", json!({"mamamia": "x"}));
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
