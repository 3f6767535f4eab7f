pub mod sql_book_repository;

use crate::books::domain::model::{BookEntity, BookPatch};
use crate::core::repository::Repository;

pub trait BookRepository: Repository<BookEntity, BookPatch> {}
