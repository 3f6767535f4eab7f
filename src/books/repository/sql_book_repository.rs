use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::books::domain::model::{BookEntity, BookPatch, ColumnValue};
use crate::books::repository::BookRepository;
use crate::books::schema::{book_columns, is_integer_column};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;

const SELECT_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Clone)]
pub struct SqlBookRepository {
    pool: SqlitePool,
    table_name: String,
}

impl SqlBookRepository {
    pub fn new(pool: SqlitePool, table_name: &str) -> Self {
        Self {
            pool,
            table_name: table_name.to_string(),
        }
    }

    // builds the WHERE clause and its bind values, rejecting unknown columns and
    // non-integer values for integer columns
    fn build_filter(predicate: &HashMap<String, String>) -> LibraryResult<(String, Vec<ColumnValue>)> {
        let mut keys: Vec<&String> = predicate.keys().collect();
        keys.sort();
        let mut errors = vec![];
        let mut clauses = vec![];
        let mut values = vec![];
        for k in keys {
            let v = &predicate[k];
            if !book_columns().any(|c| c == k.as_str()) {
                errors.push(format!("unknown filter {:?}", k));
                continue;
            }
            if is_integer_column(k) {
                match v.trim().parse::<i64>() {
                    Ok(n) => values.push(ColumnValue::Integer(n)),
                    Err(_) => {
                        errors.push(format!("filter {:?} must be an integer but was {:?}", k, v));
                        continue;
                    }
                }
            } else {
                values.push(ColumnValue::Text(v.to_string()));
            }
            clauses.push(format!("{} = ?", k));
        }
        if !errors.is_empty() {
            return Err(LibraryError::invalid(errors));
        }
        if clauses.is_empty() {
            Ok((String::new(), values))
        } else {
            Ok((format!(" WHERE {}", clauses.join(" AND ")), values))
        }
    }
}

#[async_trait]
impl Repository<BookEntity, BookPatch> for SqlBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            self.table_name, SELECT_COLUMNS, SELECT_COLUMNS);
        sqlx::query_as::<_, BookEntity>(sql.as_str())
            .bind(&entity.isbn)
            .bind(&entity.amazon_url)
            .bind(&entity.author)
            .bind(&entity.language)
            .bind(entity.pages)
            .bind(&entity.publisher)
            .bind(&entity.title)
            .bind(entity.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match LibraryError::from(err) {
                LibraryError::DuplicateKey { .. } => LibraryError::duplicate_key(
                    format!("book already exists for {}", entity.isbn).as_str()),
                other => other,
            })
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> LibraryResult<BookEntity> {
        let columns = patch.columns();
        if columns.is_empty() {
            return self.get(id).await;
        }
        let assignments: Vec<String> = columns.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE isbn = ? RETURNING {}",
            self.table_name, assignments.join(", "), SELECT_COLUMNS);
        let mut request = sqlx::query_as::<_, BookEntity>(sql.as_str());
        for (_, value) in columns {
            request = match value {
                ColumnValue::Text(s) => request.bind(s),
                ColumnValue::Integer(n) => request.bind(n),
            };
        }
        request
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("There is no book with an isbn {:?}", id).as_str()))
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let sql = format!("SELECT {} FROM {} WHERE isbn = ?", SELECT_COLUMNS, self.table_name);
        sqlx::query_as::<_, BookEntity>(sql.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("There is no book with an isbn {:?}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let sql = format!("DELETE FROM {} WHERE isbn = ?", self.table_name);
        let res = sqlx::query(sql.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(LibraryError::not_found(format!("There is no book with an isbn {:?}", id).as_str()));
        }
        Ok(res.rows_affected() as usize)
    }

    async fn query(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        let (filter, values) = Self::build_filter(predicate)?;
        let sql = format!("SELECT {} FROM {}{} ORDER BY isbn", SELECT_COLUMNS, self.table_name, filter);
        let mut request = sqlx::query_as::<_, BookEntity>(sql.as_str());
        for value in values {
            request = match value {
                ColumnValue::Text(s) => request.bind(s),
                ColumnValue::Integer(n) => request.bind(n),
            };
        }
        request.fetch_all(&self.pool).await.map_err(LibraryError::from)
    }
}

impl BookRepository for SqlBookRepository {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::books::domain::model::{BookEntity, BookPatch};
    use crate::books::repository::sql_book_repository::SqlBookRepository;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::sql::{build_pool, create_table};

    async fn build_repo() -> SqlBookRepository {
        let pool = build_pool(RepositoryStore::LocalSqlite, &Configuration::new("test"))
            .await.expect("should build pool");
        create_table(&pool, "books").await.expect("should create table");
        SqlBookRepository::new(pool, "books")
    }

    fn power_up() -> BookEntity {
        BookEntity {
            isbn: "0691161518".to_string(),
            amazon_url: Some("http://a.co/eobPtX2".to_string()),
            author: Some("Matthew Lane".to_string()),
            language: Some("english".to_string()),
            pages: Some(264),
            publisher: Some("Princeton University Press".to_string()),
            title: "Power-Up: Unlocking the Hidden Mathematics in Video Games".to_string(),
            year: Some(2017),
        }
    }

    #[tokio::test]
    async fn test_should_create_get_books() {
        let books_repo = build_repo().await;
        let book = power_up();
        let created = books_repo.create(&book).await.expect("should create book");
        assert_eq!(book, created);

        let loaded = books_repo.get(book.isbn.as_str()).await.expect("should return book");
        assert_eq!(book, loaded);
    }

    #[tokio::test]
    async fn test_should_fail_get_missing_book() {
        let books_repo = build_repo().await;
        let loaded = books_repo.get("3579").await;
        assert!(matches!(loaded, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let books_repo = build_repo().await;
        let _ = books_repo.create(&power_up()).await.expect("should create book");
        let res = books_repo.create(&BookEntity::new("0691161518", "other")).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
        let loaded = books_repo.get("0691161518").await.expect("should return book");
        assert_eq!(power_up().title, loaded.title);
    }

    #[tokio::test]
    async fn test_should_allow_single_winner_for_concurrent_creates() {
        let books_repo = Arc::new(build_repo().await);
        let mut handles = vec![];
        for i in 0..8 {
            let repo = books_repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&BookEntity::new("race", format!("title_{}", i).as_str())).await
            }));
        }
        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.expect("should join") {
                Ok(_) => created += 1,
                Err(LibraryError::DuplicateKey { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(1, created);
        assert_eq!(7, duplicates);
        assert_eq!(1, books_repo.query(&HashMap::new()).await.expect("should query").len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_allow_single_winner_for_concurrent_creates_on_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let mut config = Configuration::new("test");
        config.database_url = Some(format!("sqlite://{}", dir.path().join("books.db").display()));
        config.max_connections = 8;
        let pool = build_pool(RepositoryStore::Sqlite, &config).await.expect("should build pool");
        create_table(&pool, "books").await.expect("should create table");
        let books_repo = Arc::new(SqlBookRepository::new(pool, "books"));

        let mut handles = vec![];
        for i in 0..16 {
            let repo = books_repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&BookEntity::new("race", format!("title_{}", i).as_str())).await
            }));
        }
        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.expect("should join") {
                Ok(_) => created += 1,
                Err(LibraryError::DuplicateKey { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(1, created);
        assert_eq!(15, duplicates);
        assert_eq!(1, books_repo.query(&HashMap::new()).await.expect("should query").len());
    }

    #[tokio::test]
    async fn test_should_create_update_books() {
        let books_repo = build_repo().await;
        let book = power_up();
        let _ = books_repo.create(&book).await.expect("should create book");

        let patch = BookPatch { title: Some("Updated Book".to_string()), pages: Some(300), ..Default::default() };
        let updated = books_repo.update(book.isbn.as_str(), &patch).await.expect("should update book");
        assert_eq!("Updated Book", updated.title.as_str());
        assert_eq!(Some(300), updated.pages);
        assert_eq!(book.isbn, updated.isbn);
        assert_eq!(book.author, updated.author);
        assert_eq!(book.year, updated.year);

        let loaded = books_repo.get(book.isbn.as_str()).await.expect("should return book");
        assert_eq!(updated, loaded);
    }

    #[tokio::test]
    async fn test_should_return_current_row_for_empty_patch() {
        let books_repo = build_repo().await;
        let _ = books_repo.create(&power_up()).await.expect("should create book");
        let updated = books_repo.update("0691161518", &BookPatch::default()).await.expect("should update book");
        assert_eq!(power_up(), updated);
    }

    #[tokio::test]
    async fn test_should_fail_update_missing_book() {
        let books_repo = build_repo().await;
        let patch = BookPatch { title: Some("x".to_string()), ..Default::default() };
        assert!(matches!(books_repo.update("3579", &patch).await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(books_repo.update("3579", &BookPatch::default()).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_keep_last_write_for_concurrent_updates() {
        let books_repo = Arc::new(build_repo().await);
        let _ = books_repo.create(&power_up()).await.expect("should create book");
        let mut handles = vec![];
        for i in 0..4 {
            let repo = books_repo.clone();
            handles.push(tokio::spawn(async move {
                let patch = BookPatch { title: Some(format!("title_{}", i)), ..Default::default() };
                repo.update("0691161518", &patch).await
            }));
        }
        for handle in handles {
            handle.await.expect("should join").expect("should update book");
        }
        let loaded = books_repo.get("0691161518").await.expect("should return book");
        assert!(loaded.title.starts_with("title_"));
        assert_eq!(Some(264), loaded.pages);
    }

    #[tokio::test]
    async fn test_should_create_query_books() {
        let books_repo = build_repo().await;
        for i in 0..20 {
            let mut book = BookEntity::new(format!("isbn_{:02}", i).as_str(), format!("title_{}", i % 4).as_str());
            book.author = Some(format!("author_{}", i % 2));
            book.year = Some(2000 + (i % 5));
            let _ = books_repo.create(&book).await.expect("should create book");
        }
        let all = books_repo.query(&HashMap::new()).await.expect("should return books");
        assert_eq!(20, all.len());
        let isbns: Vec<String> = all.iter().map(|b| b.isbn.clone()).collect();
        let mut sorted = isbns.clone();
        sorted.sort();
        assert_eq!(sorted, isbns);

        let predicate = HashMap::from([("author".to_string(), "author_0".to_string())]);
        assert_eq!(10, books_repo.query(&predicate).await.expect("should return books").len());

        let predicate = HashMap::from([
            ("author".to_string(), "author_0".to_string()),
            ("title".to_string(), "title_0".to_string()),
        ]);
        assert_eq!(5, books_repo.query(&predicate).await.expect("should return books").len());

        let predicate = HashMap::from([("year".to_string(), "2003".to_string())]);
        assert_eq!(4, books_repo.query(&predicate).await.expect("should return books").len());
    }

    #[tokio::test]
    async fn test_should_reject_invalid_filters() {
        let books_repo = build_repo().await;
        let predicate = HashMap::from([("mamamia".to_string(), "1".to_string())]);
        assert!(matches!(books_repo.query(&predicate).await, Err(LibraryError::Validation { .. })));
        let predicate = HashMap::from([("pages".to_string(), "many".to_string())]);
        assert!(matches!(books_repo.query(&predicate).await, Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_create_delete_books() {
        let books_repo = build_repo().await;
        let book = power_up();
        let _ = books_repo.create(&book).await.expect("should create book");

        let deleted = books_repo.delete(book.isbn.as_str()).await.expect("should delete book");
        assert_eq!(1, deleted);

        let loaded = books_repo.get(book.isbn.as_str()).await;
        assert!(loaded.is_err());
        assert!(matches!(books_repo.delete(book.isbn.as_str()).await, Err(LibraryError::NotFound { .. })));
    }
}
