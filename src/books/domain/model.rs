use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;

// BookEntity is a row of the books table, keyed by isbn. Only isbn and title are
// mandatory, the remaining columns are nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookEntity {
    pub isbn: String,
    pub amazon_url: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub pages: Option<i64>,
    pub publisher: Option<String>,
    pub title: String,
    pub year: Option<i64>,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            amazon_url: None,
            author: None,
            language: None,
            pages: None,
            publisher: None,
            title: title.to_string(),
            year: None,
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.isbn.to_string()
    }
}

// BookPatch holds the columns to overwrite in a partial update; None leaves the
// column unchanged. The key column is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    pub amazon_url: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub pages: Option<i64>,
    pub publisher: Option<String>,
    pub title: Option<String>,
    pub year: Option<i64>,
}

// Value bound for one column of an UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    // columns lists the (column, value) pairs present in the patch in table order.
    pub fn columns(&self) -> Vec<(&'static str, ColumnValue)> {
        let mut cols = vec![];
        if let Some(v) = &self.amazon_url {
            cols.push(("amazon_url", ColumnValue::Text(v.clone())));
        }
        if let Some(v) = &self.author {
            cols.push(("author", ColumnValue::Text(v.clone())));
        }
        if let Some(v) = &self.language {
            cols.push(("language", ColumnValue::Text(v.clone())));
        }
        if let Some(v) = self.pages {
            cols.push(("pages", ColumnValue::Integer(v)));
        }
        if let Some(v) = &self.publisher {
            cols.push(("publisher", ColumnValue::Text(v.clone())));
        }
        if let Some(v) = &self.title {
            cols.push(("title", ColumnValue::Text(v.clone())));
        }
        if let Some(v) = self.year {
            cols.push(("year", ColumnValue::Integer(v)));
        }
        cols
    }
}
