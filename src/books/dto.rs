use serde::{Deserialize, Serialize};

// BookDto is the data transfer object for the catalog service; absent optional
// columns are rendered as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub isbn: String,
    #[serde(default)]
    pub amazon_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub pages: Option<i64>,
    #[serde(default)]
    pub publisher: Option<String>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i64>,
}

impl BookDto {
    pub fn new(isbn: &str, title: &str) -> BookDto {
        BookDto {
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

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("isbn", "title");
        assert_eq!("isbn", book.isbn.as_str());
        assert_eq!("title", book.title.as_str());
        assert_eq!(None, book.language);
    }

    #[tokio::test]
    async fn test_should_render_missing_columns_as_null() {
        let value = serde_json::to_value(BookDto::new("1", "t")).expect("should serialize");
        assert_eq!(json!({
            "isbn": "1", "amazon_url": null, "author": null, "language": null,
            "pages": null, "publisher": null, "title": "t", "year": null,
        }), value);
    }
}
