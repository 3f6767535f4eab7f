// Structural validation of book request bodies. Every book column is described once
// in BOOK_FIELDS and the two schemas only differ in which of them are required.
// All violations are collected, e.g. `instance.pages must be greater than or equal to 1`.

use serde_json::{Map, Value};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldKind {
    String,
    Integer,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    min_length: Option<usize>,
    minimum: Option<i64>,
    uri: bool,
}

impl FieldRule {
    const fn string(name: &'static str) -> Self {
        Self { name, kind: FieldKind::String, min_length: None, minimum: None, uri: false }
    }

    const fn non_empty(name: &'static str) -> Self {
        Self { name, kind: FieldKind::String, min_length: Some(1), minimum: None, uri: false }
    }

    const fn uri(name: &'static str) -> Self {
        Self { name, kind: FieldKind::String, min_length: None, minimum: None, uri: true }
    }

    const fn integer(name: &'static str, minimum: Option<i64>) -> Self {
        Self { name, kind: FieldKind::Integer, min_length: None, minimum, uri: false }
    }

    fn check(&self, value: &Value, errors: &mut Vec<String>) {
        let path = format!("instance.{}", self.name);
        match self.kind {
            FieldKind::String => {
                let Some(s) = value.as_str() else {
                    errors.push(format!("{} is not of a type(s) {}", path, self.kind.name()));
                    return;
                };
                if let Some(min) = self.min_length {
                    if s.chars().count() < min {
                        errors.push(format!("{} does not meet minimum length of {}", path, min));
                    }
                }
                if self.uri && Url::parse(s).is_err() {
                    errors.push(format!("{} does not conform to the \"uri\" format", path));
                }
            }
            FieldKind::Integer => {
                let Some(n) = as_integer(value) else {
                    errors.push(format!("{} is not of a type(s) {}", path, self.kind.name()));
                    return;
                };
                if let Some(min) = self.minimum {
                    if n < min {
                        errors.push(format!("{} must be greater than or equal to {}", path, min));
                    }
                }
            }
        }
    }
}

// whole-number floats such as 264.0 count as integers
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64))
}

// Book columns in table order.
const BOOK_FIELDS: [FieldRule; 8] = [
    FieldRule::non_empty("isbn"),
    FieldRule::uri("amazon_url"),
    FieldRule::string("author"),
    FieldRule::string("language"),
    FieldRule::integer("pages", Some(1)),
    FieldRule::string("publisher"),
    FieldRule::non_empty("title"),
    FieldRule::integer("year", None),
];

// names of every book column, in table order
pub fn book_columns() -> impl Iterator<Item = &'static str> {
    BOOK_FIELDS.iter().map(|f| f.name)
}

// whether `column` is an integer book column
pub fn is_integer_column(column: &str) -> bool {
    BOOK_FIELDS.iter().any(|f| f.name == column && f.kind == FieldKind::Integer)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookSchema {
    // isbn and title are required
    Create,
    // every field is optional
    Update,
}

impl BookSchema {
    fn required(&self) -> &'static [&'static str] {
        match self {
            BookSchema::Create => &["isbn", "title"],
            BookSchema::Update => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<String>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn into_result(self) -> Result<(), Vec<String>> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

pub fn validate(candidate: &Value, schema: BookSchema) -> ValidationResult {
    let Some(obj) = candidate.as_object() else {
        return ValidationResult::Invalid(vec!["instance is not of a type(s) object".to_string()]);
    };
    let errors = validate_object(obj, schema);
    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

// normalize rewrites whole-number floats in integer columns as integers so a validated
// body deserializes into i64 fields
pub fn normalize(candidate: &mut Value) {
    let Some(obj) = candidate.as_object_mut() else {
        return;
    };
    for rule in BOOK_FIELDS.iter().filter(|f| f.kind == FieldKind::Integer) {
        if let Some(value) = obj.get_mut(rule.name) {
            if !value.is_i64() {
                if let Some(n) = as_integer(value) {
                    *value = Value::from(n);
                }
            }
        }
    }
}

fn validate_object(obj: &Map<String, Value>, schema: BookSchema) -> Vec<String> {
    let mut errors = vec![];
    for name in schema.required() {
        if !obj.contains_key(*name) {
            errors.push(format!("instance requires property \"{}\"", name));
        }
    }

    let mut unknown: Vec<&String> = obj.keys()
        .filter(|k| !BOOK_FIELDS.iter().any(|f| f.name == k.as_str()))
        .collect();
    unknown.sort();
    for name in unknown {
        errors.push(format!("instance is not allowed to have the additional property \"{}\"", name));
    }

    for rule in BOOK_FIELDS.iter() {
        if let Some(value) = obj.get(rule.name) {
            rule.check(value, &mut errors);
        }
    }
    errors
}
