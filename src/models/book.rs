//! Book model and related request/query types.
//!
//! Request bodies are decoded as a JSON object and turned into
//! [`BookPayload`], whose fields are raw JSON values, and only become a typed [`BookInput`] once [`BookPayload::validate`]
//! has run its checks in order: missing name, page bounds, then field types.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult, INVALID_PAYLOAD};

/// Alphabet used for book identifiers (URL-safe)
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of generated book identifiers
pub const ID_LENGTH: usize = 16;

/// Generate a random book identifier
pub fn generate_book_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Book record as stored and returned by `GET /books/{bookId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[schema(example = "Qbax5Oy7L8WKf74l")]
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    /// `true` when `readPage == pageCount` at creation time
    pub finished: bool,
    pub reading: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from validated input, deriving `finished`
    pub fn new(id: String, input: BookInput, now: DateTime<Utc>) -> Self {
        let finished = input.is_finished();
        Self {
            id,
            name: input.name,
            year: input.year,
            author: input.author,
            summary: input.summary,
            publisher: input.publisher,
            page_count: input.page_count,
            read_page: input.read_page,
            finished,
            reading: input.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field. `id` and `inserted_at` are kept, and so is
    /// `finished` unless `recompute_finished` is set.
    pub fn apply_update(&mut self, input: BookInput, now: DateTime<Utc>, recompute_finished: bool) {
        if recompute_finished {
            self.finished = input.is_finished();
        }
        self.name = input.name;
        self.year = input.year;
        self.author = input.author;
        self.summary = input.summary;
        self.publisher = input.publisher;
        self.page_count = input.page_count;
        self.read_page = input.read_page;
        self.reading = input.reading;
        self.updated_at = now;
    }
}

/// Short representation used in list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Which operation a payload is validated for; selects the failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAction {
    Create,
    Update,
}

impl BookAction {
    fn failure_prefix(self) -> &'static str {
        match self {
            BookAction::Create => "Gagal menambahkan buku",
            BookAction::Update => "Gagal memperbarui buku",
        }
    }

    fn missing_name(self) -> AppError {
        AppError::Validation(format!("{}. Mohon isi nama buku", self.failure_prefix()))
    }

    fn read_page_overflow(self) -> AppError {
        AppError::Validation(format!(
            "{}. readPage tidak boleh lebih besar dari pageCount",
            self.failure_prefix()
        ))
    }
}

/// Raw create/update request body. Only built from a JSON object, so array
/// bodies never fill fields by position.
#[derive(Debug, Clone, Default, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookPayload {
    #[schema(value_type = String, example = "Buku A")]
    pub name: Option<Value>,
    #[schema(value_type = i32, example = 2010)]
    pub year: Option<Value>,
    #[schema(value_type = String, example = "John Doe")]
    pub author: Option<Value>,
    #[schema(value_type = String, example = "Lorem ipsum dolor sit amet")]
    pub summary: Option<Value>,
    #[schema(value_type = String, example = "Dicoding Indonesia")]
    pub publisher: Option<Value>,
    #[schema(value_type = u32, example = 100)]
    pub page_count: Option<Value>,
    #[schema(value_type = u32, example = 25)]
    pub read_page: Option<Value>,
    #[schema(value_type = bool, example = false)]
    pub reading: Option<Value>,
}

impl From<Map<String, Value>> for BookPayload {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            name: body.remove("name"),
            year: body.remove("year"),
            author: body.remove("author"),
            summary: body.remove("summary"),
            publisher: body.remove("publisher"),
            page_count: body.remove("pageCount"),
            read_page: body.remove("readPage"),
            reading: body.remove("reading"),
        }
    }
}

/// Validated book fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookInput {
    pub fn is_finished(&self) -> bool {
        self.page_count == self.read_page
    }
}

impl BookPayload {
    /// Run the ordered checks and produce typed input. The first failing
    /// check decides the error.
    pub fn validate(&self, action: BookAction) -> AppResult<BookInput> {
        if self.is_nameless() {
            return Err(action.missing_name());
        }

        if let (Some(read_page), Some(page_count)) = (
            self.read_page.as_ref().and_then(Value::as_f64),
            self.page_count.as_ref().and_then(Value::as_f64),
        ) {
            if read_page > page_count {
                return Err(action.read_page_overflow());
            }
        }

        self.typed().ok_or_else(|| AppError::Validation(INVALID_PAYLOAD.to_string()))
    }

    /// Absent, `null`, `false`, zero and blank strings all count as no name
    fn is_nameless(&self) -> bool {
        match &self.name {
            None | Some(Value::Null) | Some(Value::Bool(false)) => true,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(name)) => name.trim().is_empty(),
            Some(_) => false,
        }
    }

    fn typed(&self) -> Option<BookInput> {
        Some(BookInput {
            name: string_field(&self.name)?,
            year: self
                .year
                .as_ref()
                .and_then(Value::as_i64)
                .and_then(|year| i32::try_from(year).ok())?,
            author: string_field(&self.author)?,
            summary: string_field(&self.summary)?,
            publisher: string_field(&self.publisher)?,
            page_count: count_field(&self.page_count)?,
            read_page: count_field(&self.read_page)?,
            reading: self.reading.as_ref().and_then(Value::as_bool)?,
        })
    }
}

fn string_field(value: &Option<Value>) -> Option<String> {
    value.as_ref().and_then(Value::as_str).map(str::to_string)
}

fn count_field(value: &Option<Value>) -> Option<u32> {
    value
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|count| u32::try_from(count).ok())
}

/// Query parameters accepted by `GET /books`
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1` for books being read, anything else for the others
    pub reading: Option<String>,
    /// `1` for finished books, anything else for the others
    pub finished: Option<String>,
}

/// Compiled form of [`BookQuery`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    name: Option<String>,
    reading: Option<bool>,
    finished: Option<bool>,
}

impl From<&BookQuery> for BookFilter {
    fn from(query: &BookQuery) -> Self {
        Self {
            name: query
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(str::to_lowercase),
            reading: query.reading.as_deref().map(parse_flag),
            finished: query.finished.as_deref().map(parse_flag),
        }
    }
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.reading.is_none() && self.finished.is_none()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(reading) = self.reading {
            if book.reading != reading {
                return false;
            }
        }
        if let Some(finished) = self.finished {
            if book.finished != finished {
                return false;
            }
        }
        match &self.name {
            Some(name) => book.name.to_lowercase().contains(name.as_str()),
            None => true,
        }
    }
}

/// Read a query flag: only a leading integer equal to 1 means `true`
pub fn parse_flag(raw: &str) -> bool {
    parse_leading_int(raw) == Some(1)
}

/// Parse the integer prefix of `raw`, ignoring leading whitespace and any
/// trailing garbage (`"1abc"` reads as 1).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
