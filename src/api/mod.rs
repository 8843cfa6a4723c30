//! Typed model of the books resource and the service seam used by the app.
//!
//! Field names on the wire are Portuguese (`codigo`, `titulo`, ...); the Rust
//! side uses English names and serde renames.
pub mod client;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ApiError;

pub use client::HttpBooksClient;

pub type BookCode = u64;
pub type UserCode = u64;

/// Role of a library user. Anything the backend sends other than
/// `FUNCIONARIO` is treated as a regular user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Role {
    #[serde(rename = "FUNCIONARIO")]
    Staff,
    #[default]
    #[serde(rename = "USUARIO")]
    Regular,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tipo = Option::<String>::deserialize(deserializer)?;
        Ok(match tipo.as_deref() {
            Some("FUNCIONARIO") => Role::Staff,
            _ => Role::Regular,
        })
    }
}

/// Operations a role may be allowed to perform on the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    CreateBook,
    EditBook,
    DeleteBook,
    TakeOrReturn,
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::CreateBook | Capability::EditBook | Capability::DeleteBook => {
                self == Role::Staff
            }
            Capability::TakeOrReturn => true,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Staff => "FUNCIONARIO",
            Role::Regular => "USUARIO",
        }
    }

    /// Parse a role from config or CLI input. Accepts the wire names and
    /// the English ones.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "funcionario" | "staff" => Some(Role::Staff),
            "usuario" | "regular" | "user" => Some(Role::Regular),
            _ => None,
        }
    }
}

/// The user currently holding a book. The backend also sends the user's
/// credential; it is deliberately not modeled so it is dropped on decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookHolder {
    #[serde(rename = "codigo")]
    pub code: UserCode,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tipo", default)]
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "codigo")]
    pub code: BookCode,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "autores", default)]
    pub authors: Vec<String>,
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<BookHolder>,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.holder.is_none()
    }

    pub fn is_held_by(&self, user: UserCode) -> bool {
        self.holder.as_ref().is_some_and(|h| h.code == user)
    }

    /// Request body that resubmits this record unchanged, holder included.
    pub fn to_request(&self) -> BookRequest {
        BookRequest {
            code: Some(self.code),
            title: self.title.clone(),
            description: self.description.clone(),
            year: self.year,
            authors: self.authors.clone(),
            holder_code: self.holder.as_ref().map(|h| h.code),
        }
    }
}

/// Body of create and update requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    #[serde(rename = "codigo", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<BookCode>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "autores", default)]
    pub authors: Vec<String>,
    #[serde(rename = "codigoUsuario", default, skip_serializing_if = "Option::is_none")]
    pub holder_code: Option<UserCode>,
}

/// List envelope returned by `GET /`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "itens")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Remote books resource.
#[async_trait::async_trait]
pub trait BookService: Send + Sync {
    /// Creates a book, returns the record with its server assigned code
    async fn create_book(&self, request: BookRequest) -> Result<Book, ApiError>;
    /// Replaces the whole record
    async fn update_book(&self, code: BookCode, request: BookRequest) -> Result<Book, ApiError>;
    /// Uploads a cover image as multipart field `file`
    async fn set_cover_image(&self, code: BookCode, file: &Path) -> Result<(), ApiError>;
    /// Lists books, filtered server side when `search` is non-empty
    async fn get_all_books(&self, search: Option<&str>) -> Result<Page<Book>, ApiError>;
    async fn get_book(&self, code: BookCode) -> Result<Book, ApiError>;
    async fn delete_book(&self, code: BookCode) -> Result<(), ApiError>;

    /// Attaches `user` as holder of an available book.
    async fn take_book(&self, book: &Book, user: UserCode) -> Result<Book, ApiError> {
        if !book.is_available() {
            return Err(ApiError::AlreadyHeld(book.code));
        }
        let request = BookRequest {
            holder_code: Some(user),
            ..book.to_request()
        };
        self.update_book(book.code, request).await
    }

    /// Clears the holder of a book currently held by `user`.
    async fn return_book(&self, book: &Book, user: UserCode) -> Result<Book, ApiError> {
        if !book.is_held_by(user) {
            return Err(ApiError::NotHolder(book.code));
        }
        let request = BookRequest {
            holder_code: None,
            ..book.to_request()
        };
        self.update_book(book.code, request).await
    }
}
