use anyhow::Context as _;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::api::{Book, BookCode, BookRequest, BookService, Page};
use crate::error::ApiError;

/// HTTP implementation of [`BookService`].
///
/// `base_url` points at the books collection itself, e.g.
/// `http://localhost:8080/livros`.
pub struct HttpBooksClient {
    base_url: String,
    client: ClientWithMiddleware,
}

impl HttpBooksClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    fn item_url(&self, code: BookCode) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

/// Map a non-success response to an [`ApiError`]; 404 becomes `NotFound`.
async fn check_status(
    response: reqwest::Response,
    code: Option<BookCode>,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND
        && let Some(code) = code
    {
        return Err(ApiError::NotFound(code));
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, message })
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    code: Option<BookCode>,
) -> Result<T, ApiError> {
    let response = check_status(response, code).await?;
    Ok(response.json().await?)
}

fn cover_mime(file: &Path) -> &'static str {
    match file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Multipart `file` part for a cover image.
fn cover_part(bytes: Vec<u8>, file_name: String, file: &Path) -> Result<Part, ApiError> {
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(cover_mime(file))
        .map_err(|e| ApiError::Upload(e.to_string()))
}

#[async_trait::async_trait]
impl BookService for HttpBooksClient {
    /// Calls POST / endpoint
    async fn create_book(&self, request: BookRequest) -> Result<Book, ApiError> {
        tracing::debug!(title = %request.title, "creating book");
        let response = self
            .client
            .post(self.collection_url())
            .json(&request)
            .send()
            .await?;
        decode(response, None).await
    }

    /// Calls PUT /{code} endpoint
    async fn update_book(&self, code: BookCode, request: BookRequest) -> Result<Book, ApiError> {
        tracing::debug!(code, holder = ?request.holder_code, "updating book");
        let response = self
            .client
            .put(self.item_url(code))
            .json(&request)
            .send()
            .await?;
        decode(response, Some(code)).await
    }

    /// Calls PATCH /{code} endpoint with a multipart body
    async fn set_cover_image(&self, code: BookCode, file: &Path) -> Result<(), ApiError> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cover".to_string());
        tracing::debug!(code, file = %file_name, size = bytes.len(), "uploading cover image");
        let part = cover_part(bytes, file_name, file)?;
        let form = Form::new().part("file", part);
        let response = self
            .client
            .patch(self.item_url(code))
            .multipart(form)
            .send()
            .await?;
        check_status(response, Some(code)).await?;
        Ok(())
    }

    /// Calls GET / endpoint, with `?search=` only for a non-empty term
    async fn get_all_books(&self, search: Option<&str>) -> Result<Page<Book>, ApiError> {
        let mut request = self.client.get(self.collection_url());
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            request = request.query(&[("search", term)]);
        }
        let response = request.send().await?;
        let page: Page<Book> = decode(response, None).await?;
        tracing::debug!(search = ?search, count = page.items.len(), "listed books");
        Ok(page)
    }

    /// Calls GET /{code} endpoint
    async fn get_book(&self, code: BookCode) -> Result<Book, ApiError> {
        let response = self.client.get(self.item_url(code)).send().await?;
        decode(response, Some(code)).await
    }

    /// Calls DELETE /{code} endpoint
    async fn delete_book(&self, code: BookCode) -> Result<(), ApiError> {
        tracing::debug!(code, "deleting book");
        let response = self.client.delete(self.item_url(code)).send().await?;
        check_status(response, Some(code)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_ignore_trailing_slash() {
        let client = HttpBooksClient::new("http://localhost:8080/livros/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/livros");
        assert_eq!(client.collection_url(), "http://localhost:8080/livros/");
        assert_eq!(client.item_url(12), "http://localhost:8080/livros/12");
    }

    #[test]
    fn cover_mime_by_extension() {
        assert_eq!(cover_mime(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(cover_mime(Path::new("cover.png")), "image/png");
        assert_eq!(cover_mime(Path::new("cover")), "application/octet-stream");
    }

    #[test]
    fn cover_part_builds_for_every_extension() {
        for name in ["a.jpg", "a.jpeg", "a.png", "a.webp", "a.gif", "a.bin", "a"] {
            let path = Path::new(name);
            assert!(
                cover_part(vec![1, 2, 3], name.to_string(), path).is_ok(),
                "{name}"
            );
        }
    }
}
