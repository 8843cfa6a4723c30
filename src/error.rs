//! Error types shared across the crate.
//!
//! [`ApiError`] covers everything that can go wrong talking to the books
//! service. [`DynError`] and the [`Context`] extension are used by the
//! surrounding plumbing (config files, terminal setup).
use std::fmt::{Display, Formatter};

use crate::api::BookCode;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Failures of the books API client.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Book {0} not found")]
    NotFound(BookCode),

    #[error("Request failed with status {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("Failed to read cover file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot build cover upload: {0}")]
    Upload(String),

    #[error("Book {0} is already held by another user")]
    AlreadyHeld(BookCode),

    #[error("Book {0} is not held by the current user")]
    NotHolder(BookCode),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_source_message() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = res.with_ctx(|| "read settings.conf".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "read settings.conf: no such file");
        assert!(std::error::Error::source(&*err).is_some());
    }

    #[test]
    fn api_error_messages_name_the_book() {
        assert_eq!(ApiError::NotFound(7).to_string(), "Book 7 not found");
        assert!(ApiError::AlreadyHeld(3).to_string().contains("3"));
        assert!(ApiError::NotFound(1).is_not_found());
        assert!(!ApiError::NotHolder(1).is_not_found());
    }

    #[test]
    fn upload_error_is_not_a_decode_failure() {
        let msg = ApiError::Upload("bad mime".into()).to_string();
        assert_eq!(msg, "Cannot build cover upload: bad mime");
        assert!(!msg.contains("decode"));
    }
}
