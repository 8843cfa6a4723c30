//! Requests queued by the catalog state and their results.
//!
//! The state machine in [`AppState`](super::AppState) stays synchronous and
//! free of I/O: it pushes [`Effect`]s, the event loop hands each one to
//! [`spawn`], and the matching [`Outcome`] comes back over a channel.
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{Book, BookCode, BookRequest, BookService, Page, UserCode};
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldKind {
    Take,
    Return,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FetchBooks {
        generation: u64,
        search: Option<String>,
    },
    FetchDetails {
        code: BookCode,
    },
    Create {
        request: BookRequest,
        cover: Option<PathBuf>,
    },
    Update {
        code: BookCode,
        request: BookRequest,
        cover: Option<PathBuf>,
    },
    Take {
        book: Book,
        user: UserCode,
    },
    Return {
        book: Book,
        user: UserCode,
    },
    Delete {
        code: BookCode,
    },
}

#[derive(Debug)]
pub enum Outcome {
    BooksLoaded {
        generation: u64,
        result: Result<Page<Book>, ApiError>,
    },
    DetailsLoaded {
        code: BookCode,
        result: Result<Book, ApiError>,
    },
    Saved {
        kind: SaveKind,
        result: Result<Book, ApiError>,
    },
    HoldingChanged {
        kind: HoldKind,
        code: BookCode,
        result: Result<Book, ApiError>,
    },
    Deleted {
        code: BookCode,
        result: Result<(), ApiError>,
    },
}

/// Save a record, then upload its cover when one was picked.
async fn save_with_cover(
    service: &dyn BookService,
    saved: Result<Book, ApiError>,
    cover: Option<PathBuf>,
) -> Result<Book, ApiError> {
    let book = saved?;
    if let Some(path) = cover {
        service.set_cover_image(book.code, &path).await?;
    }
    Ok(book)
}

/// Run one effect against the service.
pub async fn execute(service: &dyn BookService, effect: Effect) -> Outcome {
    match effect {
        Effect::FetchBooks { generation, search } => Outcome::BooksLoaded {
            generation,
            result: service.get_all_books(search.as_deref()).await,
        },
        Effect::FetchDetails { code } => Outcome::DetailsLoaded {
            code,
            result: service.get_book(code).await,
        },
        Effect::Create { request, cover } => {
            let saved = service.create_book(request).await;
            Outcome::Saved {
                kind: SaveKind::Created,
                result: save_with_cover(service, saved, cover).await,
            }
        }
        Effect::Update {
            code,
            request,
            cover,
        } => {
            let saved = service.update_book(code, request).await;
            Outcome::Saved {
                kind: SaveKind::Updated,
                result: save_with_cover(service, saved, cover).await,
            }
        }
        Effect::Take { book, user } => Outcome::HoldingChanged {
            kind: HoldKind::Take,
            code: book.code,
            result: service.take_book(&book, user).await,
        },
        Effect::Return { book, user } => Outcome::HoldingChanged {
            kind: HoldKind::Return,
            code: book.code,
            result: service.return_book(&book, user).await,
        },
        Effect::Delete { code } => Outcome::Deleted {
            code,
            result: service.delete_book(code).await,
        },
    }
}

/// Run `effect` on the runtime and deliver its outcome to `tx`.
pub fn spawn(
    handle: &Handle,
    service: Arc<dyn BookService>,
    effect: Effect,
    tx: UnboundedSender<Outcome>,
) {
    handle.spawn(async move {
        let outcome = execute(service.as_ref(), effect).await;
        if let Some(err) = outcome_error(&outcome) {
            tracing::warn!(error = %err, "catalog request failed");
        }
        // The receiver only goes away when the UI is shutting down.
        let _ = tx.send(outcome);
    });
}

fn outcome_error(outcome: &Outcome) -> Option<&ApiError> {
    match outcome {
        Outcome::BooksLoaded { result, .. } => result.as_ref().err(),
        Outcome::DetailsLoaded { result, .. }
        | Outcome::Saved { result, .. }
        | Outcome::HoldingChanged { result, .. } => result.as_ref().err(),
        Outcome::Deleted { result, .. } => result.as_ref().err(),
    }
}
