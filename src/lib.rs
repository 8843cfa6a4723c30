//! Library crate for library-catalog.
//!
//! This crate exposes the building blocks of the TUI:
//! - Typed client for the books REST resource (`api`)
//! - Catalog state, effects and update loop (`app`)
//! - Error and result types (`error`)
//! - Search debouncing helpers (`search`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `library-catalog` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod search;
pub mod ui;

pub use error::{ApiError, DynError, Result};
