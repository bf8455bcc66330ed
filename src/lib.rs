//! Page behaviors for the loan desk's server-rendered pages.
//!
//! The server emits plain HTML; these behaviors add the client-side bits:
//! CPF masking, the user menu, the shared delete confirmation, the one-shot
//! feedback dialog and the loan item formset. They run against an in-memory
//! [`dom::Document`] through a [`page::Page`] that dispatches events.

pub mod behaviors;
pub mod config;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod page;
pub mod session;

pub use error::{PageError, Result};
