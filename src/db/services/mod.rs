//! The `services` module encapsulates all data access. HTTP handlers work with
//! the domain shapes in `crate::db::models` and never build queries
//! themselves.

pub mod snippet_service;
pub mod tag_service;
pub mod user_service;

pub use snippet_service::{SnippetError, SnippetService};
pub use tag_service::*;
pub use user_service::*;
