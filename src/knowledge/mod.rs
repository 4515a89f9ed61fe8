//! Knowledge entries: title, content and optional category, owned by the
//! user who wrote them.

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{EntryInput, KnowledgeEntry, ListEntriesQuery};
pub use repository::EntryRepository;
