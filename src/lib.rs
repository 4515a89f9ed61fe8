//! Knowledge Base - a small authenticated knowledge store
//!
//! Users register, exchange credentials for a short-lived bearer token, and
//! use that token to read and write knowledge entries.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber and rolling file output
//! - [`db`] - SQLite pool and schema
//! - [`user_auth`] - registration, password hashing, token issue / verify
//! - [`knowledge`] - entry storage and CRUD handlers
//! - [`gateway`] - HTTP router, shared state, error envelope, OpenAPI

pub mod config;
pub mod db;
pub mod gateway;
pub mod knowledge;
pub mod logging;
pub mod user_auth;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use gateway::{build_router, run_server};
pub use knowledge::{EntryInput, KnowledgeEntry};
pub use user_auth::{AuthError, AuthenticatedUser, UserAuthService};
