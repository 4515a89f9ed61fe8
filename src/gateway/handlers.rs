//! Service-level handlers (auth and entry handlers live with their modules)

pub mod health;

pub use health::{HealthResponse, health_check};
