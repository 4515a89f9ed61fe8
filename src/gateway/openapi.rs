//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8000/docs`
//! - OpenAPI JSON: `http://localhost:8000/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::ApiResponse;
use crate::knowledge::{EntryInput, KnowledgeEntry};
use crate::user_auth::{LoginRequest, RegisterRequest, TokenResponse, UserOut};

/// `Authorization: Bearer <access_token>` from `POST /auth/token`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token returned by POST /auth/token"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Knowledge Base API",
        version = "0.1.0",
        description = "A tiny, secure knowledge base for domain experts.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::knowledge::handlers::list_entries,
        crate::knowledge::handlers::create_entry,
        crate::knowledge::handlers::get_entry,
        crate::knowledge::handlers::update_entry,
        crate::knowledge::handlers::delete_entry,
    ),
    components(
        schemas(
            ApiResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            UserOut,
            TokenResponse,
            EntryInput,
            KnowledgeEntry,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Knowledge", description = "Knowledge entries (bearer token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
