//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ChatPayload, ChatResponse, ContentPayload, ErrorResponse, MaterialResponse,
        ProgressResponse, SeedPayload, TextResponse, TopicPayload, TranslatePayload,
        TranslateResponse,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::generate_material,
        handlers::generate_assignment,
        handlers::generate_quiz,
        handlers::generate_flashcards,
        handlers::generate_lecture_flashcards,
        handlers::translate,
        handlers::get_progress,
        handlers::mark_progress,
        handlers::seed_session,
        handlers::chat,
    ),
    components(
        schemas(
            TopicPayload, ContentPayload, TranslatePayload, TranslateResponse, SeedPayload,
            ChatPayload, ChatResponse, MaterialResponse, TextResponse, ProgressResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "EduGPT API", description = "Study material generation, translation, progress and instructor chat")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/material", post(handlers::generate_material))
        .route("/assignment", post(handlers::generate_assignment))
        .route("/quiz", post(handlers::generate_quiz))
        .route("/flashcards", post(handlers::generate_flashcards))
        .route(
            "/session/flashcards",
            post(handlers::generate_lecture_flashcards),
        )
        .route("/session/seed", post(handlers::seed_session))
        .route("/chat", post(handlers::chat))
        .route("/translate", post(handlers::translate))
        .route(
            "/progress",
            get(handlers::get_progress).post(handlers::mark_progress),
        )
        .route("/ws", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/material",
            "/assignment",
            "/quiz",
            "/flashcards",
            "/session/flashcards",
            "/session/seed",
            "/chat",
            "/translate",
            "/progress",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
