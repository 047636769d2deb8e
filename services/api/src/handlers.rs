//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for study material,
//! translation, progress tracking and the instructor chat.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use edugpt_core::{Syllabus, UpstreamError, curriculum::syllabus_task};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    models::{
        ChatPayload, ChatResponse, ContentPayload, ErrorResponse, MaterialResponse,
        ProgressResponse, SeedPayload, TextResponse, TopicPayload, TranslatePayload,
        TranslateResponse,
    },
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                if let Some(upstream) = err.downcast_ref::<UpstreamError>() {
                    warn!("Upstream call failed: {}", upstream);
                    let message = upstream.to_string();
                    return (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message }))
                        .into_response();
                }
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

fn require_topic(topic: &str) -> Result<&str, ApiError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ApiError::BadRequest("Topic must not be empty".to_string()));
    }
    Ok(topic)
}

/// Generate a syllabus, an assignment and a quiz for a topic.
///
/// The generated syllabus also seeds the instructor chat.
#[utoipa::path(
    post,
    path = "/material",
    request_body = TopicPayload,
    responses(
        (status = 200, description = "Study material generated", body = MaterialResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 502, description = "LLM call failed", body = ErrorResponse)
    )
)]
pub async fn generate_material(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let topic = require_topic(&payload.topic)?;
    let task = syllabus_task(topic);

    let syllabus = state
        .curriculum_service
        .generate_syllabus(topic, &task)
        .await?;
    let assignment = state.content.assignment(topic).await?;
    let quiz = state.content.quiz(topic).await?;

    state.session.lock().await.seed(syllabus.clone(), task);
    info!(%topic, "Study material generated and teaching session seeded");

    Ok(Json(MaterialResponse {
        syllabus: syllabus.into_string(),
        assignment,
        quiz,
    }))
}

/// Generate an assignment for a topic.
#[utoipa::path(
    post,
    path = "/assignment",
    request_body = TopicPayload,
    responses(
        (status = 200, description = "Assignment generated", body = TextResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 502, description = "LLM call failed", body = ErrorResponse)
    )
)]
pub async fn generate_assignment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<TextResponse>, ApiError> {
    let topic = require_topic(&payload.topic)?;
    let text = state.content.assignment(topic).await?;
    Ok(Json(TextResponse { text }))
}

/// Generate a quiz for a topic.
#[utoipa::path(
    post,
    path = "/quiz",
    request_body = TopicPayload,
    responses(
        (status = 200, description = "Quiz generated", body = TextResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 502, description = "LLM call failed", body = ErrorResponse)
    )
)]
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<TextResponse>, ApiError> {
    let topic = require_topic(&payload.topic)?;
    let text = state.content.quiz(topic).await?;
    Ok(Json(TextResponse { text }))
}

/// Generate flashcards from arbitrary content. Failures are reported in the text.
#[utoipa::path(
    post,
    path = "/flashcards",
    request_body = ContentPayload,
    responses(
        (status = 200, description = "Flashcards or a warning", body = TextResponse)
    )
)]
pub async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContentPayload>,
) -> Json<TextResponse> {
    let text = state.content.flashcards_or_warning(&payload.content).await;
    Json(TextResponse { text })
}

/// Generate flashcards from the instructor conversation so far.
#[utoipa::path(
    post,
    path = "/session/flashcards",
    responses(
        (status = 200, description = "Flashcards or a warning", body = TextResponse)
    )
)]
pub async fn generate_lecture_flashcards(
    State(state): State<Arc<AppState>>,
) -> Json<TextResponse> {
    let lecture = state.session.lock().await.lecture();
    let text = state.content.lecture_flashcards(&lecture).await;
    Json(TextResponse { text })
}

/// Translate one text or a list of texts.
#[utoipa::path(
    post,
    path = "/translate",
    request_body = TranslatePayload,
    responses(
        (status = 200, description = "Translated text, same shape as the input", body = TranslateResponse)
    )
)]
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslatePayload>,
) -> Json<TranslateResponse> {
    let text = state
        .translator
        .translate_many(payload.text, payload.language.as_deref())
        .await;
    Json(TranslateResponse { text })
}

/// Get the completion status of every tracked topic.
#[utoipa::path(
    get,
    path = "/progress",
    responses(
        (status = 200, description = "Progress map", body = ProgressResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let progress = state.progress.get_all().await?;
    Ok(Json(ProgressResponse { progress }))
}

/// Mark a topic as completed and return the updated progress as JSON text.
#[utoipa::path(
    post,
    path = "/progress",
    request_body = TopicPayload,
    responses(
        (status = 200, description = "Updated progress", body = TextResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn mark_progress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TopicPayload>,
) -> Result<Json<TextResponse>, ApiError> {
    let topic = require_topic(&payload.topic)?;
    let text = state.progress.mark_completed(topic).await?;
    Ok(Json(TextResponse { text }))
}

/// Replace the teaching session with a new syllabus and task.
#[utoipa::path(
    post,
    path = "/session/seed",
    request_body = SeedPayload,
    responses(
        (status = 204, description = "Session seeded")
    )
)]
pub async fn seed_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SeedPayload>,
) -> StatusCode {
    state
        .session
        .lock()
        .await
        .seed(Syllabus::new(payload.syllabus), payload.task);
    StatusCode::NO_CONTENT
}

/// Send a learner message and receive the instructor's reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Instructor reply", body = ChatResponse),
        (status = 502, description = "LLM call failed", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut session = state.session.lock().await;
    session.human_step(&payload.text);
    let reply = session.instructor_step().await?;
    Ok(Json(ChatResponse { reply }))
}
