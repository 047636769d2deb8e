//! API Models
//!
//! Request and response bodies of the REST API. They derive `utoipa::ToSchema`
//! so the OpenAPI document stays in sync with the handlers.

use edugpt_core::translation::Texts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopicPayload {
    #[schema(example = "Linear Regression")]
    pub topic: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContentPayload {
    #[schema(example = "A vector space is a set closed under addition and scaling.")]
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslatePayload {
    /// A single string or a list of strings.
    #[schema(value_type = Object)]
    pub text: Texts,
    /// Target language code; Urdu ("ur") when omitted.
    #[schema(example = "fr")]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranslateResponse {
    /// Same shape as the request's `text`.
    #[schema(value_type = Object)]
    pub text: Texts,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SeedPayload {
    pub syllabus: String,
    #[schema(example = "Generate a course syllabus to teach the topic: Linear Regression")]
    pub task: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatPayload {
    #[schema(example = "Can you explain gradient descent?")]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaterialResponse {
    pub syllabus: String,
    pub assignment: String,
    pub quiz: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub progress: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
