//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources like the LLM-backed services and the teaching session.

use crate::config::Config;
use edugpt_core::{
    content::ContentGenerator,
    curriculum::{CurriculumService, NegotiatedCurriculumService},
    instructor::TeachingSession,
    llm_client::{LLMClient, ModelHandle},
    progress::ProgressStore,
    prompts::Prompts,
    translation::{MultilingualSupport, Translator},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Sampling temperature for the instructor and the single-shot generators.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
pub struct AppState {
    pub curriculum_service: Arc<dyn CurriculumService>,
    pub content: ContentGenerator,
    pub translator: MultilingualSupport,
    pub progress: Arc<ProgressStore>,
    /// The one teaching session of this process; the lock serializes turns.
    pub session: Arc<Mutex<TeachingSession>>,
    pub typing_delay: Duration,
}

impl AppState {
    pub fn new(
        config: &Config,
        llm_client: Arc<dyn LLMClient>,
        translator: Arc<dyn Translator>,
        prompts: Arc<Prompts>,
    ) -> Self {
        let model = ModelHandle::new(llm_client, config.chat_model.clone(), DEFAULT_TEMPERATURE);
        let session = TeachingSession::new(model.clone(), &prompts).with_window(config.history_window);

        Self {
            curriculum_service: Arc::new(NegotiatedCurriculumService::new(
                model.clone(),
                prompts.clone(),
            )),
            content: ContentGenerator::new(model, prompts),
            translator: MultilingualSupport::new(translator),
            progress: Arc::new(ProgressStore::new(config.progress_path.clone())),
            session: Arc::new(Mutex::new(session)),
            typing_delay: config.typing_delay,
        }
    }
}
