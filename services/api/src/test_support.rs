//! Canned collaborators for exercising handlers without network access.

use crate::{config::Config, state::AppState};
use async_trait::async_trait;
use edugpt_core::{
    curriculum::MockCurriculumService,
    instructor::HistoryWindow,
    llm_client::{LLMClient, ModelSettings},
    prompts::Prompts,
    translation::Translator,
    Message, UpstreamError,
};
use std::{
    net::SocketAddr,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const INSTRUCTOR_REPLY: &str = "Welcome to lesson one. <END_OF_TURN>";

/// Replies according to which generator is calling, recognised by the system message.
#[derive(Default)]
pub struct CannedLlm {
    pub fail: bool,
    pub calls: Mutex<Vec<Vec<Message>>>,
}

impl CannedLlm {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for CannedLlm {
    async fn complete(
        &self,
        _settings: &ModelSettings,
        messages: &[Message],
    ) -> Result<Message, UpstreamError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(UpstreamError::Llm("offline".to_string()));
        }
        let first = messages[0].content();
        let reply = if first.starts_with("Generate assignments") {
            "ASSIGNMENT"
        } else if first.starts_with("Generate quizzes") {
            "QUIZ"
        } else if first.contains("flashcard") {
            "Q: What?\nA: That."
        } else {
            INSTRUCTOR_REPLY
        };
        Ok(Message::ai(reply))
    }
}

pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, dest: &str) -> Result<String, UpstreamError> {
        Ok(format!("{dest}:{text}"))
    }
}

pub fn test_config(progress_path: &Path) -> Config {
    Config {
        bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
        api_key: "test-key".to_string(),
        api_base: "http://localhost/v1".to_string(),
        chat_model: "test-model".to_string(),
        log_level: tracing::Level::DEBUG,
        prompts_path: None,
        progress_path: progress_path.to_path_buf(),
        history_window: HistoryWindow::Unbounded,
        typing_delay: Duration::ZERO,
        translate_api_base: "http://localhost/translate".to_string(),
    }
}

/// An `AppState` backed by `llm`, the tagging translator and the mock curriculum.
pub fn test_state(llm: Arc<CannedLlm>, progress_path: &Path) -> Arc<AppState> {
    let mut state = AppState::new(
        &test_config(progress_path),
        llm,
        Arc::new(TaggingTranslator),
        Arc::new(Prompts::default()),
    );
    state.curriculum_service = Arc::new(MockCurriculumService);
    Arc::new(state)
}
