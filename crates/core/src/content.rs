//! Single-shot study material: assignments, quizzes and flashcards.
//!
//! Each call builds a fresh agent, sends one templated prompt and returns the
//! reply. Nothing is shared between calls.

use crate::{
    agent::DiscussAgent,
    error::UpstreamError,
    llm_client::ModelHandle,
    message::Message,
    prompts::{self, Prompts},
};
use std::sync::Arc;
use tracing::{info, warn};

pub const FLASHCARD_WARNING_PREFIX: &str = "⚠️ Flashcard generation failed: ";
pub const NO_LECTURE_WARNING: &str = "⚠️ No lecture found. Please chat with the AI instructor first!";

const ASSIGNMENT_SYSTEM: &str = "Generate assignments based on topics.";
const QUIZ_SYSTEM: &str = "Generate quizzes with answers.";
const FLASHCARD_SYSTEM: &str = "You are a flashcard generation expert.";

/// Single-shot generators for assignments, quizzes and flashcards.
#[derive(Clone)]
pub struct ContentGenerator {
    model: ModelHandle,
    prompts: Arc<Prompts>,
}

impl ContentGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    ///
    /// * `model` - The client and sampling settings used for every request.
    /// * `prompts` - Supplies the `assignment`, `quiz` and `flashcards` templates.
    pub fn new(model: ModelHandle, prompts: Arc<Prompts>) -> Self {
        Self { model, prompts }
    }

    /// Generates an assignment for `topic`.
    ///
    /// # Returns
    ///
    /// The model's text, or the `UpstreamError` of the failed call.
    pub async fn assignment(&self, topic: &str) -> Result<String, UpstreamError> {
        info!(%topic, "Generating assignment");
        let prompt = self.prompts.render(prompts::ASSIGNMENT, &[("topic", topic)]);
        self.ask(ASSIGNMENT_SYSTEM, prompt).await
    }

    pub async fn quiz(&self, topic: &str) -> Result<String, UpstreamError> {
        info!(%topic, "Generating quiz");
        let prompt = self.prompts.render(prompts::QUIZ, &[("topic", topic)]);
        self.ask(QUIZ_SYSTEM, prompt).await
    }

    /// Generates 5-10 question/answer cards from lecture text.
    pub async fn flashcards(&self, content: &str) -> Result<String, UpstreamError> {
        info!(content_len = content.len(), "Generating flashcards");
        let prompt = self.prompts.render(prompts::FLASHCARDS, &[("content", content)]);
        self.ask(FLASHCARD_SYSTEM, prompt).await
    }

    /// Like [`ContentGenerator::flashcards`], but a failure becomes a warning
    /// text instead of an error.
    pub async fn flashcards_or_warning(&self, content: &str) -> String {
        match self.flashcards(content).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(error = %e, "Flashcard generation failed");
                format!("{FLASHCARD_WARNING_PREFIX}{e}")
            }
        }
    }

    /// Flashcards for a recorded lecture; a blank lecture is reported without
    /// calling the model.
    pub async fn lecture_flashcards(&self, lecture: &str) -> String {
        if lecture.trim().is_empty() {
            return NO_LECTURE_WARNING.to_string();
        }
        self.flashcards_or_warning(lecture).await
    }

    async fn ask(&self, system: &str, prompt: String) -> Result<String, UpstreamError> {
        let mut agent = DiscussAgent::new(Message::system(system), self.model.clone());
        Ok(agent.step(Message::human(prompt)).await?.into_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{llm_client::MockLLMClient, message::Role};

    fn generator(mock: MockLLMClient) -> ContentGenerator {
        ContentGenerator::new(
            ModelHandle::new(Arc::new(mock), "test-model", 0.7),
            Arc::new(Prompts::default()),
        )
    }

    #[tokio::test]
    async fn test_assignment_uses_topic_template() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete()
            .withf(|settings, messages| {
                settings.temperature == 0.7
                    && messages.len() == 2
                    && messages[0].content() == ASSIGNMENT_SYSTEM
                    && messages[1].role() == Role::Human
                    && messages[1].content().contains("topic: 'Photosynthesis'")
            })
            .times(1)
            .returning(|_, _| Ok(Message::ai("Assignment 1")));

        let text = generator(mock).assignment("Photosynthesis").await.unwrap();
        assert_eq!(text, "Assignment 1");
    }

    #[tokio::test]
    async fn test_quiz_uses_topic_template() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete()
            .withf(|_, messages| {
                messages[0].content() == QUIZ_SYSTEM
                    && messages[1].content().contains("Create a quiz for the topic: 'Rust'")
            })
            .times(1)
            .returning(|_, _| Ok(Message::ai("Q1 ...")));

        assert_eq!(generator(mock).quiz("Rust").await.unwrap(), "Q1 ...");
    }

    #[tokio::test]
    async fn test_generators_do_not_share_state() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete()
            .withf(|_, messages| messages.len() == 2)
            .times(3)
            .returning(|_, _| Ok(Message::ai("text")));

        let generator = generator(mock);
        generator.assignment("A").await.unwrap();
        generator.quiz("A").await.unwrap();
        generator.flashcards("lecture").await.unwrap();
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete()
            .returning(|_, _| Err(UpstreamError::Llm("503".into())));

        let generator = generator(mock);
        assert!(generator.assignment("A").await.is_err());
        assert!(generator.quiz("A").await.is_err());
        assert!(generator.flashcards("A").await.is_err());
    }

    #[tokio::test]
    async fn test_flashcards_or_warning() {
        let mut ok = MockLLMClient::new();
        ok.expect_complete()
            .withf(|_, messages| messages[1].content().contains("Lecture:\nNewton's laws"))
            .returning(|_, _| Ok(Message::ai("Q: F?\nA: ma")));
        assert_eq!(
            generator(ok).flashcards_or_warning("Newton's laws").await,
            "Q: F?\nA: ma"
        );

        let mut failing = MockLLMClient::new();
        failing
            .expect_complete()
            .returning(|_, _| Err(UpstreamError::Llm("quota exceeded".into())));
        let text = generator(failing).flashcards_or_warning("Newton's laws").await;
        assert_eq!(
            text,
            "⚠️ Flashcard generation failed: LLM request failed: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_blank_lecture_skips_model() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete().times(0);

        let text = generator(mock).lecture_flashcards(" \n ").await;
        assert_eq!(text, NO_LECTURE_WARNING);
    }
}
