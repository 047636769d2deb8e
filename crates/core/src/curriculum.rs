//! Curriculum Generation Service
//!
//! Turns a topic into a course syllabus by scripting a conversation between two
//! agents. An "Instructor" (the assistant role) and a "Teaching Assistant" (the
//! user role) work on a task that a third agent first sharpens into one
//! sentence; a fourth agent then condenses their exchange into the syllabus.

use crate::{
    agent::DiscussAgent,
    error::UpstreamError,
    llm_client::ModelHandle,
    message::Message,
    prompts::{self, Prompts},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, info};

/// Emitted by the user role once it considers the task solved.
pub const TASK_DONE: &str = "<TASK_DONE>";

const TASK_SPECIFIER_SYSTEM: &str = "You can make a task more specific.";
const INTRODUCTION_SUFFIX: &str = ". Now start to give me introductions one by one.";
const USER_LOG_PREFIX: &str = "AI User: ";
const ASSISTANT_LOG_PREFIX: &str = "AI Assistant: ";

/// A generated course syllabus. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Syllabus(String);

impl Syllabus {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Syllabus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The canonical task handed to the negotiation for a topic.
pub fn syllabus_task(topic: &str) -> String {
    format!("Generate a course syllabus to teach the topic: {topic}")
}

/// Defines the contract for any service that can produce a syllabus.
///
/// The API and the CLI only see this trait, so a negotiated syllabus and a
/// fixed mock one are interchangeable when wiring the application.
#[async_trait]
pub trait CurriculumService: Send + Sync {
    /// Produces a syllabus for `topic`, working towards the free-text `task`.
    ///
    /// # Arguments
    ///
    /// * `topic` - The subject the course is about.
    /// * `task` - What the syllabus should achieve, usually from `syllabus_task`.
    ///
    /// # Returns
    ///
    /// The syllabus text, or the `UpstreamError` of the first failed LLM call.
    async fn generate_syllabus(&self, topic: &str, task: &str) -> Result<Syllabus, UpstreamError>;
}

/// Knobs of the negotiation. The defaults reproduce the classic two-role
/// setup: a 50-word task, at most five exchanges.
#[derive(Debug, Clone)]
pub struct NegotiationSettings {
    pub assistant_role_name: String,
    pub user_role_name: String,
    pub word_limit: usize,
    pub max_turns: usize,
    pub specifier_temperature: f32,
    pub exchange_temperature: f32,
    pub summarizer_temperature: f32,
}

impl Default for NegotiationSettings {
    fn default() -> Self {
        Self {
            assistant_role_name: "Instructor".to_string(),
            user_role_name: "Teaching Assistant".to_string(),
            word_limit: 50,
            max_turns: 5,
            specifier_temperature: 1.0,
            exchange_temperature: 0.2,
            summarizer_temperature: 1.0,
        }
    }
}

/// Everything a negotiation produced, in the order it was produced.
#[derive(Debug, Clone)]
pub struct Negotiation {
    pub specified_task: String,
    /// `"AI User: …"` / `"AI Assistant: …"` lines, alternating.
    pub conversation: Vec<String>,
    pub syllabus: Syllabus,
}

/// A `CurriculumService` that lets two scripted agents negotiate the syllabus.
pub struct NegotiatedCurriculumService {
    model: ModelHandle,
    prompts: Arc<Prompts>,
    settings: NegotiationSettings,
}

impl NegotiatedCurriculumService {
    /// Creates a service with the default `NegotiationSettings`.
    ///
    /// # Arguments
    ///
    /// * `model` - The client, model and base temperature shared by every agent.
    /// * `prompts` - Templates for the specifier, both inception prompts and the summarizer.
    pub fn new(model: ModelHandle, prompts: Arc<Prompts>) -> Self {
        Self::with_settings(model, prompts, NegotiationSettings::default())
    }

    /// Creates a service with explicit negotiation settings.
    ///
    /// # Arguments
    ///
    /// * `model` - The client, model and base temperature shared by every agent.
    /// * `prompts` - Templates for the specifier, both inception prompts and the summarizer.
    /// * `settings` - Turn budget, word limit, role names and per-step temperatures.
    pub fn with_settings(
        model: ModelHandle,
        prompts: Arc<Prompts>,
        settings: NegotiationSettings,
    ) -> Self {
        Self {
            model,
            prompts,
            settings,
        }
    }

    pub fn settings(&self) -> &NegotiationSettings {
        &self.settings
    }

    /// Runs specify, role-prime, exchange and summarize. Any failing call aborts
    /// the whole negotiation.
    pub async fn negotiate(&self, topic: &str, task: &str) -> Result<Negotiation, UpstreamError> {
        info!(%topic, "Starting syllabus negotiation");

        let specified_task = self.specify_task(task).await?;
        debug!(%specified_task, "Task specified");

        let conversation = self.exchange(&specified_task).await?;
        info!(entries = conversation.len(), "Role-play exchange finished");

        let syllabus = self.summarize(topic, &conversation).await?;
        info!(%topic, chars = syllabus.as_str().len(), "Syllabus generated");

        Ok(Negotiation {
            specified_task,
            conversation,
            syllabus,
        })
    }

    async fn specify_task(&self, task: &str) -> Result<String, UpstreamError> {
        let word_limit = self.settings.word_limit.to_string();
        let prompt = self.prompts.render(
            prompts::TASK_SPECIFIER,
            &[
                ("assistant_role_name", self.settings.assistant_role_name.as_str()),
                ("user_role_name", self.settings.user_role_name.as_str()),
                ("task", task),
                ("word_limit", word_limit.as_str()),
            ],
        );
        let mut specifier = DiscussAgent::new(
            Message::system(TASK_SPECIFIER_SYSTEM),
            self.model.with_temperature(self.settings.specifier_temperature),
        );
        Ok(specifier.step(Message::human(prompt)).await?.into_content())
    }

    fn inception_messages(&self, specified_task: &str) -> (Message, Message) {
        let vars = [
            ("assistant_role_name", self.settings.assistant_role_name.as_str()),
            ("user_role_name", self.settings.user_role_name.as_str()),
            ("task", specified_task),
        ];
        (
            Message::system(self.prompts.render(prompts::ASSISTANT_INCEPTION, &vars)),
            Message::system(self.prompts.render(prompts::USER_INCEPTION, &vars)),
        )
    }

    async fn exchange(&self, specified_task: &str) -> Result<Vec<String>, UpstreamError> {
        let (assistant_sys, user_sys) = self.inception_messages(specified_task);
        let exchange_model = self.model.with_temperature(self.settings.exchange_temperature);

        let mut assistant_agent = DiscussAgent::new(assistant_sys, exchange_model.clone());
        let mut user_agent = DiscussAgent::new(user_sys.clone(), exchange_model);
        assistant_agent.reset();
        user_agent.reset();

        let mut assistant_msg =
            Message::human(format!("{}{}", user_sys.content(), INTRODUCTION_SUFFIX));
        let mut conversation = Vec::with_capacity(self.settings.max_turns * 2);

        for turn in 1..=self.settings.max_turns {
            let user_reply = user_agent.step(assistant_msg).await?.into_content();
            conversation.push(format!("{USER_LOG_PREFIX}{user_reply}"));

            if user_reply.contains(TASK_DONE) {
                info!(turn, "User role signalled task completion");
                break;
            }

            let assistant_reply = assistant_agent
                .step(Message::human(user_reply))
                .await?
                .into_content();
            conversation.push(format!("{ASSISTANT_LOG_PREFIX}{assistant_reply}"));
            assistant_msg = Message::human(assistant_reply);
            debug!(turn, "Exchange turn completed");
        }

        Ok(conversation)
    }

    async fn summarize(&self, topic: &str, conversation: &[String]) -> Result<Syllabus, UpstreamError> {
        let history = conversation.join("\n");
        let prompt = self.prompts.render(
            prompts::SUMMARIZER,
            &[
                ("assistant_role_name", self.settings.assistant_role_name.as_str()),
                ("user_role_name", self.settings.user_role_name.as_str()),
                ("conversation_history", history.as_str()),
            ],
        );
        let mut summarizer = DiscussAgent::new(
            Message::system(format!(
                "Summarize this conversation into a {topic} course syllabus form"
            )),
            self.model.with_temperature(self.settings.summarizer_temperature),
        );
        let summary = summarizer.step(Message::human(prompt)).await?;
        Ok(Syllabus::new(summary.into_content()))
    }
}

#[async_trait]
impl CurriculumService for NegotiatedCurriculumService {
    async fn generate_syllabus(&self, topic: &str, task: &str) -> Result<Syllabus, UpstreamError> {
        Ok(self.negotiate(topic, task).await?.syllabus)
    }
}

/// A mock `CurriculumService` for development and integration testing.
pub struct MockCurriculumService;

#[async_trait]
impl CurriculumService for MockCurriculumService {
    /// Returns a fixed four-unit syllabus for any topic.
    async fn generate_syllabus(&self, topic: &str, _task: &str) -> Result<Syllabus, UpstreamError> {
        Ok(Syllabus::new(format!(
            "Course: {topic}\n1. Introduction to {topic}\n2. Core Concepts\n3. Practical Applications\n4. Advanced Topics"
        )))
    }
}
