//! Instructor Turn Loop
//!
//! A teaching session is seeded with a syllabus and then alternates between
//! learner turns, which are recorded locally, and instructor turns, which replay
//! the syllabus and the conversation so far into a single prompt.

use crate::{
    curriculum::Syllabus,
    error::UpstreamError,
    llm_client::ModelHandle,
    message::Message,
    prompts::{self, Prompts},
};
use tracing::{debug, info};

/// Marks the end of one speaker's turn in the conversation history.
pub const END_OF_TURN: &str = "<END_OF_TURN>";

/// Which part of the history is replayed into each instructor prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Every entry, from the first turn on.
    #[default]
    Unbounded,
    /// Only the most recent `n` entries.
    LastTurns(usize),
}

impl HistoryWindow {
    pub fn select<'a>(&self, history: &'a [String]) -> &'a [String] {
        match *self {
            HistoryWindow::Unbounded => history,
            HistoryWindow::LastTurns(n) => &history[history.len().saturating_sub(n)..],
        }
    }
}

/// The state of one instructor/learner conversation.
pub struct TeachingSession {
    syllabus: Syllabus,
    task: String,
    conversation_history: Vec<String>,
    model: ModelHandle,
    prompt_template: String,
    window: HistoryWindow,
}

impl TeachingSession {
    /// Creates an unseeded session (empty syllabus and task).
    pub fn new(model: ModelHandle, templates: &Prompts) -> Self {
        Self {
            syllabus: Syllabus::default(),
            task: String::new(),
            conversation_history: Vec::new(),
            model,
            prompt_template: templates
                .get(prompts::INSTRUCTOR)
                .unwrap_or_default()
                .to_string(),
            window: HistoryWindow::default(),
        }
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    /// Starts over with a new syllabus, dropping the previous conversation.
    pub fn seed(&mut self, syllabus: Syllabus, task: impl Into<String>) {
        self.syllabus = syllabus;
        self.task = task.into();
        self.conversation_history.clear();
        info!(task = %self.task, "Teaching session seeded");
    }

    /// Records a learner utterance. No model call is made.
    pub fn human_step(&mut self, text: &str) {
        self.conversation_history.push(format!("{} {END_OF_TURN}", text.trim()));
    }

    /// Produces the instructor's next utterance from the syllabus and history.
    ///
    /// The raw reply is stored; the returned text has one trailing
    /// `<END_OF_TURN>` removed, while occurrences inside the text are kept.
    pub async fn instructor_step(&mut self) -> Result<String, UpstreamError> {
        let prompt = self.build_prompt();
        debug!(
            history_len = self.conversation_history.len(),
            prompt_len = prompt.len(),
            "Requesting instructor turn"
        );

        let reply = self
            .model
            .complete(&[Message::human(prompt)])
            .await?
            .into_content();
        let utterance = strip_end_of_turn(&reply).to_string();
        self.conversation_history.push(reply);
        Ok(utterance)
    }

    fn build_prompt(&self) -> String {
        let history = self.window.select(&self.conversation_history).join("\n");
        prompts::render_template(
            &self.prompt_template,
            &[
                ("syllabus", self.syllabus.as_str()),
                ("topic", self.task.as_str()),
                ("conversation_history", history.as_str()),
            ],
        )
    }

    pub fn syllabus(&self) -> &Syllabus {
        &self.syllabus
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn conversation_history(&self) -> &[String] {
        &self.conversation_history
    }

    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    /// The whole conversation as one text, the raw material for flashcards.
    pub fn lecture(&self) -> String {
        self.conversation_history.join("\n")
    }
}

fn strip_end_of_turn(reply: &str) -> &str {
    let trimmed = reply.trim_end();
    trimmed
        .strip_suffix(END_OF_TURN)
        .map(str::trim_end)
        .unwrap_or(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockLLMClient;
    use std::sync::{Arc, Mutex};

    fn capturing_model(reply: &'static str, seen: Arc<Mutex<Vec<String>>>) -> ModelHandle {
        let mut mock = MockLLMClient::new();
        mock.expect_complete().returning(move |_, messages| {
            assert_eq!(messages.len(), 1);
            seen.lock().unwrap().push(messages[0].content().to_string());
            Ok(Message::ai(reply))
        });
        ModelHandle::new(Arc::new(mock), "test-model", 0.7)
    }

    fn template_prompts() -> Prompts {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("instructor.md"),
            "S[{syllabus}] T[{topic}] H[{conversation_history}]",
        )
        .unwrap();
        Prompts::load_dir(dir.path()).unwrap()
    }

    #[tokio::test]
    async fn test_seed_then_instructor_step_sends_empty_history() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session =
            TeachingSession::new(capturing_model("Welcome!", seen.clone()), &template_prompts());
        session.seed(Syllabus::new("1. Vectors"), "teach vectors");

        let reply = session.instructor_step().await.unwrap();
        assert_eq!(reply, "Welcome!");
        assert_eq!(seen.lock().unwrap()[0], "S[1. Vectors] T[teach vectors] H[]");
    }

    #[tokio::test]
    async fn test_history_lengths_around_instructor_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session =
            TeachingSession::new(capturing_model("Next topic", seen.clone()), &template_prompts());
        session.seed(Syllabus::new("syl"), "task");
        session.instructor_step().await.unwrap();

        session.human_step("  first question ");
        session.human_step("second question");
        assert_eq!(session.conversation_history().len(), 3);

        session.instructor_step().await.unwrap();
        assert_eq!(session.conversation_history().len(), 4);
        assert_eq!(
            seen.lock().unwrap()[1],
            "S[syl] T[task] H[Next topic\nfirst question <END_OF_TURN>\nsecond question <END_OF_TURN>]"
        );
    }

    #[tokio::test]
    async fn test_reply_stored_raw_and_returned_stripped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = TeachingSession::new(
            capturing_model("A <END_OF_TURN> B <END_OF_TURN>\n", seen),
            &Prompts::default(),
        );
        session.seed(Syllabus::new("syl"), "task");

        let reply = session.instructor_step().await.unwrap();
        assert_eq!(reply, "A <END_OF_TURN> B");
        assert_eq!(
            session.conversation_history()[0],
            "A <END_OF_TURN> B <END_OF_TURN>\n"
        );
    }

    #[tokio::test]
    async fn test_reseed_clears_history() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = TeachingSession::new(capturing_model("x", seen), &Prompts::default());
        session.seed(Syllabus::new("old"), "old task");
        session.human_step("hello");
        session.instructor_step().await.unwrap();

        session.seed(Syllabus::new("new"), "new task");
        assert!(session.conversation_history().is_empty());
        assert_eq!(session.syllabus().as_str(), "new");
        assert_eq!(session.task(), "new task");
        assert!(session.lecture().is_empty());
    }

    #[tokio::test]
    async fn test_builtin_prompt_embeds_syllabus_and_history() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session =
            TeachingSession::new(capturing_model("ok", seen.clone()), &Prompts::default());
        session.seed(Syllabus::new("Week 1: Limits"), "teach calculus");
        session.human_step("What is a limit?");
        session.instructor_step().await.unwrap();

        let prompt = seen.lock().unwrap()[0].clone();
        assert!(prompt.contains("Week 1: Limits"));
        assert!(prompt.contains("teach calculus"));
        assert!(prompt.contains("What is a limit? <END_OF_TURN>"));
    }

    #[tokio::test]
    async fn test_window_limits_replayed_history_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = TeachingSession::new(capturing_model("r", seen.clone()), &template_prompts())
            .with_window(HistoryWindow::LastTurns(2));
        session.seed(Syllabus::new("s"), "t");
        session.human_step("one");
        session.human_step("two");
        session.human_step("three");

        session.instructor_step().await.unwrap();
        assert_eq!(
            seen.lock().unwrap()[0],
            "S[s] T[t] H[two <END_OF_TURN>\nthree <END_OF_TURN>]"
        );
        assert_eq!(session.conversation_history().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_instructor_step_leaves_history_untouched() {
        let mut mock = MockLLMClient::new();
        mock.expect_complete()
            .returning(|_, _| Err(UpstreamError::EmptyResponse));
        let mut session = TeachingSession::new(
            ModelHandle::new(Arc::new(mock), "m", 0.7),
            &Prompts::default(),
        );
        session.human_step("hi");

        let err = session.instructor_step().await.unwrap_err();
        assert_eq!(err, UpstreamError::EmptyResponse);
        assert_eq!(session.conversation_history().len(), 1);
    }

    #[test]
    fn test_history_window_select() {
        let history: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(HistoryWindow::Unbounded.select(&history).len(), 3);
        assert_eq!(HistoryWindow::LastTurns(2).select(&history), &history[1..]);
        assert_eq!(HistoryWindow::LastTurns(10).select(&history).len(), 3);
        assert!(HistoryWindow::LastTurns(0).select(&history).is_empty());
    }

    #[test]
    fn test_strip_end_of_turn() {
        assert_eq!(strip_end_of_turn("Hi <END_OF_TURN>"), "Hi");
        assert_eq!(strip_end_of_turn("Hi"), "Hi");
        assert_eq!(strip_end_of_turn("<END_OF_TURN> Hi"), "<END_OF_TURN> Hi");
    }
}
