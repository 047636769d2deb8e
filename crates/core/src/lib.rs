pub mod agent;
pub mod content;
pub mod curriculum;
pub mod error;
pub mod instructor;
pub mod llm_client;
pub mod message;
pub mod progress;
pub mod prompts;
pub mod translation;

pub use curriculum::Syllabus;
pub use error::{ConfigurationError, ProgressError, UpstreamError};
pub use message::{Message, Role};
