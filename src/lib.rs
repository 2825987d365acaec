//! Django Girls Offline
//!
//! A terminal tutorial assistant that walks a learner through building a
//! Django blog, driven by a locally hosted language model:
//! - The model turns free-form chat into calls against a closed action set
//! - The tutorial registry answers those calls with lesson content
//! - The display keeps the scrollback readable at any terminal width

pub mod actions;
pub mod config;
pub mod display;
pub mod interpreter;
pub mod message;
pub mod model;
pub mod session;
pub mod tutorial;

pub use actions::{Action, ActionError, ActionName, Mode};
pub use config::TutorConfig;
pub use display::{BlockRole, Console, InputLine, Prompt, TerminalConsole};
pub use interpreter::{ActionCall, InterpretError, Interpretation, Interpreter};
pub use message::{History, Message, Role};
pub use model::{ChatClient, ChatModel, ClientOptions, StreamEvent};
pub use session::{ChatSession, SessionEnd, TutorSession};
pub use tutorial::{Probe, ProbeOutput, SystemProbe, Topic, Tutorial};

/// Result type for tutor operations
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur outside a single turn's local failure handling
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("Chat completion failed: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
