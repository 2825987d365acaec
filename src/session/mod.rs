//! Conversation loops
//!
//! - `TutorSession`: interprets model replies as tutorial actions
//! - `ChatSession`: streams plain conversation

mod chat;
mod prompts;
mod tutor;

pub use chat::ChatSession;
pub use prompts::system_prompt;
pub use tutor::{SessionEnd, TutorSession};
