//! Plain streaming chat with the model, no tutorial actions

use crate::display::{Console, InputLine, Prompt};
use crate::message::{History, Message};
use crate::model::{ChatModel, StreamEvent};
use crate::Result;
use tracing::{debug, warn};

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

pub struct ChatSession<M, C> {
    model: M,
    console: C,
    history: History,
}

impl<M: ChatModel, C: Console> ChatSession<M, C> {
    /// Start a chat, optionally seeded with a system prompt
    pub fn new(model: M, console: C, system_prompt: Option<String>) -> Self {
        let history = match system_prompt {
            Some(prompt) => History::with_system(prompt),
            None => History::new(),
        };
        Self {
            model,
            console,
            history,
        }
    }

    pub fn with_history_policy(mut self, limit: usize, keep: usize) -> Self {
        self.history.set_policy(limit, keep);
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub async fn run(&mut self) -> Result<()> {
        self.console.notice(
            "Chat with your local AI model! Type 'quit' or 'exit' to end the conversation.",
        )?;
        self.console.notice(&"-".repeat(60))?;

        loop {
            self.console.notice("")?;
            let input = match self.console.read_line(Prompt::Fixed("You: ")).await? {
                InputLine::Line(line) => line.trim().to_string(),
                InputLine::Closed => break,
            };

            if EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w)) {
                break;
            }
            if input.is_empty() {
                continue;
            }

            self.turn(&input).await?;
        }

        self.console.notice("Goodbye!")
    }

    /// Send one message and echo the streamed reply
    pub async fn turn(&mut self, input: &str) -> Result<()> {
        self.history.push(Message::user(input));
        self.console.notice("")?;
        self.console.write_fragment("AI: ")?;

        let reply = match self.collect_reply().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                self.console.notice(&format!("Error: {e}"))?;
                self.console.notice("Please try again.")?;
                String::new()
            }
        };

        let reply = reply.trim();
        if !reply.is_empty() {
            self.history.push(Message::assistant(reply));
        }
        self.console.notice("")?;

        let dropped = self.history.trim();
        if dropped > 0 {
            debug!("Trimmed {} messages from chat history", dropped);
        }
        Ok(())
    }

    async fn collect_reply(&mut self) -> Result<String> {
        let mut events = self.model.stream(self.history.messages()).await?;
        let mut reply = String::new();

        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Delta(text) => {
                    self.console.write_fragment(&text)?;
                    reply.push_str(&text);
                }
                StreamEvent::Done => break,
                StreamEvent::Error(e) => {
                    // keep what arrived before the break
                    warn!("Stream ended early: {}", e);
                    self.console.notice("")?;
                    self.console.notice(&format!("Error: {e}"))?;
                    break;
                }
            }
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{RecordingConsole, ScriptedModel};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_chat_streams_and_records() {
        let model = ScriptedModel::new(vec![Ok("  Hello! How can I help?  ")]);
        let console = RecordingConsole::new(&["hi", "quit"]);
        let mut chat = ChatSession::new(model, console, Some("Be brief.".to_string()));
        chat.run().await.unwrap();

        assert_eq!(
            chat.history().messages(),
            &[
                Message::system("Be brief."),
                Message::user("hi"),
                Message::assistant("Hello! How can I help?"),
            ]
        );
        assert_eq!(chat.console().fragments, "AI:   Hello! How can I help?  ");
        assert_eq!(chat.console().prompts, vec!["You: ", "You: "]);
        assert_eq!(chat.console().notices.last().map(String::as_str), Some("Goodbye!"));
    }

    #[tokio::test]
    async fn test_chat_error_keeps_going() {
        let model = ScriptedModel::new(vec![Err("API error 404 Not Found"), Ok("ok")]);
        let console = RecordingConsole::new(&["one", "", "two", "EXIT"]);
        let mut chat = ChatSession::new(model, console, None);
        chat.run().await.unwrap();

        let notices = &chat.console().notices;
        assert!(notices.iter().any(|n| n.contains("404 Not Found")));
        assert!(notices.iter().any(|n| n == "Please try again."));
        assert_eq!(
            chat.history().messages(),
            &[Message::user("one"), Message::user("two"), Message::assistant("ok")]
        );
    }

    #[tokio::test]
    async fn test_chat_ends_on_closed_input() {
        let mut chat = ChatSession::new(
            ScriptedModel::new(vec![]),
            RecordingConsole::new(&[]),
            None,
        );
        chat.run().await.unwrap();
        assert!(chat.history().is_empty());
    }
}
