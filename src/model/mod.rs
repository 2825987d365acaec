//! Model service boundary
//!
//! The tutorial loop only needs whole completions; the standalone chat mode
//! streams fragments as they arrive.

mod client;

pub use client::{ChatClient, ClientOptions};

use crate::message::Message;
use crate::Result;
use std::future::Future;
use tokio::sync::mpsc;

/// Incremental output of a streamed completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Next fragment of assistant text
    Delta(String),
    /// Stream finished normally
    Done,
    /// Stream broke off
    Error(String),
}

/// Anything that can answer a chat history with assistant text
pub trait ChatModel: Send + Sync {
    /// Complete the conversation, returning the full assistant reply
    fn complete(&self, history: &[Message]) -> impl Future<Output = Result<String>> + Send;

    /// Stream the reply. Models without native streaming deliver the whole
    /// completion as a single fragment.
    fn stream(
        &self,
        history: &[Message],
    ) -> impl Future<Output = Result<mpsc::Receiver<StreamEvent>>> + Send {
        async move {
            let reply = self.complete(history).await?;
            let (tx, rx) = mpsc::channel(2);
            let _ = tx.try_send(StreamEvent::Delta(reply));
            let _ = tx.try_send(StreamEvent::Done);
            Ok(rx)
        }
    }
}
