//! Funding assistant chat
//!
//! Stateless: the client sends the whole conversation every time and nothing
//! is kept on the server.

use crate::types::TextGenerator;
use crate::{FundboardError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Opening message for a new conversation
pub const GREETING: &str = "Hello! How can I assist you with startup funding today?";

const PREAMBLE: &str = "You are a helpful assistant for startup founders. \
Answer questions about fundraising, investors, funding stages and startup growth. \
Keep answers concise and practical.";

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").unwrap());
static BULLET_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)\*[ \t]+").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").unwrap());

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The founder
    User,
    /// The assistant
    Assistant,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: ChatRole,
    /// Text
    pub content: String,
}

impl ChatMessage {
    /// Message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Message from the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// The greeting that opens every conversation
    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }
}

/// Strip markdown decoration from a model reply
pub fn clean_reply(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET_STAR.replace_all(&text, "${1}- ");
    let text = STRONG.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Answers founder questions through the text generator
#[derive(Clone)]
pub struct ChatAssistant {
    generator: Arc<dyn TextGenerator>,
}

impl ChatAssistant {
    /// Create an assistant
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Reply to the latest user message of `history`
    pub async fn reply(&self, history: &[ChatMessage]) -> Result<ChatMessage> {
        match history.last() {
            Some(last) if last.role == ChatRole::User && !last.content.trim().is_empty() => {}
            _ => {
                return Err(FundboardError::validation(
                    "conversation must end with a non-empty user message",
                ))
            }
        }

        let prompt = build_chat_prompt(history);
        debug!(messages = history.len(), "Requesting chat reply");
        let raw = self.generator.generate(&prompt).await?;
        Ok(ChatMessage::assistant(clean_reply(&raw)))
    }
}

fn build_chat_prompt(history: &[ChatMessage]) -> String {
    let mut prompt = format!("{}\n\n", PREAMBLE);
    for message in history {
        let speaker = match message.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        };
        prompt.push_str(&format!("{}: {}\n", speaker, message.content.trim()));
    }
    prompt.push_str("Assistant:");
    prompt
}
