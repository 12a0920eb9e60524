//! Text chat transcript
//!
//! Keeps the message list of the chat page and renders message bubbles.
//! The assistant is not connected yet, so bot turns are a fixed placeholder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reply used until the assistant backend is wired in
pub const PLACEHOLDER_REPLY: &str =
    "Esta é uma resposta automática. A IA ainda não está conectada.";

const AUDIO_BUTTON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke-width="2" stroke="currentColor"><path stroke-linecap="round" stroke-linejoin="round" d="M19.114 11.043c0-3.111-2.486-5.63-5.558-5.63-3.072 0-5.558 2.519-5.558 5.63 0 2.21 1.282 4.13 3.11 5.044v2.019H8.88a.794.794 0 0 0-.794.794c0 .44.356.794.794.794h6.48c.44 0 .794-.356.794-.794 0-.44-.356-.794-.794-.794h-2.228v-2.02c1.828-.913 3.11-2.833 3.11-5.043Z" /></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    #[serde(rename = "usuario")]
    User,
    Bot,
}

impl Author {
    fn css_class(&self) -> &'static str {
        match self {
            Author::User => "usuario",
            Author::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: Author,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    /// Message bubble markup; bot bubbles carry the listen-to-audio button
    pub fn render_html(&self) -> String {
        let paragraph = format!("<p>{}</p>", escape_html(&self.text));
        let body = match self.author {
            Author::User => paragraph,
            Author::Bot => format!(
                r#"<button class="botao-audio" title="Ouvir áudio">{}</button>{}"#,
                AUDIO_BUTTON_SVG, paragraph
            ),
        };

        format!(
            r#"<div class="mensagem-balao {}">{}</div>"#,
            self.author.css_class(),
            body
        )
    }
}

/// Ordered chat transcript
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message; blank input is ignored
    pub fn submit(&mut self, input: &str) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::new(Author::User, text));
        self.messages.last()
    }

    pub fn push_bot_reply(&mut self) -> &ChatMessage {
        self.messages
            .push(ChatMessage::new(Author::Bot, PLACEHOLDER_REPLY));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
