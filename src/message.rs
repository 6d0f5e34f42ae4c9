use std::path::PathBuf;

use teloxide::types::{ChatId, Message, MessageId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MessageContent {
    Text(String),
    Voice { file_id: String },
}

/// An inbound message the pipelines know how to answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub content: MessageContent,
}

impl IncomingMessage {
    /// Returns [`None`] for message kinds other than text and voice.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let content = if let Some(text) = msg.text() {
            MessageContent::Text(text.to_owned())
        } else if let Some(voice) = msg.voice() {
            MessageContent::Voice {
                file_id: voice.file.id.clone(),
            }
        } else {
            return None;
        };

        Some(Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            content,
        })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Voice { .. } => None,
        }
    }
}

/// The answer delivered for one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TutorReply {
    pub text: String,
    /// The delivered audio rendition. It lives in the request's scratch
    /// directory and is gone once the request is finished.
    pub audio: Option<PathBuf>,
}
