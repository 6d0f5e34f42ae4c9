use anyhow::Error;
use teloxide::types::ChatId;

use crate::config::Config;
use crate::modules::openai::AiService;
use crate::transport::Transport;
use crate::utils::RetryPolicy;

/// Everything one request needs to be answered. Built per update from the
/// injected dependencies, never stored.
pub(crate) struct Pipeline<'a> {
    pub ai: &'a dyn AiService,
    pub transport: &'a dyn Transport,
    pub config: &'a Config,
    pub retry: RetryPolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(ai: &'a dyn AiService, transport: &'a dyn Transport, config: &'a Config) -> Self {
        Self {
            ai,
            transport,
            config,
            retry: RetryPolicy::from_config(config),
        }
    }

    pub async fn reply(&self, chat_id: ChatId, text: &str) -> Result<(), Error> {
        self.retry
            .run("Sending reply", || self.transport.send_text(chat_id, text))
            .await
    }
}
