//! The plain pipeline: text messages are forwarded verbatim to the model,
//! without persona, and errors are shown to the user as they are.

use anyhow::Error;
use teloxide::prelude::*;

use crate::{
    config::SharedConfig,
    message::IncomingMessage,
    module_mgr::{HandlerResult, Module, TeloxideHandler},
    modules::openai::{ChatTurn, SharedAiService},
    modules::tutor::request_reply,
    pipeline::Pipeline,
    transport::TelegramTransport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageText(String);

/// Answers `text` with a raw completion, or with the prefixed error message.
pub(crate) async fn answer_plain(
    pipeline: &Pipeline<'_>,
    chat_id: ChatId,
    text: &str,
) -> Result<String, Error> {
    let reply = match request_reply(pipeline, vec![ChatTurn::user(text)], None).await {
        Ok(reply) => reply,
        Err(err) => {
            error!("Chat completion error: {}", err);
            format!("{}{}", pipeline.config.i18n.plain_error_prefix, err)
        }
    };
    pipeline.reply(chat_id, &reply).await?;
    Ok(reply)
}

async fn handle_plain_message(
    bot: Bot,
    incoming: IncomingMessage,
    text: MessageText,
    ai: SharedAiService,
    config: SharedConfig,
) -> HandlerResult {
    let transport = TelegramTransport::new(bot);
    let pipeline = Pipeline::new(ai.as_ref(), &transport, &config);

    if let Err(err) = answer_plain(&pipeline, incoming.chat_id, &text.0).await {
        error!(
            "Failed to deliver the reply to message ({}): {}",
            incoming.message_id, err
        );
    }

    Ok(())
}

pub(crate) struct Plain;

#[async_trait]
impl Module for Plain {
    async fn register_dependency(&mut self, _dep_map: &mut DependencyMap) -> Result<(), Error> {
        Ok(())
    }

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::filter_map(|msg: Message| IncomingMessage::from_message(&msg))
            .filter_map(|incoming: IncomingMessage| {
                incoming.text().map(|text| MessageText(text.to_owned()))
            })
            .endpoint(handle_plain_message)
    }
}
