//! The tutor pipeline: text and voice messages are answered by the model
//! under a tutor persona, followed by a spoken rendition of the answer.

mod generator;
mod speech;
mod voice;

use anyhow::Error;
use teloxide::prelude::*;

use crate::{
    config::SharedConfig,
    message::{IncomingMessage, MessageContent, TutorReply},
    module_mgr::{HandlerResult, Module, TeloxideHandler},
    modules::openai::SharedAiService,
    pipeline::Pipeline,
    transport::TelegramTransport,
    utils::ScratchDir,
};
pub(crate) use generator::{ask_tutor, request_reply};
use speech::deliver_speech;
use voice::{transcribe_voice, Transcription};

/// How a request ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Answered(TutorReply),
    /// The voice message was empty, the user was asked to repeat.
    Clarified,
    /// The voice message could not be processed, the user got an apology.
    Failed,
}

fn open_scratch(pipeline: &Pipeline<'_>, msg: &IncomingMessage) -> Result<ScratchDir, Error> {
    ScratchDir::for_message(msg, pipeline.config.scratch_dir.as_deref())
}

/// Answers one message. Only a failure to deliver the text reply itself
/// is returned as an error.
pub(crate) async fn handle_incoming(
    pipeline: &Pipeline<'_>,
    msg: &IncomingMessage,
) -> Result<Outcome, Error> {
    match &msg.content {
        MessageContent::Text(text) => answer_text(pipeline, msg, text).await,
        MessageContent::Voice { file_id } => answer_voice(pipeline, msg, file_id).await,
    }
}

async fn answer_text(
    pipeline: &Pipeline<'_>,
    msg: &IncomingMessage,
    text: &str,
) -> Result<Outcome, Error> {
    let answer = ask_tutor(pipeline, text).await;
    pipeline.reply(msg.chat_id, &answer).await?;

    let mut audio = None;
    if pipeline.config.enable_speech {
        match open_scratch(pipeline, msg) {
            Ok(scratch) => {
                audio = deliver_speech(pipeline, msg.chat_id, &answer, &scratch).await;
            }
            Err(err) => warn!("TTS failed: {}", err),
        }
    }

    Ok(Outcome::Answered(TutorReply {
        text: answer,
        audio,
    }))
}

async fn answer_voice(
    pipeline: &Pipeline<'_>,
    msg: &IncomingMessage,
    file_id: &str,
) -> Result<Outcome, Error> {
    let i18n = &pipeline.config.i18n;

    let transcription = match open_scratch(pipeline, msg) {
        Ok(scratch) => transcribe_voice(pipeline, file_id, &scratch)
            .await
            .map(|transcription| (transcription, scratch)),
        Err(err) => Err(err),
    };

    let (transcript, scratch) = match transcription {
        Ok((Transcription::Recognized(transcript), scratch)) => (transcript, scratch),
        Ok((Transcription::Empty, _)) => {
            pipeline.reply(msg.chat_id, &i18n.clarify_prompt).await?;
            return Ok(Outcome::Clarified);
        }
        Err(err) => {
            error!("Voice handler error: {:#}", err);
            pipeline.reply(msg.chat_id, &i18n.voice_error_prompt).await?;
            return Ok(Outcome::Failed);
        }
    };

    let answer = ask_tutor(pipeline, &transcript).await;
    let text = format!("{}{}\n\n{}", i18n.transcript_prefix, transcript, answer);
    pipeline.reply(msg.chat_id, &text).await?;

    let audio = if pipeline.config.enable_speech {
        deliver_speech(pipeline, msg.chat_id, &answer, &scratch).await
    } else {
        None
    };

    Ok(Outcome::Answered(TutorReply { text, audio }))
}

async fn handle_tutor_message(
    bot: Bot,
    incoming: IncomingMessage,
    ai: SharedAiService,
    config: SharedConfig,
) -> HandlerResult {
    let transport = TelegramTransport::new(bot);
    let pipeline = Pipeline::new(ai.as_ref(), &transport, &config);

    match handle_incoming(&pipeline, &incoming).await {
        Ok(Outcome::Answered(reply)) => debug!(
            "Message ({}) is answered, audio delivered: {}",
            incoming.message_id,
            reply.audio.is_some()
        ),
        Ok(outcome) => debug!("Message ({}) ended as {:?}", incoming.message_id, outcome),
        Err(err) => error!(
            "Failed to deliver the reply to message ({}): {}",
            incoming.message_id, err
        ),
    }

    Ok(())
}

pub(crate) struct Tutor;

#[async_trait]
impl Module for Tutor {
    async fn register_dependency(&mut self, _dep_map: &mut DependencyMap) -> Result<(), Error> {
        Ok(())
    }

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::filter_map(|msg: Message| IncomingMessage::from_message(&msg))
            .endpoint(handle_tutor_message)
    }
}
