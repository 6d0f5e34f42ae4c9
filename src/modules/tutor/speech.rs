use std::path::PathBuf;

use anyhow::Error;
use teloxide::types::ChatId;

use crate::pipeline::Pipeline;
use crate::utils::ScratchDir;

async fn send_speech(
    pipeline: &Pipeline<'_>,
    chat_id: ChatId,
    text: &str,
    scratch: &ScratchDir,
) -> Result<PathBuf, Error> {
    let speech_path = scratch.speech_path();
    let title = &pipeline.config.i18n.speech_title;

    pipeline
        .retry
        .run("Speech synthesis", || pipeline.ai.synthesize(text, &speech_path))
        .await?;
    pipeline
        .retry
        .run("Audio upload", || {
            pipeline.transport.send_audio(chat_id, &speech_path, title)
        })
        .await?;

    Ok(speech_path)
}

/// Sends `text` as an audio attachment, best effort. Failures are logged
/// and reported as [`None`], the text reply is never affected.
pub(crate) async fn deliver_speech(
    pipeline: &Pipeline<'_>,
    chat_id: ChatId,
    text: &str,
    scratch: &ScratchDir,
) -> Option<PathBuf> {
    match send_speech(pipeline, chat_id, text, scratch).await {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("TTS failed: {}", err);
            None
        }
    }
}
