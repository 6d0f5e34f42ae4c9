use anyhow::{Context, Error};

use crate::pipeline::Pipeline;
use crate::utils::ScratchDir;

/// The result of recognizing a voice message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Transcription {
    Recognized(String),
    /// Nothing intelligible was said.
    Empty,
}

impl Transcription {
    fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Recognized(text.to_owned())
        }
    }
}

/// Downloads the voice attachment into `scratch` and transcribes it.
pub(crate) async fn transcribe_voice(
    pipeline: &Pipeline<'_>,
    file_id: &str,
    scratch: &ScratchDir,
) -> Result<Transcription, Error> {
    let voice_path = scratch.voice_path();

    pipeline
        .retry
        .run("Voice download", || {
            pipeline.transport.download_attachment(file_id, &voice_path)
        })
        .await
        .context("Failed to download the voice message")?;

    let text = pipeline
        .retry
        .run("Transcription", || pipeline.ai.transcribe(&voice_path))
        .await
        .context("Failed to transcribe the voice message")?;

    Ok(Transcription::from_text(&text))
}
