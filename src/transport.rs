use std::path::Path;

use anyhow::Error;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::io::AsyncWriteExt;

/// The messaging operations the reply pipelines depend on.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Error>;

    /// Sends the file at `path` as a regular (non-voice) audio item.
    async fn send_audio(&self, chat_id: ChatId, path: &Path, title: &str) -> Result<(), Error>;

    /// Resolves the attachment `file_id` and writes its bytes to `dest`.
    async fn download_attachment(&self, file_id: &str, dest: &Path) -> Result<(), Error>;
}

#[derive(Clone)]
pub(crate) struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub(crate) fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Error> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, path: &Path, title: &str) -> Result<(), Error> {
        self.bot
            .send_audio(chat_id, InputFile::file(path))
            .title(title)
            .await?;
        Ok(())
    }

    async fn download_attachment(&self, file_id: &str, dest: &Path) -> Result<(), Error> {
        let file = self.bot.get_file(file_id).await?;
        debug!("Downloading {} ({} bytes)", file.path, file.meta.size);

        let mut dst = tokio::fs::File::create(dest).await?;
        self.bot.download_file(&file.path, &mut dst).await?;
        dst.flush().await?;
        Ok(())
    }
}
