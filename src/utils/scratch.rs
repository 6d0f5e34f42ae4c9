use std::path::{Path, PathBuf};

use anyhow::Error;
use tempfile::{Builder as TempDirBuilder, TempDir};

use crate::message::IncomingMessage;

const VOICE_FILE_NAME: &str = "voice.ogg";
const SPEECH_FILE_NAME: &str = "reply.mp3";

/// A directory private to one request, holding the downloaded voice and
/// the synthesized reply. It is removed with everything inside when dropped.
#[derive(Debug)]
pub(crate) struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Creates a fresh directory under `parent`, or under the system
    /// temporary directory when `parent` is [`None`].
    pub fn for_message(msg: &IncomingMessage, parent: Option<&Path>) -> Result<Self, Error> {
        let prefix = format!("tutorbot-{}-{}-", msg.chat_id, msg.message_id.0);
        let mut builder = TempDirBuilder::new();
        builder.prefix(&prefix);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn voice_path(&self) -> PathBuf {
        self.path().join(VOICE_FILE_NAME)
    }

    pub fn speech_path(&self) -> PathBuf {
        self.path().join(SPEECH_FILE_NAME)
    }
}
