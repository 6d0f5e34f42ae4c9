#![doc(hidden)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Error;
use serde_json::{json, Value};
use teloxide::types::ChatId;

use crate::config::Config;
use crate::modules::openai::{AiService, CompletionRequest};
use crate::transport::Transport;

/// A config with fake credentials and no retry delay.
pub(crate) fn test_config() -> Config {
    test_config_with(json!({}))
}

pub(crate) fn test_config_with(overrides: Value) -> Config {
    let mut value = json!({
        "botToken": "123456:TEST",
        "openaiAPIKey": "sk-test",
        "retryBaseDelay": 0
    });
    for (k, v) in overrides.as_object().expect("overrides must be an object") {
        value[k] = v.clone();
    }
    serde_json::from_value(value).expect("invalid test config")
}

fn connection_reset() -> Error {
    std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset").into()
}

pub(crate) struct StubAi {
    completion: Result<Vec<String>, String>,
    transient_completion_failures: AtomicU32,
    transcript: Result<String, String>,
    synthesis_fails: bool,
    requests: Mutex<Vec<CompletionRequest>>,
    transcribed: Mutex<Vec<PathBuf>>,
    synthesized: Mutex<Vec<String>>,
}

impl StubAi {
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self {
            completion: Ok(candidates),
            transient_completion_failures: AtomicU32::new(0),
            transcript: Ok(String::new()),
            synthesis_fails: false,
            requests: Mutex::new(vec![]),
            transcribed: Mutex::new(vec![]),
            synthesized: Mutex::new(vec![]),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_candidates(vec![reply.to_owned()])
    }

    pub fn failing_completion(message: &str) -> Self {
        Self {
            completion: Err(message.to_owned()),
            ..Self::with_candidates(vec![])
        }
    }

    /// The first `count` completions fail with a connection reset.
    pub fn with_transient_completion_failures(self, count: u32) -> Self {
        self.transient_completion_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = Ok(transcript.to_owned());
        self
    }

    pub fn with_failing_transcription(mut self) -> Self {
        self.transcript = Err("unsupported audio format".to_owned());
        self
    }

    pub fn with_failing_synthesis(mut self) -> Self {
        self.synthesis_fails = true;
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn complete_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn transcribed(&self) -> Vec<PathBuf> {
        self.transcribed.lock().unwrap().clone()
    }

    pub fn synthesized(&self) -> Vec<String> {
        self.synthesized.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiService for StubAi {
    async fn complete(&self, req: CompletionRequest) -> Result<Vec<String>, Error> {
        self.requests.lock().unwrap().push(req);
        let pending_failures = self.transient_completion_failures.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.transient_completion_failures
                .store(pending_failures - 1, Ordering::SeqCst);
            return Err(connection_reset());
        }
        self.completion.clone().map_err(|message| anyhow!(message))
    }

    async fn transcribe(&self, audio: &Path) -> Result<String, Error> {
        // The audio must have been persisted before it is submitted.
        let bytes = std::fs::read(audio)?;
        assert!(!bytes.is_empty());
        self.transcribed.lock().unwrap().push(audio.to_owned());
        self.transcript.clone().map_err(|message| anyhow!(message))
    }

    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), Error> {
        if self.synthesis_fails {
            return Err(anyhow!("speech service unavailable"));
        }
        std::fs::write(dest, b"ID3 fake mp3")?;
        self.synthesized.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct StubTransport {
    download_fails: bool,
    upload_fails: bool,
    send_fails: bool,
    texts: Mutex<Vec<(ChatId, String)>>,
    audios: Mutex<Vec<(ChatId, PathBuf, String)>>,
    downloads: Mutex<Vec<PathBuf>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_download(mut self) -> Self {
        self.download_fails = true;
        self
    }

    pub fn with_failing_upload(mut self) -> Self {
        self.upload_fails = true;
        self
    }

    pub fn with_failing_send(mut self) -> Self {
        self.send_fails = true;
        self
    }

    pub fn texts(&self) -> Vec<(ChatId, String)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn audios(&self) -> Vec<(ChatId, PathBuf, String)> {
        self.audios.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Error> {
        if self.send_fails {
            return Err(anyhow!("Forbidden: bot was blocked by the user"));
        }
        self.texts.lock().unwrap().push((chat_id, text.to_owned()));
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, path: &Path, title: &str) -> Result<(), Error> {
        if self.upload_fails {
            return Err(anyhow!("Request Entity Too Large"));
        }
        assert!(path.exists(), "uploading a missing file");
        self.audios
            .lock()
            .unwrap()
            .push((chat_id, path.to_owned(), title.to_owned()));
        Ok(())
    }

    async fn download_attachment(&self, file_id: &str, dest: &Path) -> Result<(), Error> {
        if self.download_fails {
            return Err(anyhow!("Bad Request: invalid file_id {}", file_id));
        }
        std::fs::write(dest, b"OggS fake voice")?;
        self.downloads.lock().unwrap().push(dest.to_owned());
        Ok(())
    }
}
