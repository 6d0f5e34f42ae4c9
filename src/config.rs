//! Configuration-related types.
//!
//! The configuration can be represented in and deserialized from JSON,
//! here is an example:
//!
//! ```json
//! {
//!   "mode": "tutor",
//!   "openaiGptModel": "gpt-4o-mini",
//!   "speechVoice": "nova",
//!   "maxRetries": 2,
//!   "i18n": {
//!     "clarifyPrompt": "Sorry, could you say that again in English?"
//!   }
//! }
//! ```
//!
//! Credentials are usually not stored in the file. They are read from the
//! `TELEGRAM_TOKEN` and `OPENAI_API_KEY` environment variables, which take
//! precedence over `botToken` and `openaiAPIKey` when both are present.
//!
//! See [`Config`] for more detailed descriptions.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use paste::paste;
use serde::Deserialize;

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A thread-safe reference-counting object that represents
/// a [`Config`] instance.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    config: Arc<Config>,
}

impl SharedConfig {
    /// Constructs a new `SharedConfig`.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Deref for SharedConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        self.config.as_ref()
    }
}

/// Which reply pipeline the bot runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    /// Text and voice input, tutor persona, spoken replies.
    #[default]
    Tutor,
    /// Text only, no persona, raw errors are shown to the user.
    Plain,
}

/// Top-level config type for the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The API key of your OpenAI account.
    /// JSON key: `openaiAPIKey`, overridden by `OPENAI_API_KEY`.
    #[serde(default, rename = "openaiAPIKey")]
    pub openai_api_key: String,
    /// The token of your Telegram bot.
    /// JSON key: `botToken`, overridden by `TELEGRAM_TOKEN`.
    #[serde(default, rename = "botToken")]
    pub telegram_bot_token: String,

    /// The reply pipeline, `"tutor"` or `"plain"`.
    /// JSON key: `mode`
    #[serde(default)]
    pub mode: BotMode,

    /// The model used for chat completions.
    /// Value is default to "gpt-4o-mini".
    /// JSON key: `openaiGptModel`
    #[serde(default = "default_openai_gpt_model", rename = "openaiGptModel")]
    pub openai_gpt_model: String,

    /// Sampling temperature of the tutor completions.
    /// JSON key: `temperature`
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// The model used to transcribe voice messages.
    /// JSON key: `transcriptionModel`
    #[serde(default = "default_transcription_model", rename = "transcriptionModel")]
    pub transcription_model: String,

    /// The model used to synthesize spoken replies.
    /// JSON key: `speechModel`
    #[serde(default = "default_speech_model", rename = "speechModel")]
    pub speech_model: String,

    /// The voice of spoken replies, one of `alloy`, `echo`, `fable`,
    /// `onyx`, `nova` and `shimmer`.
    /// JSON key: `speechVoice`
    #[serde(default = "default_speech_voice", rename = "speechVoice")]
    pub speech_voice: String,

    /// Whether an audio rendition is sent after each tutor reply.
    /// JSON key: `enableSpeech`
    #[serde(default = "default_enable_speech", rename = "enableSpeech")]
    pub enable_speech: bool,

    /// The system instruction given to the model in tutor mode.
    /// JSON key: `tutorPersona`
    #[serde(default = "default_tutor_persona", rename = "tutorPersona")]
    pub tutor_persona: String,

    /// How many times a call failing with a transient error is retried.
    /// JSON key: `maxRetries`
    #[serde(default = "default_max_retries", rename = "maxRetries")]
    pub max_retries: u32,

    /// Delay (in milliseconds) before the first retry, doubled for every
    /// following one.
    /// JSON key: `retryBaseDelay`
    #[serde(default = "default_retry_base_delay", rename = "retryBaseDelay")]
    pub retry_base_delay: u64,

    /// Parent directory of the per-request scratch directories, [`None`]
    /// for the system temporary directory.
    /// JSON key: `scratchDir`
    #[serde(default, rename = "scratchDir")]
    pub scratch_dir: Option<PathBuf>,

    /// Whether updates received while the bot was offline are dropped
    /// on startup.
    /// JSON key: `dropPendingUpdates`
    #[serde(default = "default_drop_pending_updates", rename = "dropPendingUpdates")]
    pub drop_pending_updates: bool,

    /// Strings for I18N.
    /// JSON key: `i18n`
    #[serde(default)]
    pub i18n: I18nStrings,
}

/// Strings for I18N.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nStrings {
    /// A text to display when the tutor reply could not be generated.
    /// JSON key: `generationErrorPrompt`
    #[serde(
        default = "default_generation_error_prompt",
        rename = "generationErrorPrompt"
    )]
    pub generation_error_prompt: String,
    /// A text to display when nothing could be recognized in a voice message.
    /// JSON key: `clarifyPrompt`
    #[serde(default = "default_clarify_prompt", rename = "clarifyPrompt")]
    pub clarify_prompt: String,
    /// A text to display when a voice message could not be processed.
    /// JSON key: `voiceErrorPrompt`
    #[serde(default = "default_voice_error_prompt", rename = "voiceErrorPrompt")]
    pub voice_error_prompt: String,
    /// Prefix of the transcript echoed back before a voice reply.
    /// JSON key: `transcriptPrefix`
    #[serde(default = "default_transcript_prefix", rename = "transcriptPrefix")]
    pub transcript_prefix: String,
    /// Title of the audio attachment carrying the spoken reply.
    /// JSON key: `speechTitle`
    #[serde(default = "default_speech_title", rename = "speechTitle")]
    pub speech_title: String,
    /// Prefix of the error text shown in plain mode.
    /// JSON key: `plainErrorPrefix`
    #[serde(default = "default_plain_error_prefix", rename = "plainErrorPrefix")]
    pub plain_error_prefix: String,
}

impl Config {
    /// Loads the config from an optional JSON file, then applies the
    /// credentials found in the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|err| anyhow!("Failed to read {}: {}", path.display(), err))?;
                serde_json::from_str::<Config>(&content)?
            }
            None => serde_json::from_str::<Config>("{}")?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overrides the credentials with non-empty values from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty(TELEGRAM_TOKEN_ENV) {
            self.telegram_bot_token = token;
        }
        if let Some(key) = non_empty(OPENAI_API_KEY_ENV) {
            self.openai_api_key = key;
        }
    }

    /// Fails when a required credential is missing.
    pub fn validate(&self) -> Result<(), Error> {
        if self.telegram_bot_token.trim().is_empty() {
            bail!(
                "{} is not set. Add it to the environment or set `botToken`.",
                TELEGRAM_TOKEN_ENV
            );
        }
        if self.openai_api_key.trim().is_empty() {
            bail!(
                "{} is not set. Add it to the environment or set `openaiAPIKey`.",
                OPENAI_API_KEY_ENV
            );
        }
        Ok(())
    }

    pub(crate) fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay)
    }
}

macro_rules! define_defaults {
    ($ty_name:ident { $($name:ident: $ty:ty = $default:expr,)* }) => {
        define_defaults! { $($name: $ty = $default,)* }
        paste! {
            impl Default for $ty_name {
                fn default() -> Self {
                    Self {
                        $($name: [<default_ $name>](),)*
                    }
                }
            }
        }
    };
    ($($name:ident: $ty:ty = $default:expr,)*) => {
        paste! {
            $(
                fn [<default_ $name>]() -> $ty {
                    $default
                }
            )*
        }
    };
}

define_defaults! {
    openai_gpt_model: String = "gpt-4o-mini".to_owned(),
    temperature: f32 = 0.6,
    transcription_model: String = "whisper-1".to_owned(),
    speech_model: String = "gpt-4o-mini-tts".to_owned(),
    speech_voice: String = "alloy".to_owned(),
    enable_speech: bool = true,
    tutor_persona: String = "You are a friendly English tutor. Always reply in clear, simple English (B1-B2). \
        If there are grammar mistakes, correct them and explain briefly in 1 sentence.".to_owned(),
    max_retries: u32 = 2,
    retry_base_delay: u64 = 500,
    drop_pending_updates: bool = true,
}

define_defaults!(I18nStrings {
    generation_error_prompt: String = "Sorry, I had trouble generating a reply.".to_owned(),
    clarify_prompt: String = "I couldn't hear that clearly. Could you repeat in English?".to_owned(),
    voice_error_prompt: String = "Oops, something went wrong with the voice message.".to_owned(),
    transcript_prefix: String = "You said: ".to_owned(),
    speech_title: String = "Answer (TTS)".to_owned(),
    plain_error_prefix: String = "\u{26A0}\u{FE0F} Error: ".to_owned(),
});
