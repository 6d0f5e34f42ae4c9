use std::path::Path;
use std::sync::Arc;

use anyhow::Error;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateSpeechRequestArgs, CreateTranscriptionRequestArgs, SpeechModel, Voice,
};
use async_openai::Client;
use teloxide::dptree::di::{DependencyMap, DependencySupplier};

use crate::{config::SharedConfig, module_mgr::Module};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    System,
    User,
}

/// One role-tagged turn of a completion request.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CompletionRequest {
    pub model: String,
    pub temperature: Option<f32>,
    pub turns: Vec<ChatTurn>,
}

/// The AI operations the reply pipelines depend on.
#[async_trait]
pub(crate) trait AiService: Send + Sync {
    /// Returns the content of every candidate reply, in server order.
    async fn complete(&self, req: CompletionRequest) -> Result<Vec<String>, Error>;

    /// Recognizes the speech in the audio file at `audio`.
    async fn transcribe(&self, audio: &Path) -> Result<String, Error>;

    /// Renders `text` as speech and writes the encoded audio to `dest`.
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), Error>;
}

pub(crate) type SharedAiService = Arc<dyn AiService>;

pub(crate) struct OpenAIClient {
    client: Client<OpenAIConfig>,
    transcription_model: String,
    speech_model: SpeechModel,
    speech_voice: Voice,
}

impl OpenAIClient {
    pub(crate) fn new(config: &SharedConfig) -> Result<Self, Error> {
        let openai_config = OpenAIConfig::new().with_api_key(&config.openai_api_key);
        Ok(Self {
            client: Client::with_config(openai_config),
            transcription_model: config.transcription_model.clone(),
            speech_model: speech_model(&config.speech_model),
            speech_voice: speech_voice(&config.speech_voice)?,
        })
    }
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_owned()),
    }
}

fn speech_voice(name: &str) -> Result<Voice, Error> {
    let voice = match name.to_ascii_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        _ => return Err(anyhow!("Unsupported speech voice: {}", name)),
    };
    Ok(voice)
}

fn to_request_message(turn: ChatTurn) -> Result<ChatCompletionRequestMessage, Error> {
    let msg = match turn.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(turn.content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content)
            .build()?
            .into(),
    };
    Ok(msg)
}

#[async_trait]
impl AiService for OpenAIClient {
    async fn complete(&self, req: CompletionRequest) -> Result<Vec<String>, Error> {
        let msgs = req
            .turns
            .into_iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(req.model).messages(msgs);
        if let Some(temperature) = req.temperature {
            args.temperature(temperature);
        }
        let resp = self.client.chat().create(args.build()?).await?;

        if let Some(usage) = &resp.usage {
            debug!(
                "Completion used {} tokens ({} prompt, {} completion)",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(resp
            .choices
            .into_iter()
            .map(|choice| choice.message.content.unwrap_or_default())
            .collect())
    }

    async fn transcribe(&self, audio: &Path) -> Result<String, Error> {
        let req = CreateTranscriptionRequestArgs::default()
            .file(audio)
            .model(self.transcription_model.clone())
            .build()?;
        let resp = self.client.audio().transcribe(req).await?;
        Ok(resp.text)
    }

    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), Error> {
        let req = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.speech_model.clone())
            .voice(self.speech_voice.clone())
            .build()?;
        let resp = self.client.audio().speech(req).await?;
        resp.save(dest).await?;
        Ok(())
    }
}

pub(crate) struct OpenAI;

#[async_trait]
impl Module for OpenAI {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        let config: Arc<SharedConfig> = dep_map.get();

        let openai_client: SharedAiService = Arc::new(OpenAIClient::new(config.as_ref())?);
        dep_map.insert(openai_client);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_voice() {
        assert!(matches!(speech_voice("alloy").unwrap(), Voice::Alloy));
        assert!(matches!(speech_voice("Nova").unwrap(), Voice::Nova));
        assert!(speech_voice("robot").is_err());
    }

    #[test]
    fn test_speech_model() {
        assert!(matches!(speech_model("tts-1"), SpeechModel::Tts1));
        assert!(matches!(
            speech_model("gpt-4o-mini-tts"),
            SpeechModel::Other(name) if name == "gpt-4o-mini-tts"
        ));
    }

    #[test]
    fn test_to_request_message_keeps_roles() {
        let system = to_request_message(ChatTurn::system("be nice")).unwrap();
        let user = to_request_message(ChatTurn::user("hello")).unwrap();
        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
    }
}
