use anyhow::Error;

use crate::modules::openai::{ChatTurn, CompletionRequest};
use crate::pipeline::Pipeline;

/// Issues one completion request and returns the trimmed first candidate.
pub(crate) async fn request_reply(
    pipeline: &Pipeline<'_>,
    turns: Vec<ChatTurn>,
    temperature: Option<f32>,
) -> Result<String, Error> {
    let req = CompletionRequest {
        model: pipeline.config.openai_gpt_model.clone(),
        temperature,
        turns,
    };

    let candidates = pipeline
        .retry
        .run("Chat completion", || pipeline.ai.complete(req.clone()))
        .await?;

    let reply = candidates
        .into_iter()
        .next()
        .map(|content| content.trim().to_owned())
        .unwrap_or_default();
    if reply.is_empty() {
        return Err(anyhow!("Server returned empty response"));
    }
    Ok(reply)
}

fn tutor_turns(persona: &str, text: &str) -> Vec<ChatTurn> {
    vec![ChatTurn::system(persona), ChatTurn::user(text)]
}

/// Asks the model for a tutor-style reply. Never fails: errors are logged
/// and replaced with the generation error prompt.
pub(crate) async fn ask_tutor(pipeline: &Pipeline<'_>, text: &str) -> String {
    let config = pipeline.config;
    let turns = tutor_turns(&config.tutor_persona, text);

    match request_reply(pipeline, turns, Some(config.temperature)).await {
        Ok(reply) => reply,
        Err(err) => {
            error!("Chat completion error: {}", err);
            config.i18n.generation_error_prompt.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::openai::Role;
    use crate::test_support::{test_config, StubAi, StubTransport};

    #[tokio::test]
    async fn test_request_carries_persona_and_temperature() {
        let config = test_config();
        let ai = StubAi::replying("  I have an apple. Use \"have\" with \"I\".\n");
        let transport = StubTransport::new();
        let pipeline = Pipeline::new(&ai, &transport, &config);

        let reply = ask_tutor(&pipeline, "I has a apple").await;
        assert_eq!(reply, "I have an apple. Use \"have\" with \"I\".");

        let requests = ai.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.temperature, Some(0.6));
        assert_eq!(req.turns.len(), 2);
        assert_eq!(req.turns[0].role, Role::System);
        assert_eq!(req.turns[0].content, config.tutor_persona);
        assert_eq!(req.turns[1], ChatTurn::user("I has a apple"));
    }

    #[tokio::test]
    async fn test_failure_becomes_fallback() {
        let config = test_config();
        let ai = StubAi::failing_completion("invalid api key");
        let transport = StubTransport::new();
        let pipeline = Pipeline::new(&ai, &transport, &config);

        let reply = ask_tutor(&pipeline, "hello").await;
        assert_eq!(reply, "Sorry, I had trouble generating a reply.");
        assert_eq!(ai.complete_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidates_become_fallback() {
        let config = test_config();
        let transport = StubTransport::new();

        for candidates in [vec![], vec!["   ".to_owned()]] {
            let ai = StubAi::with_candidates(candidates);
            let pipeline = Pipeline::new(&ai, &transport, &config);
            let reply = ask_tutor(&pipeline, "hello").await;
            assert_eq!(reply, config.i18n.generation_error_prompt);
        }
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let config = test_config();
        let ai = StubAi::with_candidates(vec!["first".to_owned(), "second".to_owned()]);
        let transport = StubTransport::new();
        let pipeline = Pipeline::new(&ai, &transport, &config);

        assert_eq!(ask_tutor(&pipeline, "hello").await, "first");
    }

    #[tokio::test]
    async fn test_same_input_same_reply() {
        let config = test_config();
        let ai = StubAi::replying("Nice to meet you!");
        let transport = StubTransport::new();
        let pipeline = Pipeline::new(&ai, &transport, &config);

        let first = ask_tutor(&pipeline, "Nice to meet you").await;
        let second = ask_tutor(&pipeline, "Nice to meet you").await;
        assert_eq!(first, second);
        let requests = ai.requests();
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let config = test_config();
        let ai = StubAi::replying("Hello!").with_transient_completion_failures(1);
        let transport = StubTransport::new();
        let pipeline = Pipeline::new(&ai, &transport, &config);

        assert_eq!(ask_tutor(&pipeline, "hi").await, "Hello!");
        assert_eq!(ai.complete_calls(), 2);
    }
}
