use serde::Serialize;
use reqwest::Client;
use crate::config::LlmSettings;
use crate::error::{Result, AppError};
use crate::fortune::{Role, Turn};

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "assistant",
        };
        Message {
            role: role.into(),
            content: turn.parts.join("\n\n"),
        }
    }
}

/// Send the conversation to an OpenRouter-compatible chat endpoint and
/// return the first choice's text.
pub async fn call_openrouter(
    client: &Client,
    settings: &LlmSettings,
    turns: &[Turn],
) -> Result<String> {
    let body = ChatRequest {
        model: settings.model.clone(),
        messages: turns.iter().map(Message::from).collect(),
    };

    let res = client
        .post(format!("{}/chat/completions", settings.base_url))
        .bearer_auth(&settings.api_key)
        .json(&body)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| AppError::LlmError(e.to_string()))?;

    let json: serde_json::Value = res.json().await?;
    let reply = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| AppError::LlmError("Invalid response format from LLM".to_string()))?
        .to_string();

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> LlmSettings {
        LlmSettings {
            api_key: "sk-test".to_string(),
            base_url,
            model: "test/model".to_string(),
        }
    }

    fn turns() -> Vec<Turn> {
        vec![
            Turn::user(vec!["prompt".to_string(), "любовь".to_string()]),
            Turn::model("звёзды молчат".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_sends_history_and_reads_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "test/model",
                "messages": [
                    { "role": "user", "content": "prompt\n\nлюбовь" },
                    { "role": "assistant", "content": "звёзды молчат" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Тебя ждёт встреча." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = call_openrouter(&Client::new(), &settings(server.uri()), &turns())
            .await
            .unwrap();
        assert_eq!(reply, "Тебя ждёт встреча.");
    }

    #[tokio::test]
    async fn test_error_status_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = call_openrouter(&Client::new(), &settings(server.uri()), &turns())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LlmError(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = call_openrouter(&Client::new(), &settings(server.uri()), &turns())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LlmError(_)));
    }
}
