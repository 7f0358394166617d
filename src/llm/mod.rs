//! 模型调用：配置、OpenAI 兼容的消息类型与 HTTP 客户端

pub mod config;
pub mod types;

use crate::error::{LlmError, Result};
use crate::llm::config::{Config, ModelConfig};
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// 错误信息里保留的响应体长度
const ERROR_BODY_PREVIEW: usize = 512;

/// Chat Completions 调用接口，Agent 通过它与模型对话
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}

/// 基于 reqwest 的 OpenAI 兼容实现
pub struct HttpChatClient {
    client: Client,
    model: ModelConfig,
}

impl HttpChatClient {
    pub fn new(client: Client, model: ModelConfig) -> Self {
        Self { client, model }
    }

    /// 从环境变量解析 `model_id` 对应的模型
    pub fn from_env(model_id: &str) -> Result<Self> {
        let model = Config::from_env()?.get_model(model_id)?;
        Ok(Self::new(Client::new(), model))
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn chat(&self, mut request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        // 请求里的 model 是配置 id，发送前换成真实模型名
        request.model = self.model.model.clone();
        debug!(model = %request.model, messages = request.messages.len(), "📡 请求模型");

        let response = self
            .client
            .post(&self.model.baseurl)
            .bearer_auth(&self.model.apikey)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_completion(status, &body)
    }
}

/// 按状态码与响应体得到 completion 结果
fn parse_completion(status: StatusCode, body: &str) -> Result<ChatCompletionResponse> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "模型接口返回错误状态");
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message: preview(body),
        }
        .into());
    }

    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("{e}: {}", preview(body))))?;
    if completion.choices.is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }
    debug!(id = %completion.id, choices = completion.choices.len(), "收到 completion 响应");
    Ok(completion)
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArcheoError;

    #[test]
    fn test_error_status_becomes_api_error() {
        let err = parse_completion(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#).unwrap_err();
        match err {
            ArcheoError::Llm(LlmError::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("bad key"));
            }
            other => panic!("期望 ApiError，实际 {:?}", other),
        }
    }

    #[test]
    fn test_success_body_is_parsed() {
        let body = r#"{"id":"c1","choices":[{"message":{"role":"assistant","content":"Basalt."},"finish_reason":"stop"}]}"#;
        let completion = parse_completion(StatusCode::OK, body).unwrap();
        assert_eq!(completion.id, "c1");
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("Basalt."));
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        let err = parse_completion(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ArcheoError::Llm(LlmError::InvalidResponse(m)) if m.contains("gateway")));
    }

    #[test]
    fn test_no_choices_is_empty_response() {
        let err = parse_completion(StatusCode::OK, r#"{"id":"c2","choices":[]}"#).unwrap_err();
        assert!(matches!(err, ArcheoError::Llm(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_long_error_body_is_truncated() {
        let body = "x".repeat(ERROR_BODY_PREVIEW + 100);
        let err = parse_completion(StatusCode::BAD_GATEWAY, &body).unwrap_err();
        let ArcheoError::Llm(LlmError::ApiError { message, .. }) = err else {
            panic!("期望 ApiError");
        };
        assert_eq!(message.chars().count(), ERROR_BODY_PREVIEW + 1);
    }
}
