//! Mock Chat 客户端，用于在不发起真实 HTTP 请求的情况下测试 Agent 循环。
//!
//! # 示例
//!
//! ```rust
//! use archeologist_agent::testing::MockChatClient;
//! use archeologist_agent::llm::ChatClient;
//! use archeologist_agent::llm::types::{ChatCompletionRequest, Message};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockChatClient::new()
//!     .with_tool_call("get_artifact_details", r#"{"artifact_name":"Lens"}"#)
//!     .with_text("The lens is made of glass.");
//!
//! let request = ChatCompletionRequest {
//!     model: "mock".to_string(),
//!     messages: vec![Message::user("hi".to_string())],
//!     tools: None,
//!     tool_choice: None,
//!     temperature: None,
//!     max_tokens: None,
//! };
//! let first = mock.chat(request).await.unwrap();
//! assert!(first.choices[0].message.tool_calls.is_some());
//! assert_eq!(mock.call_count(), 1);
//! # }
//! ```

use crate::error::{ArcheoError, LlmError, Result};
use crate::llm::ChatClient;
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, Message, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 预设响应的枚举（消息或错误）
enum MockChatResponse {
    Message(Message),
    Err(ArcheoError),
}

/// 可脚本化的 Mock Chat 客户端。
///
/// 按顺序返回预设的响应；队列耗尽后返回 `EmptyResponse` 错误。
/// 所有请求都被记录，可通过 [`call_count`](MockChatClient::call_count) /
/// [`last_request`](MockChatClient::last_request) 检查。
#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<VecDeque<MockChatResponse>>>,
    calls: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatClient {
    /// 创建空 Mock，尚未设置任何响应
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 追加一条任意 assistant 消息
    pub fn with_message(self, message: Message) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockChatResponse::Message(message));
        self
    }

    /// 追加一条纯文本回答
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_message(Message::assistant(text.into()))
    }

    /// 追加一条单工具调用，调用 id 按已排队的响应数生成
    pub fn with_tool_call(self, name: &str, arguments: &str) -> Self {
        let id = format!("call_{}", self.responses.lock().unwrap().len() + 1);
        self.with_message(Message::assistant_with_tools(vec![ToolCall::function(
            id, name, arguments,
        )]))
    }

    /// 追加一条错误响应（用于测试错误处理路径）
    pub fn with_error(self, err: ArcheoError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockChatResponse::Err(err));
        self
    }

    /// 追加一条网络错误
    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.with_error(ArcheoError::Llm(LlmError::NetworkError(msg.into())))
    }

    /// 已发生的调用总次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 最后一次调用的请求（若从未调用则返回 `None`）
    pub fn last_request(&self) -> Option<ChatCompletionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// 剩余未消费的预设响应数量
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn chat(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.calls.lock().unwrap().push(request);

        match self.responses.lock().unwrap().pop_front() {
            Some(MockChatResponse::Message(message)) => {
                Ok(ChatCompletionResponse::from_message(message))
            }
            Some(MockChatResponse::Err(e)) => Err(e),
            None => Err(ArcheoError::Llm(LlmError::EmptyResponse)),
        }
    }
}
