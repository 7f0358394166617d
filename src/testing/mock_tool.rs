//! Mock 工具，用于在不依赖外部服务的情况下测试 Agent 的工具调用行为。
//!
//! # 示例
//!
//! ```rust
//! use archeologist_agent::testing::MockTool;
//! use archeologist_agent::tools::Tool;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let tool = MockTool::new("get_artifact_details")
//!     .with_response(r#"[{"name":"Lens","description":"glass"}]"#)
//!     .with_failure("disk unavailable");
//!
//! let r1 = tool.execute(HashMap::new()).await.unwrap();
//! assert!(r1.success);
//!
//! let r2 = tool.execute(HashMap::new()).await.unwrap();
//! assert!(!r2.success);
//!
//! assert_eq!(tool.call_count(), 2);
//! # }
//! ```

use crate::error::Result;
use crate::tools::{Tool, ToolParameters, ToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// 预设执行结果枚举
enum MockToolResponse {
    Success(String),
    Failure(String),
}

/// 可脚本化的 Mock Tool。
///
/// 按顺序返回预设的执行结果；队列耗尽后返回默认成功响应 `"mock response"`。
/// `clone()` 得到的副本共享响应队列与调用记录，注册进 Agent 后仍可在测试里检查。
#[derive(Clone)]
pub struct MockTool {
    name: String,
    description: String,
    parameters: Value,
    responses: Arc<Mutex<VecDeque<MockToolResponse>>>,
    /// 每次调用时收到的参数，按顺序记录
    calls: Arc<Mutex<Vec<HashMap<String, Value>>>>,
}

impl MockTool {
    /// 创建具名 Mock Tool（描述和参数 schema 均使用默认值）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "A mock tool for testing".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 设置工具描述
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// 设置参数 JSON Schema
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = schema;
        self
    }

    /// 追加一条成功响应文本
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockToolResponse::Success(text.into()));
        self
    }

    /// 追加一条失败响应（用于测试工具失败时 Agent 的行为）
    pub fn with_failure(self, msg: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockToolResponse::Failure(msg.into()));
        self
    }

    /// 已执行的调用总次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 最后一次调用时传入的参数（若从未调用则返回 `None`）
    pub fn last_args(&self) -> Option<HashMap<String, Value>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, params: ToolParameters) -> Result<ToolResult> {
        self.calls.lock().unwrap().push(params);

        let response = self.responses.lock().unwrap().pop_front();
        match response {
            Some(MockToolResponse::Success(text)) => Ok(ToolResult::success(text)),
            Some(MockToolResponse::Failure(msg)) => Ok(ToolResult::error(msg)),
            // 队列耗尽时返回默认成功
            None => Ok(ToolResult::success("mock response".to_string())),
        }
    }
}
