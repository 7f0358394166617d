use crate::error::Result;
use async_trait::async_trait;
pub use config::AgentConfig;
use futures::stream::BoxStream;
use serde_json::Value;

pub mod archeologist;
mod config;

pub use archeologist::ArcheologistAgent;

/// 流式执行时产生的事件
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    ToolCall { name: String, args: Value },
    ToolResult { name: String, output: String },
    FinalAnswer(String),
}

/// 一个 agent 应该有：系统提示词、可调用的工具
#[async_trait]
pub trait Agent: Send + Sync {
    /// agent 的名称
    fn name(&self) -> &str;

    /// 系统提示词
    fn system_prompt(&self) -> &str;

    /// 核心执行方法，返回最终答案
    async fn execute(&self, task: &str) -> Result<String>;

    /// 流式执行方法，以 [`AgentEvent::FinalAnswer`] 结束
    fn execute_stream(&self, task: &str) -> BoxStream<'_, Result<AgentEvent>>;
}
