//! 考古学家 Agent：基于原生 Tool Calling 的问答循环
//!
//! 每轮把完整对话与工具定义发给模型：
//!
//! ```text
//! user 问题 ──▶ LLM ──┬── tool_calls ──▶ 执行工具 ──▶ tool 消息 ──▶ 下一轮
//!                     └── 纯文本 ──────▶ 最终答案
//! ```
//!
//! 每次 `execute` 都从系统提示词 + 用户问题重新开始，不保留跨问题的历史。

use crate::agent::{Agent, AgentConfig, AgentEvent};
use crate::artifacts::ArtifactStore;
use crate::error::{AgentError, ArcheoError, Result, ToolError};
use crate::llm::ChatClient;
use crate::llm::types::{ChatCompletionRequest, Message, ToolCall};
use crate::tools::artifact::ArtifactLookupTool;
use crate::tools::weather::WeatherTool;
use crate::tools::{Tool, ToolManager, ToolParameters};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ArcheologistAgent {
    config: AgentConfig,
    client: Arc<dyn ChatClient>,
    tool_manager: ToolManager,
}

impl ArcheologistAgent {
    /// 不带任何工具的 Agent
    pub fn new(config: AgentConfig, client: Arc<dyn ChatClient>) -> Self {
        let tool_manager = ToolManager::new_with_config(config.tool_execution.clone());
        Self {
            config,
            client,
            tool_manager,
        }
    }

    /// 注册文物查询与天气工具
    pub fn with_store(config: AgentConfig, client: Arc<dyn ChatClient>, store: ArtifactStore) -> Self {
        let mut agent = Self::new(config, client);
        agent.add_tool(Box::new(ArtifactLookupTool::new(store)));
        agent.add_tool(Box::new(WeatherTool));
        agent
    }

    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tool_manager.register(tool)
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tool_manager.list_tools()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// 调用一次模型，返回首个 choice 的消息
    async fn think(&self, messages: &[Message]) -> Result<Message> {
        let tools = self.tool_manager.get_tool_definitions();
        let request = ChatCompletionRequest {
            model: self.config.model_name.clone(),
            messages: messages.to_vec(),
            tools: (!tools.is_empty()).then_some(tools),
            tool_choice: None,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self.client.chat(request).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AgentError::NoResponse.into())
    }

    /// 执行工具，失败的 [`ToolResult`](crate::tools::ToolResult) 转为错误
    async fn run_tool(&self, call: &ToolCall, args: &Value) -> Result<String> {
        let params: ToolParameters = match args {
            Value::Object(map) => map.clone().into_iter().collect(),
            _ => ToolParameters::new(),
        };

        let result = self
            .tool_manager
            .execute_tool(&call.function.name, params)
            .await?;

        if result.success {
            Ok(result.output)
        } else {
            Err(ToolError::ExecutionFailed {
                tool: call.function.name.clone(),
                message: result.error.unwrap_or_else(|| "工具执行失败".to_string()),
            }
            .into())
        }
    }
}

fn parse_arguments(call: &ToolCall) -> Result<Value> {
    let raw = call.function.arguments.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| {
        ToolError::InvalidParameter {
            name: call.function.name.clone(),
            message: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl Agent for ArcheologistAgent {
    fn name(&self) -> &str {
        &self.config.agent_name
    }

    fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    async fn execute(&self, task: &str) -> Result<String> {
        let mut stream = self.execute_stream(task);
        while let Some(event) = stream.next().await {
            if let AgentEvent::FinalAnswer(answer) = event? {
                return Ok(answer);
            }
        }
        Err(AgentError::NoResponse.into())
    }

    fn execute_stream(&self, task: &str) -> BoxStream<'_, Result<AgentEvent>> {
        let task = task.to_string();
        Box::pin(try_stream! {
            info!(agent = %self.config.agent_name, tools = ?self.list_tools(), "🧠 开始回答问题");
            let mut messages = vec![
                Message::system(self.config.system_prompt.clone()),
                Message::user(task),
            ];

            for iteration in 0..self.config.max_iterations {
                debug!(iteration = iteration + 1, "--- 迭代 ---");
                let message = self.think(&messages).await?;
                let tool_calls = message.tool_calls.clone().unwrap_or_default();

                if tool_calls.is_empty() {
                    let answer = message.content.unwrap_or_default();
                    if answer.trim().is_empty() {
                        Err::<(), ArcheoError>(AgentError::NoResponse.into())?;
                    }
                    info!(agent = %self.config.agent_name, "✅ 得到最终答案");
                    yield AgentEvent::FinalAnswer(answer);
                    return;
                }

                // assistant 的 tool_calls 消息必须先入历史，否则后续 tool 消息无法关联
                messages.push(message);

                for call in tool_calls {
                    let name = call.function.name.clone();
                    let outcome = match parse_arguments(&call) {
                        Ok(args) => {
                            debug!(tool = %name, args = %args, "🚀 调用工具");
                            yield AgentEvent::ToolCall { name: name.clone(), args: args.clone() };
                            self.run_tool(&call, &args).await
                        }
                        Err(e) => Err(e),
                    };

                    let output = match outcome {
                        Ok(output) => output,
                        Err(e) if self.config.tool_error_feedback => {
                            warn!(tool = %name, error = %e, "工具执行失败，错误回传给模型");
                            format!("Tool error: {e}")
                        }
                        Err(e) => Err::<String, ArcheoError>(e)?,
                    };

                    yield AgentEvent::ToolResult { name: name.clone(), output: output.clone() };
                    messages.push(Message::tool_result(call.id.clone(), name, output));
                }
            }

            Err::<(), ArcheoError>(
                AgentError::MaxIterationsExceeded(self.config.max_iterations).into(),
            )?;
        })
    }
}
