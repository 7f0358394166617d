//! Agent 配置

use crate::tools::ToolExecutionConfig;

/// 默认系统提示词
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced field archeologist assisting \
a dig team. Answer questions about the artifacts recorded at the site. When a question concerns \
a specific artifact, call get_artifact_details and ground your answer in the records it returns. \
If the records are empty or do not mention the artifact, say that it has not been catalogued yet \
instead of inventing details.";

/// Agent 运行时配置
///
/// 通过构建器链式调用设置各项参数，再传入 [`ArcheologistAgent::new`](crate::agent::ArcheologistAgent::new)。
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// 模型配置 id（见 [`crate::llm::config`]）
    pub(crate) model_name: String,
    pub(crate) system_prompt: String,
    pub(crate) agent_name: String,
    /// 最大迭代轮次，防止死循环
    pub(crate) max_iterations: usize,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
    /// 工具执行失败时将错误信息回传给 LLM，而非直接让 Agent 失败（默认 true）
    pub(crate) tool_error_feedback: bool,
    /// 工具执行配置：超时、重试策略
    pub(crate) tool_execution: ToolExecutionConfig,
}

impl AgentConfig {
    pub fn new(model_name: &str, agent_name: &str, system_prompt: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            system_prompt: system_prompt.to_string(),
            agent_name: agent_name.to_string(),
            max_iterations: 10,
            temperature: Some(0.7),
            max_tokens: None,
            tool_error_feedback: true,
            tool_execution: ToolExecutionConfig::default(),
        }
    }

    /// 使用默认提示词的考古学家 Agent 配置
    pub fn archeologist(model_name: &str) -> Self {
        Self::new(model_name, "Archeologist Agent", DEFAULT_SYSTEM_PROMPT)
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn tool_error_feedback(mut self, enabled: bool) -> Self {
        self.tool_error_feedback = enabled;
        self
    }

    pub fn tool_execution(mut self, config: ToolExecutionConfig) -> Self {
        self.tool_execution = config;
        self
    }

    pub fn agent_name(mut self, agent_name: &str) -> Self {
        self.agent_name = agent_name.to_string();
        self
    }

    pub fn system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }
}
