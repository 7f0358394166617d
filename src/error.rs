use thiserror::Error;

/// 项目统一错误类型
#[derive(Debug, Error)]
pub enum ArcheoError {
    /// 文物库读写错误
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),
    /// LLM 相关错误
    #[error("LLM Error: {0}")]
    Llm(#[from] LlmError),
    /// 工具执行错误
    #[error("Tool Error: {0}")]
    Tool(#[from] ToolError),
    /// Agent 执行错误
    #[error("Agent Error: {0}")]
    Agent(#[from] AgentError),
    /// 配置错误
    #[error("Config Error: {0}")]
    Config(#[from] ConfigError),
    /// IO 错误
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON 解析错误
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// 其他错误
    #[error("Error: {0}")]
    Other(String),
}

/// 文物库错误，区分“空库”“损坏”“磁盘不可用”
#[derive(Debug, Error)]
pub enum StoreError {
    /// 文件读写失败
    #[error("I/O failure on {path}: {message}")]
    Io { path: String, message: String },
    /// 文件内容不是合法 JSON
    #[error("corrupt store file {path}: {message}")]
    Corrupt { path: String, message: String },
    /// 合法 JSON，但顶层不是数组
    #[error("store file {path} holds a JSON {found}, expected an array")]
    UnexpectedShape { path: String, found: String },
    /// 序列化失败
    #[error("failed to serialize records: {0}")]
    Serialization(String),
}

/// LLM 相关错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 网络请求失败
    #[error("Network error: {0}")]
    NetworkError(String),
    /// API 返回错误状态码
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },
    /// 响应格式无效
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// 没有返回内容
    #[error("Empty response from LLM")]
    EmptyResponse,
}

/// 工具执行错误
#[derive(Debug, Error)]
pub enum ToolError {
    /// 工具未找到
    #[error("Tool '{0}' not found")]
    NotFound(String),
    /// 参数缺失
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    /// 参数类型错误
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
    /// 工具执行失败
    #[error("Tool '{tool}' execution failed: {message}")]
    ExecutionFailed { tool: String, message: String },
    /// 工具执行超时
    #[error("Tool '{0}' timed out")]
    Timeout(String),
}

/// Agent 执行错误
#[derive(Debug, Error)]
pub enum AgentError {
    /// 超过最大迭代次数
    #[error("Max iterations exceeded: {0}")]
    MaxIterationsExceeded(usize),
    /// 没有响应
    #[error("No response from LLM")]
    NoResponse,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// 配置解析失败
    #[error("Failed to parse config: {0}")]
    ParseFailed(String),
    /// 环境变量格式错误，应为 `AGENT_MODEL_<ID>_<KEY>`
    #[error("Malformed model env var: {0}")]
    EnvFormatError(String),
    /// 不认识的配置项
    #[error("Unknown model setting '{0}' in {1}")]
    UnMatchConfigError(String, String),
    /// 模型缺少必填项
    #[error("Model '{0}' is missing '{1}'")]
    MissingConfig(String, String),
    /// 找不到模型
    #[error("Model '{0}' is not configured")]
    NotFindModelError(String),
}

impl From<reqwest::Error> for ArcheoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ArcheoError::Llm(LlmError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            ArcheoError::Llm(LlmError::NetworkError(format!(
                "Connection failed: {}",
                err
            )))
        } else {
            ArcheoError::Llm(LlmError::NetworkError(err.to_string()))
        }
    }
}

impl From<serde_yaml::Error> for ArcheoError {
    fn from(err: serde_yaml::Error) -> Self {
        ArcheoError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, ArcheoError>;
