//! 应用配置
//!
//! 可选的 YAML 配置文件，所有字段都有默认值：
//!
//! ```yaml
//! data_path: data/string_list.json
//! model: openai
//! max_iterations: 10
//! tool_timeout_ms: 30000
//! ```
//!
//! 命令行参数优先于配置文件。

use crate::agent::AgentConfig;
use crate::artifacts::DEFAULT_STORE_PATH;
use crate::error::{ConfigError, Result};
use crate::llm::config::DEFAULT_OPENAI_MODEL_ID;
use crate::tools::ToolExecutionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "archeologist.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 文物库文件路径
    pub data_path: PathBuf,
    /// 模型配置 id
    pub model: String,
    /// 覆盖默认系统提示词
    pub system_prompt: Option<String>,
    pub max_iterations: usize,
    pub temperature: Option<f32>,
    /// 单次工具执行超时（毫秒）
    pub tool_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_STORE_PATH),
            model: DEFAULT_OPENAI_MODEL_ID.to_string(),
            system_prompt: None,
            max_iterations: 10,
            temperature: Some(0.7),
            tool_timeout_ms: ToolExecutionConfig::default().timeout_ms,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let config: AppConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// 指定文件时必须存在；未指定时尝试默认文件，不存在则用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig::archeologist(&self.model)
            .max_iterations(self.max_iterations)
            .temperature(self.temperature)
            .tool_execution(ToolExecutionConfig {
                timeout_ms: self.tool_timeout_ms,
                ..Default::default()
            });
        if let Some(prompt) = &self.system_prompt {
            config = config.system_prompt(prompt);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArcheoError;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archeologist.yaml");
        std::fs::write(&path, "model: qwen\nmax_iterations: 4\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.model, "qwen");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_STORE_PATH));

        let agent = config.agent_config();
        assert_eq!(agent.get_model_name(), "qwen");
        assert_eq!(agent.max_iterations, 4);
    }

    #[test]
    fn test_system_prompt_override() {
        let config = AppConfig {
            system_prompt: Some("Be brief.".to_string()),
            ..Default::default()
        };
        assert_eq!(config.agent_config().system_prompt, "Be brief.");
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load_or_default(Some(dir.path().join("nope.yaml").as_path())).unwrap_err();
        assert!(matches!(
            err,
            ArcheoError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "max_iterations: [1, 2").unwrap();
        assert!(matches!(
            AppConfig::load(&path).unwrap_err(),
            ArcheoError::Config(ConfigError::ParseFailed(_))
        ));
    }
}
