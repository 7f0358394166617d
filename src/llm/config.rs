//! LLM 配置加载
//!
//! 从环境变量读取模型配置，格式：
//! ```text
//! AGENT_MODEL_<ID>_MODEL=gpt-4o
//! AGENT_MODEL_<ID>_BASEURL=https://api.openai.com/v1/chat/completions
//! AGENT_MODEL_<ID>_APIKEY=sk-...
//! ```
//! `<ID>` 为自定义标识（如 `GPT4O`、`QWEN`），不区分大小写。
//!
//! 未配置任何 `AGENT_MODEL_*` 时，若存在 `OPENAI_API_KEY`，则注册 id 为
//! `openai` 的默认模型（`OPENAI_MODEL`、`OPENAI_BASE_URL` 可覆盖）。

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_OPENAI_MODEL_ID: &str = "openai";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// 单个模型的连接配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// LLM 接口中使用的模型名（如 `gpt-4o`）
    pub model: String,
    /// Chat Completions 接口完整 URL
    pub baseurl: String,
    pub apikey: String,
}

/// 所有已加载的模型配置表（key = 小写的 `<ID>`）
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub models: HashMap<String, ModelConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        const PREFIX: &str = "AGENT_MODEL_";
        let mut model_configs: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut openai: HashMap<String, String> = HashMap::new();

        for (key, value) in vars {
            if let Some(suffix) = key.strip_prefix(PREFIX) {
                let parts: Vec<&str> = suffix.split('_').collect();
                if parts.len() != 2 || parts[0].is_empty() {
                    return Err(ConfigError::EnvFormatError(key).into());
                }
                let model_id = parts[0].to_lowercase();
                let config_key = parts[1].to_lowercase();

                match config_key.as_str() {
                    "model" | "baseurl" | "apikey" => {}
                    _ => {
                        return Err(ConfigError::UnMatchConfigError(config_key, key).into());
                    }
                }
                model_configs
                    .entry(model_id)
                    .or_default()
                    .insert(config_key, value);
            } else if matches!(
                key.as_str(),
                "OPENAI_API_KEY" | "OPENAI_BASE_URL" | "OPENAI_MODEL"
            ) {
                openai.insert(key, value);
            }
        }

        let mut models = HashMap::new();
        for (model_id, config_map) in model_configs {
            let field = |name: &str| {
                config_map
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingConfig(model_id.clone(), name.to_string()))
            };
            let model = ModelConfig {
                model: field("model")?,
                baseurl: field("baseurl")?,
                apikey: field("apikey")?,
            };
            models.insert(model_id, model);
        }

        if models.is_empty()
            && let Some(apikey) = openai.remove("OPENAI_API_KEY")
        {
            let base = openai
                .remove("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
            models.insert(
                DEFAULT_OPENAI_MODEL_ID.to_string(),
                ModelConfig {
                    model: openai
                        .remove("OPENAI_MODEL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    baseurl: format!("{}/chat/completions", base.trim_end_matches('/')),
                    apikey,
                },
            );
        }

        Ok(Self { models })
    }

    pub fn get_model(&self, model_id: &str) -> Result<ModelConfig> {
        self.models
            .get(&model_id.to_lowercase())
            .cloned()
            .ok_or_else(|| ConfigError::NotFindModelError(model_id.to_string()).into())
    }
}
