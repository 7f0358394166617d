use crate::error::{Result, ToolError};
use crate::tools::{Tool, ToolParameters, ToolResult};
use serde_json::{Value, json};

/// 固定返回下雪的演示天气工具
pub struct WeatherTool;

#[async_trait::async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city."
    }

    fn parameters(&self) -> Value {
        json!( {
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let city = parameters
            .get("city")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::MissingParameter("city".to_string()))?;

        Ok(ToolResult::success(format!(
            "The weather in {} is snowing.",
            city
        )))
    }
}
