//! 文物查询工具
//!
//! 把整个文物库文件原文交给模型，由模型自行解析。`artifact_name`
//! 参数只出现在 schema 里，实现并不按名称过滤：无论问哪件文物，
//! 返回的都是全部记录。库的规模因此受限于模型上下文窗口。
//!
//! 按名称过滤的查询大概率才是原本想要的行为，改动前需先与产品确认。

use crate::artifacts::ArtifactStore;
use crate::error::Result;
use crate::tools::{Tool, ToolParameters, ToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

pub struct ArtifactLookupTool {
    store: ArtifactStore,
}

impl ArtifactLookupTool {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// 库文件原文；不存在或读取失败时返回空串
    pub async fn lookup(&self, artifact_name: &str) -> String {
        match tokio::fs::read_to_string(self.store.path()).await {
            Ok(raw) => {
                debug!(artifact_name, bytes = raw.len(), "📜 返回文物库全文");
                raw
            }
            Err(e) => {
                debug!(artifact_name, path = %self.store.path().display(), error = %e, "文物库不可读，返回空串");
                String::new()
            }
        }
    }
}

#[async_trait]
impl Tool for ArtifactLookupTool {
    fn name(&self) -> &str {
        "get_artifact_details"
    }

    fn description(&self) -> &str {
        "Return the raw JSON contents of the artifact repository. \
         The result always contains every artifact on record; parse it to find the one you need. \
         An empty result means no artifact data is available."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "artifact_name": {
                    "type": "string",
                    "description": "Name of the artifact the user is asking about"
                }
            },
            "required": ["artifact_name"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let artifact_name = parameters
            .get("artifact_name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        Ok(ToolResult::success(self.lookup(artifact_name).await))
    }
}
