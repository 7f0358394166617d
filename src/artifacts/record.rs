//! 文物记录类型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const UNKNOWN_NAME: &str = "Unknown";

/// 文物库中的单条记录
///
/// `name` 即身份标识：toggle 按 `name` 相等判断是否存在，不另设主键。
/// 未识别的字段保存在 `extra` 中，读写往返时原样保留。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtifactRecord {
    #[serde(default)]
    pub name: String,
    /// 自由文本，可含换行
    #[serde(default)]
    pub description: String,
    /// 加入时间，格式 `YYYY-MM-DD HH:MM:SS`；旧格式升级来的记录没有此字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ArtifactDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 展示用的附加信息（摘要、出土地点等）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArtifactDetails {
    /// 顶层 `name` 为空时的备用名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtifactRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// 旧格式（纯字符串）升级：首行作为 name，全文作为 description
    pub fn from_legacy(text: &str) -> Self {
        let name = text.lines().next().unwrap_or("");
        Self::new(name, text)
    }

    pub fn with_details(mut self, details: ArtifactDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 顶层 `name`，其次 `details.name`，都为空时为 `"Unknown"`
    pub fn display_name(&self) -> &str {
        Some(self.name.as_str())
            .filter(|n| !n.is_empty())
            .or_else(|| self.details.as_ref().and_then(|d| d.name.as_deref()))
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_NAME)
    }

    /// 优先取 `details.description`，其次取顶层 `description`
    pub fn display_description(&self) -> &str {
        self.details
            .as_ref()
            .and_then(|d| d.description.as_deref())
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.description)
    }
}

/// 文物库数组中的一个元素
///
/// 能无损解析为 [`ArtifactRecord`] 的对象是 `Record`；其余的值（数字、null、
/// 字段类型不符或缺少 `name` 的对象）原样保存在 `Raw` 中，写回时内容不变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Record(ArtifactRecord),
    Raw(Value),
}

impl StoredEntry {
    /// 解析一个非旧格式的数组元素
    ///
    /// 只有解析后再序列化与原值完全相同时才视为 `Record`，
    /// 否则写回会丢字段（例如值为 null 的可选字段）。
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return StoredEntry::Raw(value);
        }
        match serde_json::from_value::<ArtifactRecord>(value.clone()) {
            Ok(record) if serde_json::to_value(&record).ok().as_ref() == Some(&value) => {
                StoredEntry::Record(record)
            }
            Ok(_) => {
                debug!("记录无法无损解析，按原样保留");
                StoredEntry::Raw(value)
            }
            Err(e) => {
                debug!(error = %e, "记录字段类型不符，按原样保留");
                StoredEntry::Raw(value)
            }
        }
    }

    pub fn record(&self) -> Option<&ArtifactRecord> {
        match self {
            StoredEntry::Record(record) => Some(record),
            StoredEntry::Raw(_) => None,
        }
    }

    /// toggle 用于比对的名称：记录的 `name`，或原样对象中字符串类型的 `name`
    pub fn name(&self) -> Option<&str> {
        match self {
            StoredEntry::Record(record) => Some(&record.name),
            StoredEntry::Raw(value) => value.get("name").and_then(Value::as_str),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            StoredEntry::Record(record) => record.display_name(),
            StoredEntry::Raw(value) => value
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .or_else(|| {
                    value
                        .get("details")
                        .and_then(|d| d.get("name"))
                        .and_then(Value::as_str)
                })
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_NAME),
        }
    }
}

impl From<ArtifactRecord> for StoredEntry {
    fn from(record: ArtifactRecord) -> Self {
        StoredEntry::Record(record)
    }
}
