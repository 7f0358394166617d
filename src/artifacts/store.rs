//! 文物库：单个 JSON 文件持久化的有序记录列表
//!
//! 文件内容为 JSON 数组，两种形态都可读取：
//!
//! ```json
//! ["Bronze Mirror\nFound near the north gate", "Clay Tablet"]
//! ```
//!
//! 旧格式（纯字符串数组）在首次读取时升级为对象数组并立即写回：
//!
//! ```json
//! [
//!   { "name": "Bronze Mirror", "description": "Bronze Mirror\nFound near the north gate" },
//!   { "name": "Clay Tablet", "description": "Clay Tablet" }
//! ]
//! ```
//!
//! 没有文件锁、没有原子替换，多个写者会互相覆盖，只适合单用户单进程。

use crate::artifacts::record::{ArtifactRecord, StoredEntry};
use crate::error::StoreError;
use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 默认的库文件位置（相对当前工作目录）
pub const DEFAULT_STORE_PATH: &str = "data/string_list.json";

/// `discovered_date` 的格式
pub const DISCOVERED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部记录，任何失败都退化为空列表
    pub fn load(&self) -> Vec<StoredEntry> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "文物库读取失败，按空库处理");
                Vec::new()
            }
        }
    }

    /// 读取全部记录，错误分类返回
    ///
    /// - 文件不存在：`Ok(vec![])`
    /// - 字符串元素按旧格式升级，存在升级时写回文件（写回失败只记日志）
    /// - 其余元素不做校验，无法解析为记录的按原样保留为 [`StoredEntry::Raw`]
    pub fn try_load(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let Some(raw) = self.read_raw()? else {
            debug!(path = %self.path.display(), "文物库文件不存在，返回空库");
            return Ok(Vec::new());
        };

        let value: Value = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let Value::Array(items) = value else {
            return Err(StoreError::UnexpectedShape {
                path: self.path.display().to_string(),
                found: json_kind(&value).to_string(),
            });
        };

        let mut upgraded = 0usize;
        let mut entries: Vec<StoredEntry> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(text) => {
                    upgraded += 1;
                    entries.push(ArtifactRecord::from_legacy(&text).into());
                }
                other => entries.push(StoredEntry::from_value(other)),
            }
        }

        if upgraded > 0 {
            info!(path = %self.path.display(), upgraded, "旧格式记录已升级");
            if let Err(e) = self.persist(&entries) {
                warn!(error = %e, "升级后写回失败，仅返回内存结果");
            }
        }

        let raw = entries.iter().filter(|e| e.record().is_none()).count();
        if raw > 0 {
            warn!(path = %self.path.display(), raw, "部分元素不是标准记录，已原样保留");
        }
        Ok(entries)
    }

    /// 以缩进 JSON 整体覆盖写入
    pub fn persist(&self, entries: &[StoredEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), count = entries.len(), "💾 文物库已持久化");
        Ok(())
    }

    /// 文件原文；不存在时返回 `None`
    pub fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}

/// 切换候选记录：已有同名条目则全部删除，否则追加并打上当前时间
///
/// 同名判断见 [`StoredEntry::name`]；其他原样条目保持原位。
/// 不负责持久化，调用方应紧接着调用 [`ArtifactStore::persist`]。
pub fn toggle(entries: &[StoredEntry], candidate: &ArtifactRecord) -> Vec<StoredEntry> {
    toggle_at(entries, candidate, Local::now().naive_local())
}

/// 同 [`toggle`]，时间戳由调用方给出
pub fn toggle_at(
    entries: &[StoredEntry],
    candidate: &ArtifactRecord,
    now: NaiveDateTime,
) -> Vec<StoredEntry> {
    let same_name = |e: &StoredEntry| e.name() == Some(candidate.name.as_str());
    if entries.iter().any(same_name) {
        return entries.iter().filter(|e| !same_name(*e)).cloned().collect();
    }

    let mut stamped = candidate.clone();
    stamped.discovered_date = Some(now.format(DISCOVERED_DATE_FORMAT).to_string());
    let mut next = entries.to_vec();
    next.push(stamped.into());
    next
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::record::ArtifactDetails;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ArtifactStore {
        ArtifactStore::new(dir.path().join("data").join("string_list.json"))
    }

    fn write_raw(store: &ArtifactStore, raw: &str) {
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), raw).unwrap();
    }

    fn read_json(store: &ArtifactStore) -> Value {
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    fn entries(records: Vec<ArtifactRecord>) -> Vec<StoredEntry> {
        records.into_iter().map(StoredEntry::from).collect()
    }

    fn names(entries: &[StoredEntry]) -> Vec<Option<&str>> {
        entries.iter().map(|e| e.name()).collect()
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().is_empty());
        assert!(store.try_load().unwrap().is_empty());
        assert!(store.read_raw().unwrap().is_none());
        assert!(!store.path().exists(), "读取不应创建文件");
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut metadata = serde_json::Map::new();
        metadata.insert("material".to_string(), json!("basalt"));
        let saved = entries(vec![
            ArtifactRecord::new("Lens", "polished\nglass"),
            ArtifactRecord::new("Prism", "cut crystal")
                .with_details(ArtifactDetails {
                    summary: Some("splits light".to_string()),
                    location: Some("Trench 4".to_string()),
                    ..Default::default()
                })
                .with_metadata(metadata),
        ]);

        store.persist(&saved).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, saved);
        assert!(loaded.iter().all(|e| e.record().is_some()));
    }

    #[test]
    fn test_persist_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .persist(&entries(vec![ArtifactRecord::new("Lens", "glass")]))
            .unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("  \"name\": \"Lens\""));
    }

    #[test]
    fn test_legacy_upgrade_is_self_healing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(&store, r#"["abc\ndef", "xyz"]"#);

        let expected = entries(vec![
            ArtifactRecord::new("abc", "abc\ndef"),
            ArtifactRecord::new("xyz", "xyz"),
        ]);
        assert_eq!(store.load(), expected);
        assert_eq!(
            read_json(&store),
            json!([
                {"name": "abc", "description": "abc\ndef"},
                {"name": "xyz", "description": "xyz"}
            ])
        );

        assert_eq!(store.load(), expected);
    }

    #[test]
    fn test_mixed_array_keeps_unrecognised_elements() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(
            &store,
            r#"["Old Coin", {"name": 7, "description": "numbered"}, {"name": "Lens", "description": "glass"}, 42, null]"#,
        );

        let loaded = store.load();
        assert_eq!(
            loaded,
            vec![
                StoredEntry::from(ArtifactRecord::new("Old Coin", "Old Coin")),
                StoredEntry::Raw(json!({"name": 7, "description": "numbered"})),
                StoredEntry::from(ArtifactRecord::new("Lens", "glass")),
                StoredEntry::Raw(json!(42)),
                StoredEntry::Raw(Value::Null),
            ]
        );
        assert_eq!(
            read_json(&store),
            json!([
                {"name": "Old Coin", "description": "Old Coin"},
                {"name": 7, "description": "numbered"},
                {"name": "Lens", "description": "glass"},
                42,
                null
            ])
        );
    }

    #[test]
    fn test_toggle_after_load_keeps_unparsed_records_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(
            &store,
            r#"[{"name": "Lens", "description": null}, {"name": "Prism", "description": "crystal", "details": "old note"}]"#,
        );

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|e| e.record().is_none()));

        let slab = ArtifactRecord::new("Hohenfeld Basalt Slab", "basalt");
        let next = toggle_at(&loaded, &slab, fixed_now());
        store.persist(&next).unwrap();

        let on_disk = read_json(&store);
        let items = on_disk.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], json!({"name": "Lens", "description": null}));
        assert_eq!(
            items[1],
            json!({"name": "Prism", "description": "crystal", "details": "old note"})
        );
        assert_eq!(items[2]["name"], json!("Hohenfeld Basalt Slab"));
    }

    #[test]
    fn test_object_array_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let raw = r#"[{"name":"Lens","description":"glass"},{"name":"Prism","description":null}]"#;
        write_raw(&store, raw);

        store.load();
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), raw);
    }

    #[test]
    fn test_failed_write_back_still_returns_upgraded_records() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let raw = r#"["Laufen Lens\nfound in the river bed"]"#;
        write_raw(&store, raw);

        let mut perms = std::fs::metadata(store.path()).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(store.path(), perms).unwrap();
        // root 无视只读权限，写回不会失败，此时跳过
        if std::fs::OpenOptions::new().write(true).open(store.path()).is_ok() {
            return;
        }

        assert_eq!(
            store.load(),
            entries(vec![ArtifactRecord::new(
                "Laufen Lens",
                "Laufen Lens\nfound in the river bed"
            )])
        );
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), raw);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(&store, "{not valid json");

        assert!(store.load().is_empty());
        assert!(matches!(store.try_load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_non_array_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_raw(&store, r#"{"name": "Lens"}"#);

        match store.try_load() {
            Err(StoreError::UnexpectedShape { found, .. }) => assert_eq!(found, "object"),
            other => panic!("期望 UnexpectedShape，实际 {:?}", other),
        }
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_persist_failure_is_returned() {
        let dir = TempDir::new().unwrap();
        // 目标路径是一个已存在的目录，写入必然失败
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.persist(&entries(vec![ArtifactRecord::new("Lens", "glass")])),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn test_toggle_add_then_remove_is_empty() {
        let record = ArtifactRecord::new("Lens", "glass");
        let added = toggle(&[], &record);
        assert_eq!(added.len(), 1);
        assert!(toggle(&added, &record).is_empty());
    }

    #[test]
    fn test_toggle_add_stamps_discovered_date() {
        let record = ArtifactRecord::new("Lens", "glass");
        let added = toggle_at(&[], &record, fixed_now());
        assert_eq!(
            added[0].record().unwrap().discovered_date.as_deref(),
            Some("2024-05-17 09:30:00")
        );
        assert!(record.discovered_date.is_none(), "候选记录本身不被修改");
    }

    #[test]
    fn test_toggle_real_clock_format() {
        let added = toggle(&[], &ArtifactRecord::new("Lens", "glass"));
        let stamp = added[0].record().unwrap().discovered_date.clone().unwrap();
        assert!(NaiveDateTime::parse_from_str(&stamp, DISCOVERED_DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_toggle_removes_all_matching_names() {
        let current = entries(vec![
            ArtifactRecord::new("A", "1"),
            ArtifactRecord::new("B", "keep"),
            ArtifactRecord::new("A", "2"),
        ]);
        let next = toggle(&current, &ArtifactRecord::new("A", "3"));
        assert_eq!(next, entries(vec![ArtifactRecord::new("B", "keep")]));
    }

    #[test]
    fn test_toggle_matches_raw_objects_by_name() {
        let current = vec![
            StoredEntry::Raw(json!({"name": "A", "description": null})),
            StoredEntry::Raw(json!(42)),
            StoredEntry::Raw(json!({"name": 1})),
        ];
        let next = toggle(&current, &ArtifactRecord::new("A", "fresh"));
        assert_eq!(next, current[1..].to_vec());
    }

    #[test]
    fn test_toggle_duplicates_only_is_empty() {
        let current = entries(vec![ArtifactRecord::new("A", "1"), ArtifactRecord::new("A", "2")]);
        assert!(toggle(&current, &ArtifactRecord::new("A", "3")).is_empty());
    }

    #[test]
    fn test_toggle_appends_in_insertion_order() {
        let first = toggle_at(&[], &ArtifactRecord::new("Zeta", "z"), fixed_now());
        let second = toggle_at(&first, &ArtifactRecord::new("Alpha", "a"), fixed_now());
        assert_eq!(names(&second), vec![Some("Zeta"), Some("Alpha")]);
    }
}
