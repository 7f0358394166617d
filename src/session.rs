//! 会话状态
//!
//! 界面层持有的内存状态：文物库条目列表 + 最近一次 Agent 输出。
//! 由调用方创建并传入各操作，不依赖任何全局变量。

use crate::agent::Agent;
use crate::artifacts::{ArtifactRecord, ArtifactStore, StoredEntry, toggle};
use tracing::{info, warn};

/// 提问为空时写入输出区的提示
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question before sending.";

/// 一次 toggle 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct Session {
    store: ArtifactStore,
    entries: Vec<StoredEntry>,
    agent_output: String,
}

impl Session {
    /// 从库文件加载一次，之后以内存列表为准
    pub fn open(store: ArtifactStore) -> Self {
        let entries = store.load();
        info!(path = %store.path().display(), count = entries.len(), "🗄️ 会话已加载文物库");
        Self {
            store,
            entries,
            agent_output: String::new(),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn entries(&self) -> &[StoredEntry] {
        &self.entries
    }

    pub fn agent_output(&self) -> &str {
        &self.agent_output
    }

    /// 切换一条记录并立即写盘
    ///
    /// 写盘失败只记录日志，内存状态照常更新，直到下一次成功写入前与磁盘不一致。
    pub fn toggle(&mut self, candidate: &ArtifactRecord) -> ToggleOutcome {
        let before = self.entries.len();
        self.entries = toggle(&self.entries, candidate);
        let outcome = if self.entries.len() > before {
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Removed
        };

        if let Err(e) = self.store.persist(&self.entries) {
            warn!(error = %e, "文物库写入失败，内存状态与磁盘暂不一致");
        }
        info!(name = %candidate.name, ?outcome, count = self.entries.len(), "文物已切换");
        outcome
    }

    /// 把问题交给 Agent，结果写入输出区；失败以文本形式呈现，不向上抛出
    pub async fn ask(&mut self, agent: &dyn Agent, question: &str) -> &str {
        let question = question.trim();
        if question.is_empty() {
            self.agent_output = EMPTY_QUESTION_MESSAGE.to_string();
            return &self.agent_output;
        }

        self.agent_output = match agent.execute(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Agent 执行失败");
                format_failure(&e)
            }
        };
        &self.agent_output
    }

    /// 直接设置输出区（流式渲染时由界面层逐步写入）
    pub fn set_agent_output(&mut self, output: impl Into<String>) {
        self.agent_output = output.into();
    }
}

/// Agent 失败时展示给用户的文本
pub fn format_failure(err: &dyn std::fmt::Display) -> String {
    format!("Agent run failed: {err}")
}
