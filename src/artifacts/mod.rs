//! 文物数据
//!
//! | 模块 | 作用 |
//! |------|------|
//! | [`record`] | 记录类型 [`ArtifactRecord`]、库内条目 [`StoredEntry`] |
//! | [`store`] | JSON 文件持久化 [`ArtifactStore`] 与 [`toggle`] |
//! | [`catalog`] | 预置文物目录 |
//!
//! ```rust,no_run
//! use archeologist_agent::artifacts::{ArtifactStore, catalog, toggle};
//!
//! let store = ArtifactStore::default();
//! let entries = store.load();
//! let prism = catalog::find("Altbrunn Prism").unwrap();
//! let entries = toggle(&entries, &prism);
//! store.persist(&entries).ok();
//! ```

pub mod catalog;
pub mod record;
pub mod store;

pub use record::{ArtifactDetails, ArtifactRecord, StoredEntry};
pub use store::{ArtifactStore, DEFAULT_STORE_PATH, toggle, toggle_at};
