pub mod agent;
pub mod artifacts;
pub mod config;
pub mod console;
pub mod error;
pub mod llm;
pub mod session;
pub mod testing;
pub mod tools;

pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, AgentEvent, ArcheologistAgent};
    pub use crate::artifacts::{ArtifactRecord, ArtifactStore, StoredEntry};
    pub use crate::error::Result;
    pub use crate::session::Session;
    pub use crate::tools::{Tool, ToolParameters, ToolResult};
}
