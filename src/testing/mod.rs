//! 测试基础设施
//!
//! 提供在不依赖真实 LLM 的情况下测试 Agent 与工具的工具集。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockChatClient`] | 替代真实模型，按脚本返回文本或工具调用 |
//! | [`MockTool`] | 替代真实工具，用于测试 Agent 的工具调用 / 错误处理行为 |
//!
//! 所有 Mock 都完全在内存中运行，内部使用 `Arc<Mutex<_>>`，
//! `clone()` 后交给 Agent 的副本与测试手里的实例共享调用记录。

mod mock_llm;
mod mock_tool;

pub use mock_llm::MockChatClient;
pub use mock_tool::MockTool;
