//! 命令行界面：记录渲染、流式问答与交互式 shell

use crate::agent::{Agent, AgentEvent};
use crate::artifacts::{ArtifactRecord, StoredEntry, catalog};
use crate::error::{ArcheoError, Result};
use crate::session::{EMPTY_QUESTION_MESSAGE, Session, ToggleOutcome, format_failure};
use crate::tools::artifact::ArtifactLookupTool;
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

const HELP: &str = "\
Commands:
  :list              show the artifact repository
  :catalog           show predefined artifacts (* = in repository)
  :toggle <name>     add or remove a predefined artifact
  :lookup            show what the agent's lookup tool returns
  :help              show this help
  :quit              exit
Anything else is sent to the agent as a question.";

/// shell 中一行输入对应的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Catalog,
    Toggle(String),
    Lookup,
    Help,
    Quit,
    Ask(String),
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return ShellCommand::Ask(line.to_string());
        };
        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (rest, ""),
        };
        match cmd {
            "list" | "ls" => ShellCommand::List,
            "catalog" => ShellCommand::Catalog,
            "toggle" | "t" => ShellCommand::Toggle(arg.to_string()),
            "lookup" => ShellCommand::Lookup,
            "help" | "h" | "?" => ShellCommand::Help,
            "quit" | "q" | "exit" => ShellCommand::Quit,
            other => ShellCommand::Unknown(other.to_string()),
        }
    }
}

/// 按插入顺序渲染文物库
pub fn render_records(entries: &[StoredEntry]) -> String {
    if entries.is_empty() {
        return "No artifacts added yet. Use :toggle <name> to populate the repository.".to_string();
    }

    let mut out = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, entry.display_name()));
        match entry {
            StoredEntry::Record(record) => render_record(&mut out, record),
            StoredEntry::Raw(value) => {
                out.push_str(&format!("   Unrecognised entry: {}\n", value));
            }
        }
    }
    out
}

fn render_record(out: &mut String, record: &ArtifactRecord) {
    out.push_str(&format!(
        "   Discovered: {}\n",
        record.discovered_date.as_deref().unwrap_or("Date unknown")
    ));
    if let Some(details) = &record.details {
        if let Some(location) = &details.location {
            out.push_str(&format!("   Location: {}\n", location));
        }
        if let Some(summary) = &details.summary {
            out.push_str(&format!("   Summary: {}...\n", summary.trim_end().trim_end_matches('.')));
        }
    }
    let description = record.display_description();
    let description = if description.is_empty() {
        "No description provided."
    } else {
        description
    };
    for line in description.lines() {
        out.push_str(&format!("   | {}\n", line));
    }
    if let Some(metadata) = record.metadata.as_ref().filter(|m| !m.is_empty()) {
        let pretty = serde_json::to_string_pretty(metadata).unwrap_or_default();
        out.push_str("   Metadata:\n");
        for line in pretty.lines() {
            out.push_str(&format!("     {}\n", line));
        }
    }
}

/// 渲染预置目录，已在库中的条目以 `*` 标记
pub fn render_catalog(current: &[StoredEntry]) -> String {
    catalog::predefined()
        .iter()
        .map(|entry| {
            let mark = if current.iter().any(|e| e.name() == Some(entry.name.as_str())) {
                '*'
            } else {
                ' '
            };
            let summary = entry
                .details
                .as_ref()
                .and_then(|d| d.summary.as_deref())
                .unwrap_or_default();
            format!("[{}] {:<22} {}", mark, entry.name, summary)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 按目录名称切换，返回给用户看的提示
pub fn toggle_by_name(session: &mut Session, name: &str) -> String {
    if name.trim().is_empty() {
        return "Usage: toggle <name>".to_string();
    }
    match catalog::find(name) {
        Some(record) => match session.toggle(&record) {
            ToggleOutcome::Added => format!("Added '{}'.", record.name),
            ToggleOutcome::Removed => format!("Removed '{}'.", record.name),
        },
        None => {
            let names: Vec<String> = catalog::predefined().into_iter().map(|r| r.name).collect();
            format!(
                "No predefined artifact named '{}'. Available: {}",
                name.trim(),
                names.join(", ")
            )
        }
    }
}

/// 流式提问：实时打印工具事件，最终答案写入会话输出区
pub async fn ask_streaming(session: &mut Session, agent: &dyn Agent, question: &str) {
    let question = question.trim();
    if question.is_empty() {
        session.set_agent_output(EMPTY_QUESTION_MESSAGE);
        println!("{}", EMPTY_QUESTION_MESSAGE);
        return;
    }

    let mut stream = agent.execute_stream(question);
    while let Some(event) = stream.next().await {
        match event {
            Ok(AgentEvent::ToolCall { name, args }) => {
                println!("🔧 {} {}", name, args);
            }
            Ok(AgentEvent::ToolResult { name, output }) => {
                println!("📥 {} returned {} bytes", name, output.len());
            }
            Ok(AgentEvent::FinalAnswer(answer)) => {
                println!("\n{}\n", answer);
                session.set_agent_output(answer);
            }
            Err(e) => {
                let failure = format_failure(&e);
                println!("\n{}\n", failure);
                session.set_agent_output(failure);
                break;
            }
        }
        let _ = std::io::stdout().flush();
    }
}

/// 交互式 shell
pub struct Shell<'a> {
    session: Session,
    /// Agent 不可用时保存原因，提问时展示
    agent: std::result::Result<&'a dyn Agent, String>,
}

impl<'a> Shell<'a> {
    pub fn new(session: Session, agent: std::result::Result<&'a dyn Agent, String>) -> Self {
        Self { session, agent }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        println!("Archeologist Agent. Type :help for commands.");

        loop {
            let line = match editor.readline("archeologist> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(readline_error(e)),
            };
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            if !self.handle(ShellCommand::parse(&line)).await {
                break;
            }
        }
        Ok(())
    }

    /// 执行一条指令，返回 `false` 表示退出
    pub async fn handle(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::List => print!("{}", render_records(self.session.entries())),
            ShellCommand::Catalog => println!("{}", render_catalog(self.session.entries())),
            ShellCommand::Toggle(name) => println!("{}", toggle_by_name(&mut self.session, &name)),
            ShellCommand::Lookup => {
                let tool = ArtifactLookupTool::new(self.session.store().clone());
                println!("{}", tool.lookup("").await);
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => return false,
            ShellCommand::Ask(question) => match self.agent {
                Ok(agent) => ask_streaming(&mut self.session, agent, &question).await,
                Err(ref reason) => {
                    let failure = format_failure(reason);
                    println!("{}", failure);
                    self.session.set_agent_output(failure);
                }
            },
            ShellCommand::Empty => {}
            ShellCommand::Unknown(cmd) => println!("Unknown command ':{}'. Type :help.", cmd),
        }
        true
    }
}

fn readline_error(e: ReadlineError) -> ArcheoError {
    ArcheoError::Other(format!("terminal error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentConfig, ArcheologistAgent};
    use crate::artifacts::{ArtifactDetails, ArtifactStore};
    use crate::testing::MockChatClient;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse(""), ShellCommand::Empty);
        assert_eq!(ShellCommand::parse(":list"), ShellCommand::List);
        assert_eq!(
            ShellCommand::parse(":toggle  Laufen Lens "),
            ShellCommand::Toggle("Laufen Lens".to_string())
        );
        assert_eq!(ShellCommand::parse(":q"), ShellCommand::Quit);
        assert_eq!(
            ShellCommand::parse("What is the Lens?"),
            ShellCommand::Ask("What is the Lens?".to_string())
        );
        assert_eq!(
            ShellCommand::parse(":dig"),
            ShellCommand::Unknown("dig".to_string())
        );
    }

    #[test]
    fn test_render_empty() {
        assert!(render_records(&[]).starts_with("No artifacts added yet"));
    }

    #[test]
    fn test_render_record_fields() {
        let mut record = ArtifactRecord::new("Lens", "polished\nglass").with_details(ArtifactDetails {
            summary: Some("A lens.".to_string()),
            location: Some("Trench 4".to_string()),
            ..Default::default()
        });
        record.discovered_date = Some("2024-05-17 09:30:00".to_string());

        let out = render_records(&[StoredEntry::from(record), StoredEntry::from(ArtifactRecord::new("", ""))]);
        assert!(out.contains("1. Lens"));
        assert!(out.contains("Discovered: 2024-05-17 09:30:00"));
        assert!(out.contains("Location: Trench 4"));
        assert!(out.contains("Summary: A lens..."));
        assert!(out.contains("   | glass"));
        assert!(out.contains("2. Unknown"));
        assert!(out.contains("Date unknown"));
        assert!(out.contains("No description provided."));
    }

    #[test]
    fn test_render_falls_back_to_details_name() {
        let record = ArtifactRecord::new("", "basalt").with_details(ArtifactDetails {
            name: Some("Hohenfeld Basalt Slab".to_string()),
            ..Default::default()
        });
        let raw = StoredEntry::from_value(json!({"name": 7, "details": {"name": "Altbrunn Prism"}}));

        let out = render_records(&[StoredEntry::from(record), raw]);
        assert!(out.contains("1. Hohenfeld Basalt Slab"));
        assert!(out.contains("2. Altbrunn Prism"));
        assert!(out.contains("Unrecognised entry:"));
    }

    #[test]
    fn test_toggle_by_name_and_catalog_marks() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(ArtifactStore::new(dir.path().join("a.json")));

        assert_eq!(
            toggle_by_name(&mut session, "altbrunn prism"),
            "Added 'Altbrunn Prism'."
        );
        assert!(render_catalog(session.entries()).contains("[*] Altbrunn Prism"));
        assert!(render_catalog(session.entries()).contains("[ ] Laufen Lens"));
        assert!(toggle_by_name(&mut session, "Golden Idol").starts_with("No predefined artifact"));
        assert_eq!(
            toggle_by_name(&mut session, "Altbrunn Prism"),
            "Removed 'Altbrunn Prism'."
        );
        assert!(session.entries().is_empty());
    }

    #[tokio::test]
    async fn test_shell_ask_without_agent() {
        let dir = TempDir::new().unwrap();
        let session = Session::open(ArtifactStore::new(dir.path().join("a.json")));
        let mut shell = Shell::new(session, Err("Model 'openai' is not configured".to_string()));

        assert!(shell.handle(ShellCommand::Ask("Lens?".to_string())).await);
        assert_eq!(
            shell.session().agent_output(),
            "Agent run failed: Model 'openai' is not configured"
        );
        assert!(!shell.handle(ShellCommand::Quit).await);
    }

    #[tokio::test]
    async fn test_ask_streaming_records_answer() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(ArtifactStore::new(dir.path().join("a.json")));
        let mock = MockChatClient::new()
            .with_tool_call("get_artifact_details", r#"{"artifact_name":"Lens"}"#)
            .with_text("Nothing is catalogued yet.");
        let agent = ArcheologistAgent::with_store(
            AgentConfig::archeologist("mock"),
            Arc::new(mock),
            session.store().clone(),
        );

        ask_streaming(&mut session, &agent, "Lens?").await;
        assert_eq!(session.agent_output(), "Nothing is catalogued yet.");
    }
}
