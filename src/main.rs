//! archeologist：文物库 + 问答 Agent 命令行
//!
//! ```bash
//! archeologist                       # 交互式 shell
//! archeologist toggle "Laufen Lens"
//! archeologist ask What did we find in the north trench?
//! ```

use archeologist_agent::agent::{Agent, AgentConfig, ArcheologistAgent};
use archeologist_agent::artifacts::ArtifactStore;
use archeologist_agent::config::AppConfig;
use archeologist_agent::console::{self, Shell};
use archeologist_agent::error::Result;
use archeologist_agent::llm::HttpChatClient;
use archeologist_agent::session::{Session, format_failure};
use archeologist_agent::tools::artifact::ArtifactLookupTool;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "archeologist", version, about = "Artifact repository with an archeologist Q&A agent")]
struct Cli {
    /// YAML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 文物库文件路径
    #[arg(long, global = true, env = "ARCHEOLOGIST_DATA")]
    data: Option<PathBuf>,

    /// 模型配置 id
    #[arg(long, global = true, env = "ARCHEOLOGIST_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出文物库
    List,
    /// 列出预置文物
    Catalog,
    /// 添加或移除一件预置文物
    Toggle { name: String },
    /// 输出查询工具返回给 Agent 的原文
    Lookup { name: Option<String> },
    /// 向 Agent 提问
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// 交互式 shell
    Shell,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "archeologist_agent=warn,archeologist=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    let store = ArtifactStore::new(&config.data_path);

    match cli.command.unwrap_or(Command::Shell) {
        Command::List => {
            let session = Session::open(store);
            print!("{}", console::render_records(session.entries()));
        }
        Command::Catalog => {
            let session = Session::open(store);
            println!("{}", console::render_catalog(session.entries()));
        }
        Command::Toggle { name } => {
            let mut session = Session::open(store);
            println!("{}", console::toggle_by_name(&mut session, &name));
        }
        Command::Lookup { name } => {
            let tool = ArtifactLookupTool::new(store);
            println!("{}", tool.lookup(name.as_deref().unwrap_or_default()).await);
        }
        Command::Ask { question } => {
            let mut session = Session::open(store.clone());
            match build_agent(&config, store) {
                Ok(agent) => console::ask_streaming(&mut session, &agent, &question.join(" ")).await,
                Err(e) => println!("{}", format_failure(&e)),
            }
        }
        Command::Shell => {
            let session = Session::open(store.clone());
            let agent = build_agent(&config, store);
            if let Err(e) = &agent {
                warn!(error = %e, "Agent 不可用，shell 中提问将直接返回错误");
            }
            let mut shell = Shell::new(
                session,
                agent
                    .as_ref()
                    .map(|a| a as &dyn Agent)
                    .map_err(|e| e.to_string()),
            );
            shell.run().await?;
        }
    }
    Ok(())
}

fn build_agent(config: &AppConfig, store: ArtifactStore) -> Result<ArcheologistAgent> {
    let client = HttpChatClient::from_env(&config.model)?;
    let agent_config: AgentConfig = config.agent_config();
    Ok(ArcheologistAgent::with_store(agent_config, Arc::new(client), store))
}
