//! Governance Engine 命令行入口
//!
//! 读取配置文件，推导策略文档或解析插件，结果以 JSON 输出到标准输出。

use anyhow::Result;
use clap::{Parser, Subcommand};
use governance_engine::core::derivation::PolicyDeriver;
use governance_engine::storage::config::ConfigManager;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "governance-engine")]
#[command(about = "Derive governance policy documents and resolve semantic-id addons")]
struct Cli {
    /// 配置文件路径（默认使用用户配置目录）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 推导策略文档
    Derive {
        /// 按语义ID选择治理配置
        #[arg(short, long)]
        semantic_id: Option<String>,
    },
    /// 解析语义ID对应的插件
    Resolve {
        /// 原始语义ID
        semantic_id: String,
    },
    /// 列出所有插件
    Addons,
    /// 写入默认配置文件
    Init {
        /// 覆盖已存在的配置文件
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let manager = ConfigManager::new(cli.config.unwrap_or_else(ConfigManager::default_path));

    match cli.command {
        Command::Init { force } => {
            if manager.init(force)? {
                println!("{}", manager.path().display());
            } else {
                eprintln!("配置文件已存在: {} (使用 --force 覆盖)", manager.path().display());
            }
        }
        Command::Derive { semantic_id } => {
            let config = manager.load()?;
            let deriver = PolicyDeriver::new(config.derivation);
            let documents = deriver.derive(&config.governance, semantic_id.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        Command::Resolve { semantic_id } => {
            let registry = manager.load()?.build_registry()?;
            match registry.resolve(&semantic_id) {
                Some(addon) => println!("{}", serde_json::to_string_pretty(addon)?),
                None => {
                    tracing::info!("没有匹配的插件: {}", semantic_id);
                    println!("null");
                }
            }
        }
        Command::Addons => {
            let registry = manager.load()?.build_registry()?;
            println!("{}", serde_json::to_string_pretty(&registry.list_all())?);
        }
    }

    Ok(())
}
