use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use history_core::config::AppConfig;
use history_infrastructure::HistoryRepositoryFactory;
use history_observability::{init_observability, shutdown_observability};
use tracing::{error, info, Instrument};

mod commands;

/// 编排历史查看工具
#[derive(Parser, Debug)]
#[command(name = "history-inspector")]
#[command(version = "1.0.0")]
#[command(about = "持久化编排历史查看工具")]
#[command(long_about = "查看编排实例的历史事件以及调度时记录的分布式追踪上下文")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// 日志格式
    #[arg(long, value_parser = ["json", "pretty", "compact"])]
    log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 显示实例的完整历史
    Show {
        /// 编排实例ID
        instance_id: String,
    },
    /// 显示调度事件中记录的追踪上下文及解析结果
    Traces {
        /// 编排实例ID
        instance_id: String,
    },
    /// 列出所有编排实例
    List,
    /// 在当前追踪 span 下记录一段示例编排
    RecordDemo {
        /// 实例ID，默认随机生成
        #[arg(long)]
        instance_id: Option<String>,
    },
    /// 删除实例的全部历史
    Purge {
        /// 编排实例ID
        instance_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse().map_err(anyhow::Error::msg)?;
    }

    let guard = init_observability(&config)?;
    info!(storage.backend = ?config.storage.backend, "history-inspector started");

    let result = run(cli.command, &config).await;
    if let Err(e) = &result {
        error!("命令执行失败: {:#}", e);
    }

    shutdown_observability(guard);
    result
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let repo = HistoryRepositoryFactory::create(&config.storage).await?;
    let mut out = std::io::stdout();

    match command {
        Commands::Show { instance_id } => commands::show(repo.as_ref(), &instance_id, &mut out).await,
        Commands::Traces { instance_id } => {
            commands::traces(repo.as_ref(), &instance_id, &mut out).await
        }
        Commands::List => commands::list(repo.as_ref(), &mut out).await,
        Commands::RecordDemo { instance_id } => {
            let instance_id = instance_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let span = tracing::info_span!("orchestration.record_demo", instance.id = %instance_id);
            let log = commands::record_demo(repo.as_ref(), &instance_id)
                .instrument(span)
                .await?;
            println!("recorded {} events for {}", log.len(), instance_id);
            Ok(())
        }
        Commands::Purge { instance_id } => {
            commands::purge(repo.as_ref(), &instance_id, &mut out).await
        }
    }
}
