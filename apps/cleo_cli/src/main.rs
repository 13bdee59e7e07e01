// apps/cleo_cli/src/main.rs

//! CLEO 命令行界面
//!
//! `runcleo <config.yaml>` 运行耦合超级液滴模型。
//! 正常结束退出码为 0；任何致命错误打印诊断并以非零退出。

mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use cleo_config::Config;

/// CLEO 超级液滴模型
#[derive(Parser)]
#[command(name = "runcleo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLEO superdroplet model", long_about = None)]
struct Cli {
    /// YAML 配置文件路径
    config: PathBuf,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 只验证配置, 不运行
    #[arg(long)]
    validate_only: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("日志初始化失败");
        return ExitCode::FAILURE;
    }

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("致命错误: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::from_yaml_file(&cli.config)?;

    if cli.validate_only {
        tracing::info!("配置有效: {}", cli.config.display());
        return Ok(());
    }

    run::execute(&config)
}
