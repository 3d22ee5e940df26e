use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cronslot::{Application, Cli, Commands};
use cronslot_config::{AppConfig, LogLevel, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = AppConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载配置失败".to_string(),
    })?;
    cli.apply_overrides(&mut config)?;

    init_logging(
        config.observability.log_level,
        config.observability.log_format,
    )?;

    let app = Application::new(config);
    let now = Utc::now();

    match &cli.command {
        Commands::Plan(_) => {
            info!("任务目录: {}", app.config().io.catalog_path);
            let report = app.plan(now)?;
            println!(
                "{} 个空闲区间, {} 条候选调度 -> {}",
                report.free_intervals.len(),
                report.schedules.len(),
                app.file_sink().schedules_path().display()
            );
        }
        Commands::Lookup(_) => {
            info!("任务目录: {}", app.config().io.catalog_path);
            let report = app.lookup(now)?;
            let window = app.config().window.to_window()?;
            println!(
                "{} 个任务在时间窗口内执行 -> {}",
                report.rows.len(),
                app.file_sink().lookup_path(&window).display()
            );
        }
        Commands::Fit(args) => {
            let candidate = args.candidate()?;
            info!("任务目录: {}", app.config().io.catalog_path);
            let report = app.fit(&candidate, now)?;
            let fitting = report.runs.values().filter(|runs| !runs.is_empty()).count();
            println!(
                "{} / {} 个任务之前可以运行候选任务 -> {}",
                fitting,
                report.runs.len(),
                app.file_sink().fit_path(&candidate.name).display()
            );
        }
        Commands::Config => {
            print!("{}", app.config().to_toml()?);
        }
    }

    Ok(())
}

/// 初始化日志系统，RUST_LOG 优先于配置的级别，日志写到 stderr
fn init_logging(log_level: LogLevel, log_format: OutputFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        OutputFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        OutputFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}
