use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cronslot_config::{AppConfig, ConfigValidator, LogLevel, OutputFormat};
use cronslot_domain::{assign_category, parse_runtime, Job, TimeWindowSpec};

/// 命令行入口
#[derive(Parser, Debug)]
#[command(name = "cronslot")]
#[command(version = "1.0.0")]
#[command(about = "定时任务空闲时段分析与调度规则生成工具")]
#[command(long_about = "枚举任务目录中 cron 表达式的执行时间，找出任务之间的空闲区间，为新任务生成调度表达式并检查与高优先级任务的冲突")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径，未指定时依次查找 config/cronslot.toml、cronslot.toml
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// 日志级别
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// 日志格式 (json, pretty)
    #[arg(long, global = true)]
    pub log_format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 计算空闲区间并生成候选调度
    Plan(PlanArgs),
    /// 列出时间窗口内的任务执行时间
    Lookup(LookupArgs),
    /// 列出候选任务在每个已有任务下一次执行之前可以运行的时间
    Fit(FitArgs),
    /// 打印合并后的有效配置
    Config,
}

/// 各子命令共用的参数
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// 任务目录文件 (.toml 或 .json)
    #[arg(long)]
    pub catalog: Option<String>,

    /// 结果输出目录
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// 范围起点: now、YYYY-MM-DD 或 "YYYY-MM-DD HH:MM"
    #[arg(long)]
    pub start: Option<String>,

    /// 范围终点: 绝对时间或 +Nd
    #[arg(long)]
    pub end: Option<String>,

    /// 本地时区偏移，格式 ±H:MM
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// 单个任务展开执行时间的上限
    #[arg(long)]
    pub occurrence_cap: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// 每天最多运行次数
    #[arg(long)]
    pub max_runs_per_day: Option<u32>,

    /// 相邻两次运行之间的最小间隔（小时）
    #[arg(long)]
    pub min_hours_gap: Option<f64>,

    /// 候选平均运行时长下限（分钟）
    #[arg(long)]
    pub runtime_min: Option<i64>,

    /// 候选平均运行时长上限（分钟）
    #[arg(long)]
    pub runtime_max: Option<i64>,

    /// 只保留两侧任务分类相同的空闲区间
    #[arg(long)]
    pub same_category: bool,

    /// 展开范围内的全部执行时间，而不是每个任务只取下一次
    #[arg(long)]
    pub expand: bool,
}

#[derive(Args, Debug, Default)]
pub struct LookupArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// 本地小时窗口，例如 "3 5" 或跨午夜的 "22 2"
    #[arg(short, long)]
    pub window: Option<TimeWindowSpec>,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// 候选任务名称，与目录中同名的任务不参与比对
    #[arg(long, default_value = "new_job")]
    pub name: String,

    /// 候选任务的五段式 cron 表达式
    #[arg(long)]
    pub schedule: String,

    /// 候选任务的平均运行时长，例如 "30 mins"
    #[arg(long, default_value = "30 mins")]
    pub runtime: String,
}

impl FitArgs {
    pub fn candidate(&self) -> Result<Job> {
        let runtime = parse_runtime(&self.runtime)
            .with_context(|| format!("候选任务运行时长无效: {}", self.runtime))?;
        Ok(Job::new(
            &self.name,
            assign_category(&self.name),
            &self.schedule,
            runtime,
        ))
    }
}

impl CommonArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(catalog) = &self.catalog {
            config.io.catalog_path = catalog.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.io.output_dir = output_dir.clone();
        }
        if let Some(start) = &self.start {
            config.range.start = start.clone();
        }
        if let Some(end) = &self.end {
            config.range.end = end.clone();
        }
        if let Some(offset) = &self.utc_offset {
            config.range.utc_offset = offset.clone();
        }
        if let Some(cap) = self.occurrence_cap {
            config.planner.occurrence_cap = cap;
        }
    }
}

impl Cli {
    /// 命令行参数优先级最高，覆盖之后重新校验配置
    pub fn apply_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }

        match &self.command {
            Commands::Plan(args) => {
                args.common.apply(config);
                if let Some(max_runs) = args.max_runs_per_day {
                    config.planner.max_runs_per_day = max_runs;
                }
                if let Some(gap) = args.min_hours_gap {
                    config.planner.min_hours_gap = gap;
                }
                if let Some(runtime_min) = args.runtime_min {
                    config.planner.runtime_min = runtime_min;
                }
                if let Some(runtime_max) = args.runtime_max {
                    config.planner.runtime_max = runtime_max;
                }
                config.planner.require_same_category |= args.same_category;
                config.planner.expand_occurrences |= args.expand;
            }
            Commands::Lookup(args) => {
                args.common.apply(config);
                if let Some(window) = args.window {
                    config.window.start_hour = window.start_hour();
                    config.window.end_hour = window.end_hour();
                }
            }
            Commands::Fit(args) => args.common.apply(config),
            Commands::Config => {}
        }

        config.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_arguments() {
        let cli = Cli::try_parse_from([
            "cronslot",
            "plan",
            "--catalog",
            "jobs.json",
            "--max-runs-per-day",
            "2",
            "--min-hours-gap",
            "0.5",
            "--utc-offset",
            "-3:00",
            "--same-category",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.io.catalog_path, "jobs.json");
        assert_eq!(config.planner.max_runs_per_day, 2);
        assert_eq!(config.planner.min_hours_gap, 0.5);
        assert_eq!(config.range.utc_offset, "-3:00");
        assert!(config.planner.require_same_category);
        assert!(!config.planner.expand_occurrences);
        assert_eq!(config.observability.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_parse_lookup_window() {
        let cli = Cli::try_parse_from(["cronslot", "lookup", "--window", "22 2"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.window.start_hour, 22);
        assert_eq!(config.window.end_hour, 2);

        assert!(Cli::try_parse_from(["cronslot", "lookup", "--window", "25 2"]).is_err());
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let cli = Cli::try_parse_from(["cronslot", "plan", "--utc-offset", "5:30"]).unwrap();
        let mut config = AppConfig::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }

    #[test]
    fn test_parse_fit_candidate() {
        let cli = Cli::try_parse_from([
            "cronslot",
            "fit",
            "--name",
            "bus_cleanup",
            "--schedule",
            "0/30 8-11 * * *",
            "--runtime",
            "1 hours",
            "--end",
            "+2d",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.range.end, "+2d");

        let Commands::Fit(args) = &cli.command else {
            panic!("应解析为 fit 子命令");
        };
        let candidate = args.candidate().unwrap();
        assert_eq!(candidate.name, "bus_cleanup");
        assert_eq!(candidate.category, "bus");
        assert_eq!(candidate.average_runtime, chrono::Duration::hours(1));

        assert!(Cli::try_parse_from(["cronslot", "fit"]).is_err());
    }
}
