use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    logging::ObservabilityConfig,
    planner::{IoConfig, PlannerConfig, RangeConfig, WindowConfig},
};
use crate::validation::ConfigValidator;

/// 环境变量前缀，例如 `CRONSLOT__PLANNER__MAX_RUNS_PER_DAY=6`
pub const ENV_PREFIX: &str = "CRONSLOT";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 按 默认值 -> TOML 文件 -> 环境变量 的顺序合并配置
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("planner.max_runs_per_day", i64::from(defaults.planner.max_runs_per_day))?
            .set_default("planner.min_hours_gap", defaults.planner.min_hours_gap)?
            .set_default("planner.runtime_min", defaults.planner.runtime_min)?
            .set_default("planner.runtime_max", defaults.planner.runtime_max)?
            .set_default("planner.require_same_category", defaults.planner.require_same_category)?
            .set_default("planner.expand_occurrences", defaults.planner.expand_occurrences)?
            .set_default("planner.occurrence_cap", defaults.planner.occurrence_cap as i64)?
            .set_default("window.start_hour", i64::from(defaults.window.start_hour))?
            .set_default("window.end_hour", i64::from(defaults.window.end_hour))?
            .set_default("range.start", defaults.range.start.as_str())?
            .set_default("range.end", defaults.range.end.as_str())?
            .set_default("range.utc_offset", defaults.range.utc_offset.as_str())?
            .set_default("io.catalog_path", defaults.io.catalog_path.as_str())?
            .set_default("io.output_dir", defaults.io.output_dir.as_str())?
            .set_default(
                "observability.log_level",
                defaults.observability.log_level.to_string(),
            )?
            .set_default(
                "observability.log_format",
                defaults.observability.log_format.to_string(),
            )?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/cronslot.toml", "cronslot.toml"];
            if let Some(path) = default_paths.iter().find(|path| Path::new(path).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.planner.validate()?;
        self.window.validate()?;
        self.range.validate()?;
        self.io.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
