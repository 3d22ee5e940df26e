use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::{ConfigError, ConfigResult};
use cronslot_domain::{parse_time_range, TimeRange, TimeWindowSpec, TimezoneOffset};

/// 单个任务展开执行时间的上限
pub const MAX_OCCURRENCE_CAP: usize = 1_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub max_runs_per_day: u32,
    pub min_hours_gap: f64,
    /// 候选平均运行时长的扫描范围（分钟，闭区间）
    pub runtime_min: i64,
    pub runtime_max: i64,
    pub require_same_category: bool,
    pub expand_occurrences: bool,
    pub occurrence_cap: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_runs_per_day: 4,
            min_hours_gap: 1.0,
            runtime_min: 1,
            runtime_max: 15,
            require_same_category: false,
            expand_occurrences: false,
            occurrence_cap: 10_000,
        }
    }
}

impl PlannerConfig {
    pub fn runtimes(&self) -> std::ops::RangeInclusive<i64> {
        self.runtime_min..=self.runtime_max
    }
}

impl ConfigValidator for PlannerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_runs_per_day == 0 {
            return Err(ConfigError::Validation(
                "planner.max_runs_per_day must be greater than 0".to_string(),
            ));
        }
        ValidationUtils::validate_non_negative(self.min_hours_gap, "planner.min_hours_gap")?;
        if self.runtime_min < 0 {
            return Err(ConfigError::Validation(format!(
                "planner.runtime_min must not be negative, got {}",
                self.runtime_min
            )));
        }
        if self.runtime_min > self.runtime_max {
            return Err(ConfigError::Validation(format!(
                "planner.runtime_min ({}) must not exceed planner.runtime_max ({})",
                self.runtime_min, self.runtime_max
            )));
        }
        if self.runtime_min == 0 && self.min_hours_gap == 0.0 {
            return Err(ConfigError::Validation(
                "planner.runtime_min and planner.min_hours_gap cannot both be 0".to_string(),
            ));
        }
        ValidationUtils::validate_count(
            self.occurrence_cap,
            MAX_OCCURRENCE_CAP,
            "planner.occurrence_cap",
        )?;
        Ok(())
    }
}

/// 查询模式使用的本地小时窗口，`end_hour` 不包含在内
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 24,
        }
    }
}

impl WindowConfig {
    pub fn to_window(&self) -> ConfigResult<TimeWindowSpec> {
        Ok(TimeWindowSpec::new(self.start_hour, self.end_hour)?)
    }
}

impl ConfigValidator for WindowConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.to_window().map(|_| ())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RangeConfig {
    /// `now`、`YYYY-MM-DD` 或 `YYYY-MM-DD HH:MM`
    pub start: String,
    /// 绝对时间或 `+Nd`
    pub end: String,
    /// `±H:MM`
    pub utc_offset: String,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: "now".to_string(),
            end: "+1d".to_string(),
            utc_offset: "+0:00".to_string(),
        }
    }
}

impl RangeConfig {
    pub fn to_time_range(&self, now: DateTime<Utc>) -> ConfigResult<TimeRange> {
        Ok(parse_time_range(&self.start, &self.end, now)?)
    }

    pub fn offset(&self) -> ConfigResult<TimezoneOffset> {
        Ok(self.utc_offset.parse::<TimezoneOffset>()?)
    }
}

impl ConfigValidator for RangeConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.to_time_range(Utc::now())?;
        self.offset()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IoConfig {
    /// 任务目录文件（`.toml` 或 `.json`）
    pub catalog_path: String,
    pub output_dir: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            catalog_path: "jobs.toml".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

impl ConfigValidator for IoConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.catalog_path, "io.catalog_path")?;
        ValidationUtils::validate_not_empty(&self.output_dir, "io.output_dir")?;
        Ok(())
    }
}
