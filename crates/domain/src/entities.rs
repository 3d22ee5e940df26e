use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 未受保护任务的优先级哨兵值（最低优先级层级）
pub const UNPROTECTED_PRIORITY: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub category: String,
    pub schedule: String, // 五段式 cron 表达式
    pub average_runtime: Duration,
    pub priority: u8, // 数值越小优先级越高
}

impl Job {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        schedule: impl Into<String>,
        average_runtime: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            schedule: schedule.into(),
            average_runtime,
            priority: UNPROTECTED_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// 优先级高于哨兵层级的任务，其运行窗口不允许被新调度侵占
    pub fn is_protected(&self) -> bool {
        self.priority < UNPROTECTED_PRIORITY
    }
}

/// 某个任务在枚举序列中的一次具体执行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob<'a> {
    pub job: &'a Job,
    pub occurrence: DateTime<Utc>,
}

impl<'a> ScheduledJob<'a> {
    pub fn new(job: &'a Job, occurrence: DateTime<Utc>) -> Self {
        Self { job, occurrence }
    }

    /// 超出可表示范围时取 `DateTime::MAX_UTC`
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.occurrence
            .checked_add_signed(self.job.average_runtime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn busy_window(&self) -> Interval {
        Interval {
            start: self.occurrence,
            end: self.finished_at(),
        }
    }
}

/// 时间区间，`end >= start`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// 开区间判断，边界点不算在内
    pub fn strictly_contains(&self, instant: DateTime<Utc>) -> bool {
        self.start < instant && instant < self.end
    }
}

/// 查询或规划的日期范围
pub type TimeRange = Interval;

/// 规则无法解析或数据不完整而被跳过的任务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectedJob {
    pub job_name: String,
    pub reason: String,
}

impl RejectedJob {
    pub fn new(job_name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            job_name: job_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// 为一个空闲区间和一个平均运行时长生成的候选调度
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynthesizedSchedule {
    pub free_interval: Interval,
    pub average_runtime: i64, // 分钟
    #[serde(rename = "crontab_schedule_utc")]
    pub recurrence_expression_utc: String,
    #[serde(rename = "crontab_schedule_local")]
    pub recurrence_expression_local: String,
    pub num_runs: u32,
    pub num_unassigned: u32,
    /// 冲突任务名称 -> 冲突次数，没有冲突的任务不出现
    #[serde(default)]
    pub overlap: BTreeMap<String, u32>,
}

impl SynthesizedSchedule {
    pub fn with_overlap(mut self, overlap: BTreeMap<String, u32>) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn has_conflicts(&self) -> bool {
        !self.overlap.is_empty()
    }

    pub fn total_overlaps(&self) -> u32 {
        self.overlap.values().sum()
    }
}

/// 查询模式的输出行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobOccurrences {
    pub job_name: String,
    #[serde(rename = "datetimes")]
    pub occurrences: Vec<String>,
}
