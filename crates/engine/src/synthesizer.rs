use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::Timelike;
use tracing::{debug, info};

use crate::cron_utils::RecurrenceRule;
use cronslot_domain::{Interval, SynthesizedSchedule, TimezoneOffset};
use cronslot_errors::{PlannerError, PlannerResult};

/// 小时字段允许的最大步长
const MAX_HOUR_STEP: i64 = 23;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// 新任务的调度约束
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisConstraints {
    pub max_runs_per_day: u32,
    pub min_hours_gap: f64,
}

impl SynthesisConstraints {
    pub fn new(max_runs_per_day: u32, min_hours_gap: f64) -> PlannerResult<Self> {
        let constraints = Self {
            max_runs_per_day,
            min_hours_gap,
        };
        constraints.validate()?;
        Ok(constraints)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.max_runs_per_day == 0 {
            return Err(PlannerError::invalid_constraints("每日最大运行次数必须大于0"));
        }
        if !self.min_hours_gap.is_finite() || self.min_hours_gap < 0.0 {
            return Err(PlannerError::invalid_constraints(format!(
                "最小间隔小时数无效: {}",
                self.min_hours_gap
            )));
        }
        Ok(())
    }

    /// 相邻两次运行之间的有效间隔（分钟），不小于运行时长也不小于最小间隔
    pub fn spacing_minutes(&self, average_runtime: i64) -> f64 {
        (average_runtime as f64).max(self.min_hours_gap * 60.0)
    }

    /// 在合成开始之前拒绝会导致零间隔的参数组合
    pub fn ensure_positive_spacing(&self, average_runtime: i64) -> PlannerResult<()> {
        if average_runtime < 0 {
            return Err(PlannerError::invalid_constraints(format!(
                "平均运行时长不能为负: {average_runtime}"
            )));
        }
        if self.spacing_minutes(average_runtime) <= 0.0 {
            return Err(PlannerError::invalid_constraints(
                "平均运行时长与最小间隔不能同时为0",
            ));
        }
        Ok(())
    }
}

/// 为一个空闲区间合成调度表达式，区间容纳不下任何一次运行时返回 `None`
pub fn synthesize(
    free_interval: &Interval,
    constraints: &SynthesisConstraints,
    average_runtime: i64,
    offset: TimezoneOffset,
) -> PlannerResult<Option<SynthesizedSchedule>> {
    constraints.validate()?;
    constraints.ensure_positive_spacing(average_runtime)?;

    let duration_minutes = free_interval.duration_minutes();
    let spacing = constraints.spacing_minutes(average_runtime);
    let num_runs = ((duration_minutes as f64 / spacing).floor() as i64)
        .min(i64::from(constraints.max_runs_per_day));
    if num_runs <= 0 {
        debug!(
            "空闲区间 {} 分钟不足以容纳间隔 {} 分钟的运行",
            duration_minutes, spacing
        );
        return Ok(None);
    }

    let frequency_hours = (duration_minutes / num_runs / 60).min(MAX_HOUR_STEP);
    let spans_full_day = duration_minutes >= MINUTES_PER_DAY;

    let utc_expression = compose_expression(
        &free_interval.start,
        &free_interval.end,
        frequency_hours,
        spans_full_day,
    );
    let local_expression = compose_expression(
        &offset.to_local(free_interval.start),
        &offset.to_local(free_interval.end),
        frequency_hours,
        spans_full_day,
    );

    let rule = RecurrenceRule::parse(&utc_expression)?;
    let num_unassigned = count_unassigned(&rule, free_interval, constraints.max_runs_per_day)?;

    debug!(
        "合成调度: 运行时长={}分钟, 表达式={}, 运行次数={}, 未分配={}",
        average_runtime, utc_expression, num_runs, num_unassigned
    );

    Ok(Some(SynthesizedSchedule {
        free_interval: *free_interval,
        average_runtime,
        recurrence_expression_utc: utc_expression,
        recurrence_expression_local: local_expression,
        num_runs: num_runs as u32,
        num_unassigned,
        overlap: BTreeMap::new(),
    }))
}

/// 对每个空闲区间和每个候选运行时长执行一次合成
pub fn synthesize_sweep(
    free_intervals: &[Interval],
    constraints: &SynthesisConstraints,
    runtimes: RangeInclusive<i64>,
    offset: TimezoneOffset,
) -> PlannerResult<Vec<SynthesizedSchedule>> {
    constraints.validate()?;
    if runtimes.is_empty() {
        return Err(PlannerError::invalid_constraints(format!(
            "候选运行时长范围为空: {}..={}",
            runtimes.start(),
            runtimes.end()
        )));
    }
    for runtime in runtimes.clone() {
        constraints.ensure_positive_spacing(runtime)?;
    }

    let mut schedules = Vec::new();
    for interval in free_intervals {
        for runtime in runtimes.clone() {
            if let Some(schedule) = synthesize(interval, constraints, runtime, offset)? {
                schedules.push(schedule);
            }
        }
    }

    info!(
        "为 {} 个空闲区间生成 {} 条候选调度",
        free_intervals.len(),
        schedules.len()
    );
    Ok(schedules)
}

fn compose_expression<T: Timelike>(
    start: &T,
    end: &T,
    frequency_hours: i64,
    spans_full_day: bool,
) -> String {
    let (start_hour, end_hour) = (start.hour(), end.hour());
    let hour_field = if frequency_hours == 0 {
        start_hour.to_string()
    } else if start_hour > end_hour || (start_hour == end_hour && spans_full_day) {
        format!("{start_hour}-23/{frequency_hours},0-{end_hour}/{frequency_hours}")
    } else {
        format!("{start_hour}-{end_hour}/{frequency_hours}")
    };
    format!("{} {} * * *", start.minute(), hour_field)
}

/// 从区间起点（含）枚举 `max_runs` 次，统计落在区间结束之后的次数
fn count_unassigned(rule: &RecurrenceRule, interval: &Interval, max_runs: u32) -> PlannerResult<u32> {
    let mut cursor = rule.cursor_inclusive(interval.start);
    let mut unassigned = 0;
    for _ in 0..max_runs {
        let (next_cursor, occurrence) = cursor.advance()?;
        if occurrence > interval.end {
            unassigned += 1;
        }
        cursor = next_cursor;
    }
    Ok(unassigned)
}
