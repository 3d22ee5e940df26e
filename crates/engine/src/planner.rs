use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{info, warn};

use crate::conflicts::{check_overlaps, non_overlapping_times, FitReport};
use crate::free_intervals::{compute_free_intervals, next_occurrences, occurrences_within};
use crate::lookup::{lookup_occurrences, LookupReport};
use crate::synthesizer::{synthesize_sweep, SynthesisConstraints};
use cronslot_domain::{
    Interval, Job, JobCatalog, RejectedJob, SynthesizedSchedule, TimeRange, TimeWindowSpec,
    TimezoneOffset,
};
use cronslot_errors::PlannerResult;

/// 一次规划所需的全部参数
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub range: TimeRange,
    pub constraints: SynthesisConstraints,
    /// 候选平均运行时长（分钟）
    pub runtimes: RangeInclusive<i64>,
    pub offset: TimezoneOffset,
    pub require_same_category: bool,
    /// 为 true 时展开范围内的全部执行时间，否则每个任务只取下一次
    pub expand_occurrences: bool,
    pub occurrence_cap: usize,
}

#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub range: TimeRange,
    pub window: TimeWindowSpec,
    pub offset: TimezoneOffset,
    pub occurrence_cap: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub free_intervals: Vec<Interval>,
    pub schedules: Vec<SynthesizedSchedule>,
    pub rejected_jobs: Vec<RejectedJob>,
}

/// 在只读任务目录上执行枚举、空闲区间计算、调度合成与冲突检查
pub struct Planner<'c> {
    catalog: &'c JobCatalog,
}

impl<'c> Planner<'c> {
    pub fn new(catalog: &'c JobCatalog) -> Self {
        Self { catalog }
    }

    pub fn plan(&self, request: &PlanRequest) -> PlannerResult<PlanReport> {
        // 约束在枚举前校验，零间隔属于配置错误
        request.constraints.validate()?;
        for runtime in request.runtimes.clone() {
            request.constraints.ensure_positive_spacing(runtime)?;
        }

        info!(
            "开始规划: 范围 {} ~ {}, 任务数 {}",
            request.range.start.format("%Y-%m-%d %H:%M"),
            request.range.end.format("%Y-%m-%d %H:%M"),
            self.catalog.len()
        );

        let ordered = if request.expand_occurrences {
            occurrences_within(self.catalog, &request.range, request.occurrence_cap)?
        } else {
            next_occurrences(self.catalog, request.range.start)?
        };

        let free_intervals = compute_free_intervals(
            &ordered.scheduled,
            &request.range,
            request.require_same_category,
        );

        let schedules = synthesize_sweep(
            &free_intervals,
            &request.constraints,
            request.runtimes.clone(),
            request.offset,
        )?;
        if schedules.is_empty() {
            warn!("没有可行的调度方案");
        }
        let schedules = check_overlaps(schedules, self.catalog, request.range.start);

        let mut rejected_jobs = self.catalog.rejected().to_vec();
        rejected_jobs.extend(ordered.rejected);

        info!(
            "规划完成: {} 个空闲区间, {} 条候选调度, {} 个任务被跳过",
            free_intervals.len(),
            schedules.len(),
            rejected_jobs.len()
        );
        Ok(PlanReport {
            free_intervals,
            schedules,
            rejected_jobs,
        })
    }

    pub fn lookup(&self, request: &LookupRequest) -> PlannerResult<LookupReport> {
        let mut report = lookup_occurrences(
            self.catalog,
            &request.range,
            &request.window,
            request.offset,
            request.occurrence_cap,
        )?;
        let mut rejected_jobs = self.catalog.rejected().to_vec();
        rejected_jobs.append(&mut report.rejected_jobs);
        report.rejected_jobs = rejected_jobs;
        Ok(report)
    }

    /// 候选任务相对目录中其他任务的可用运行时间
    pub fn fit(&self, candidate: &Job, range: &TimeRange) -> PlannerResult<FitReport> {
        let mut report = non_overlapping_times(candidate, self.catalog, range)?;
        let mut rejected_jobs = self.catalog.rejected().to_vec();
        rejected_jobs.append(&mut report.rejected_jobs);
        report.rejected_jobs = rejected_jobs;
        Ok(report)
    }
}
