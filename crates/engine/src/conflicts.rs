use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cron_utils::RecurrenceRule;
use crate::lookup::OCCURRENCE_FORMAT;
use cronslot_domain::{
    Interval, Job, JobCatalog, JobOccurrences, RejectedJob, ScheduledJob, SynthesizedSchedule,
    TimeRange, TimezoneOffset,
};
use cronslot_errors::PlannerResult;

/// 检查候选调度的首次运行是否落入高优先级任务的运行窗口
///
/// 每一行独立计算自己的冲突表，键为冲突任务名称。首次运行严格位于
/// `(occ, occ + runtime)` 之内才算冲突。
pub fn check_overlaps(
    schedules: Vec<SynthesizedSchedule>,
    catalog: &JobCatalog,
    anchor: DateTime<Utc>,
) -> Vec<SynthesizedSchedule> {
    let protected_windows = protected_busy_windows(catalog, anchor);
    if protected_windows.is_empty() {
        debug!("没有受保护的任务，跳过冲突检查");
        return schedules;
    }

    schedules
        .into_iter()
        .map(|schedule| {
            let overlap = overlaps_for(&schedule, &protected_windows, anchor);
            schedule.with_overlap(overlap)
        })
        .collect()
}

fn protected_busy_windows(catalog: &JobCatalog, anchor: DateTime<Utc>) -> Vec<(&str, Interval)> {
    catalog
        .protected_jobs()
        .filter_map(|job| {
            match RecurrenceRule::parse(&job.schedule).and_then(|rule| rule.next_occurrence(anchor)) {
                Ok(occurrence) => {
                    Some((job.name.as_str(), ScheduledJob::new(job, occurrence).busy_window()))
                }
                Err(e) => {
                    warn!("受保护任务 {} 无法参与冲突检查: {}", job.name, e);
                    None
                }
            }
        })
        .collect()
}

fn overlaps_for(
    schedule: &SynthesizedSchedule,
    protected_windows: &[(&str, Interval)],
    anchor: DateTime<Utc>,
) -> BTreeMap<String, u32> {
    let mut overlap = BTreeMap::new();
    let first_run = match RecurrenceRule::parse(&schedule.recurrence_expression_utc)
        .and_then(|rule| rule.next_occurrence(anchor))
    {
        Ok(first_run) => first_run,
        Err(e) => {
            warn!(
                "候选调度 {} 无法计算首次运行时间: {}",
                schedule.recurrence_expression_utc, e
            );
            return overlap;
        }
    };

    for (name, window) in protected_windows {
        if window.strictly_contains(first_run) {
            *overlap.entry((*name).to_string()).or_insert(0) += 1;
        }
    }
    if !overlap.is_empty() {
        debug!(
            "候选调度 {} 与受保护任务冲突: {:?}",
            schedule.recurrence_expression_utc, overlap
        );
    }
    overlap
}

/// 候选任务相对目录中每个任务的可用运行时间
#[derive(Debug, Clone, Default, Serialize)]
pub struct FitReport {
    pub candidate: String,
    /// 任务名称 -> 在该任务下一次执行之前能够运行完的候选运行时间
    pub runs: BTreeMap<String, Vec<DateTime<Utc>>>,
    pub rejected_jobs: Vec<RejectedJob>,
}

impl FitReport {
    /// 转换为本地时间的输出行，没有可用时间的任务保留空列表
    pub fn rows(&self, offset: TimezoneOffset) -> Vec<JobOccurrences> {
        self.runs
            .iter()
            .map(|(job_name, runs)| JobOccurrences {
                job_name: job_name.clone(),
                occurrences: runs
                    .iter()
                    .map(|run| offset.to_local(*run).format(OCCURRENCE_FORMAT).to_string())
                    .collect(),
            })
            .collect()
    }
}

/// 对目录中每个其他任务，列出候选任务在范围内、能在该任务下一次执行前运行完的时间
///
/// 从 `range.start` 起依次取候选任务的运行时间 `t`，要求 `t` 早于该任务的下一次
/// 执行和范围终点，且 `t + 运行时长` 不晚于该任务的下一次执行；第一个不满足的运行
/// 即结束。与候选任务同名的目录任务被跳过。
pub fn non_overlapping_times(
    candidate: &Job,
    catalog: &JobCatalog,
    range: &TimeRange,
) -> PlannerResult<FitReport> {
    let candidate_rule = RecurrenceRule::parse(&candidate.schedule)?;
    let mut report = FitReport {
        candidate: candidate.name.clone(),
        ..FitReport::default()
    };

    for job in catalog.jobs().iter().filter(|job| job.name != candidate.name) {
        let next_run = match RecurrenceRule::parse(&job.schedule)
            .and_then(|rule| rule.next_occurrence(range.start))
        {
            Ok(next_run) => next_run,
            Err(e) => {
                warn!("跳过任务 {}: {}", job.name, e);
                report.rejected_jobs.push(RejectedJob::new(&job.name, e));
                continue;
            }
        };

        let runs: Vec<DateTime<Utc>> = candidate_rule
            .occurrences(range.start, range.end)
            .take_while(|run| *run < next_run && *run < range.end)
            .take_while(|run| {
                run.checked_add_signed(candidate.average_runtime)
                    .is_some_and(|finished| finished <= next_run)
            })
            .collect();
        debug!(
            "候选任务 {} 在任务 {} 之前有 {} 个可用运行时间",
            candidate.name,
            job.name,
            runs.len()
        );
        report.runs.insert(job.name.clone(), runs);
    }

    info!(
        "候选任务 {} 与 {} 个任务完成比对",
        candidate.name,
        report.runs.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use cronslot_domain::Job;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn candidate(expression: &str) -> SynthesizedSchedule {
        SynthesizedSchedule {
            free_interval: Interval::try_new(at(0, 0), at(12, 0)).unwrap(),
            average_runtime: 10,
            recurrence_expression_utc: expression.to_string(),
            recurrence_expression_local: expression.to_string(),
            num_runs: 1,
            num_unassigned: 0,
            overlap: BTreeMap::new(),
        }
    }

    #[test]
    fn test_unprotected_jobs_are_ignored() {
        let catalog = JobCatalog::new(vec![Job::new(
            "report",
            "other",
            "0 9 * * *",
            Duration::minutes(60),
        )]);
        let checked = check_overlaps(vec![candidate("30 9 * * *")], &catalog, at(0, 0));
        assert!(checked[0].overlap.is_empty());
    }

    #[test]
    fn test_window_boundaries_do_not_conflict() {
        let catalog = JobCatalog::new(vec![Job::new(
            "payment_sync",
            "payment",
            "0 9 * * *",
            Duration::minutes(60),
        )
        .with_priority(1)]);
        let checked = check_overlaps(
            vec![candidate("0 9 * * *"), candidate("0 10 * * *")],
            &catalog,
            at(0, 0),
        );
        assert!(checked.iter().all(|s| s.overlap.is_empty()));
    }
}
