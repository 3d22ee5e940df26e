use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cron_utils::RecurrenceRule;
use cronslot_domain::{Interval, JobCatalog, RejectedJob, ScheduledJob, TimeRange};
use cronslot_errors::{PlannerError, PlannerResult};

/// 按执行时刻升序排列的任务序列，以及规则无效而被跳过的任务
#[derive(Debug, Clone, Default)]
pub struct OrderedJobs<'a> {
    pub scheduled: Vec<ScheduledJob<'a>>,
    pub rejected: Vec<RejectedJob>,
}

impl<'a> OrderedJobs<'a> {
    /// 仅影响单个任务的错误记为跳过，其余错误中止整个批处理
    fn reject(&mut self, job_name: &str, error: PlannerError) -> PlannerResult<()> {
        if !error.is_job_scoped() {
            return Err(error);
        }
        warn!("跳过任务 {}: {}", job_name, error);
        self.rejected.push(RejectedJob::new(job_name, error));
        Ok(())
    }

    fn sort(mut self) -> Self {
        // 稳定排序，相同时刻保持目录顺序
        self.scheduled.sort_by_key(|scheduled| scheduled.occurrence);
        self
    }
}

/// 计算每个任务在 `anchor` 之后的下一次执行时间并排序
pub fn next_occurrences(
    catalog: &JobCatalog,
    anchor: DateTime<Utc>,
) -> PlannerResult<OrderedJobs<'_>> {
    let mut ordered = OrderedJobs::default();
    for job in catalog.jobs() {
        match RecurrenceRule::parse(&job.schedule).and_then(|rule| rule.next_occurrence(anchor)) {
            Ok(occurrence) => ordered.scheduled.push(ScheduledJob::new(job, occurrence)),
            Err(e) => ordered.reject(&job.name, e)?,
        }
    }
    Ok(ordered.sort())
}

/// 展开范围内的全部执行时间并排序，每个任务最多取 `cap` 次
pub fn occurrences_within<'a>(
    catalog: &'a JobCatalog,
    range: &TimeRange,
    cap: usize,
) -> PlannerResult<OrderedJobs<'a>> {
    let mut ordered = OrderedJobs::default();
    for job in catalog.jobs() {
        let rule = match RecurrenceRule::parse(&job.schedule) {
            Ok(rule) => rule,
            Err(e) => {
                ordered.reject(&job.name, e)?;
                continue;
            }
        };

        let before = ordered.scheduled.len();
        ordered.scheduled.extend(
            rule.occurrences(range.start, range.end)
                .take(cap)
                .map(|occurrence| ScheduledJob::new(job, occurrence)),
        );
        if ordered.scheduled.len() - before == cap {
            warn!("任务 {} 的执行次数达到上限 {}，后续时间被截断", job.name, cap);
        }
    }
    Ok(ordered.sort())
}

/// 计算相邻任务之间的空闲区间
///
/// 第 `i` 个区间从前一个任务结束（`i == 0` 时为 `bounds.start`）开始，到第 `i`
/// 个任务开始为止。只保留时长为正且起点在范围内的区间；
/// `require_same_category` 时还要求两侧任务分类相同，首个区间不做分类检查。
pub fn compute_free_intervals(
    ordered: &[ScheduledJob<'_>],
    bounds: &TimeRange,
    require_same_category: bool,
) -> Vec<Interval> {
    let mut intervals = Vec::new();
    for (index, current) in ordered.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &ordered[i]);
        let start = previous.map_or(bounds.start, |p| p.finished_at());
        let end = current.occurrence;

        if end <= start || !bounds.contains(start) {
            continue;
        }
        if require_same_category {
            if let Some(previous) = previous {
                if previous.job.category != current.job.category {
                    continue;
                }
            }
        }
        intervals.push(Interval { start, end });
    }

    if intervals.is_empty() {
        warn!("未找到空闲区间");
    } else {
        debug!("找到 {} 个空闲区间", intervals.len());
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use cronslot_domain::Job;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn job(name: &str, category: &str, schedule: &str, minutes: i64) -> Job {
        Job::new(name, category, schedule, Duration::minutes(minutes))
    }

    #[test]
    fn test_next_occurrences_sorted_with_stable_ties() {
        let catalog = JobCatalog::new(vec![
            job("late", "a", "0 9 * * *", 10),
            job("tie_first", "a", "0 3 * * *", 10),
            job("tie_second", "a", "0 3 * * *", 10),
            job("broken", "a", "0 0 31 2 *", 10),
        ]);
        let ordered = next_occurrences(&catalog, at(0, 0)).unwrap();
        let names: Vec<&str> = ordered.scheduled.iter().map(|s| s.job.name.as_str()).collect();
        assert_eq!(names, ["tie_first", "tie_second", "late"]);
        assert_eq!(ordered.rejected.len(), 1);
        assert_eq!(ordered.rejected[0].job_name, "broken");
    }

    #[test]
    fn test_occurrences_within_respects_cap() {
        let catalog = JobCatalog::new(vec![job("every_hour", "a", "0 * * * *", 5)]);
        let range = TimeRange::try_new(at(0, 0), at(23, 59)).unwrap();
        let ordered = occurrences_within(&catalog, &range, 5).unwrap();
        assert_eq!(ordered.scheduled.len(), 5);
        assert_eq!(ordered.scheduled[0].occurrence, at(1, 0));
    }

    #[test]
    fn test_first_interval_starts_at_bounds() {
        let a = job("a", "x", "0 2 * * *", 30);
        let ordered = vec![ScheduledJob::new(&a, at(2, 0))];
        let bounds = TimeRange::try_new(at(0, 0), at(12, 0)).unwrap();
        let intervals = compute_free_intervals(&ordered, &bounds, true);
        assert_eq!(intervals, vec![Interval { start: at(0, 0), end: at(2, 0) }]);
    }

    #[test]
    fn test_overlapping_jobs_produce_no_gap() {
        let a = job("a", "x", "0 2 * * *", 90);
        let b = job("b", "x", "0 3 * * *", 30);
        let ordered = vec![ScheduledJob::new(&a, at(2, 0)), ScheduledJob::new(&b, at(3, 0))];
        let bounds = TimeRange::try_new(at(2, 0), at(12, 0)).unwrap();
        assert!(compute_free_intervals(&ordered, &bounds, false).is_empty());
    }

    #[test]
    fn test_category_change_drops_interval() {
        let a = job("a", "bus", "0 1 * * *", 30);
        let b = job("b", "train", "0 3 * * *", 30);
        let c = job("c", "train", "0 6 * * *", 30);
        let ordered = vec![
            ScheduledJob::new(&a, at(1, 0)),
            ScheduledJob::new(&b, at(3, 0)),
            ScheduledJob::new(&c, at(6, 0)),
        ];
        let bounds = TimeRange::try_new(at(1, 0), at(12, 0)).unwrap();

        let all = compute_free_intervals(&ordered, &bounds, false);
        assert_eq!(
            all,
            vec![
                Interval { start: at(1, 30), end: at(3, 0) },
                Interval { start: at(3, 30), end: at(6, 0) },
            ]
        );

        let same_category = compute_free_intervals(&ordered, &bounds, true);
        assert_eq!(same_category, vec![Interval { start: at(3, 30), end: at(6, 0) }]);
    }

    #[test]
    fn test_interval_starting_outside_bounds_is_dropped() {
        let a = job("a", "x", "0 10 * * *", 30);
        let b = job("b", "x", "0 13 * * *", 30);
        let ordered = vec![ScheduledJob::new(&a, at(10, 0)), ScheduledJob::new(&b, at(13, 0))];
        let bounds = TimeRange::try_new(at(0, 0), at(10, 0)).unwrap();
        let intervals = compute_free_intervals(&ordered, &bounds, false);
        assert_eq!(intervals, vec![Interval { start: at(0, 0), end: at(10, 0) }]);
    }
}
