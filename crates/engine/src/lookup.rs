use serde::Serialize;
use tracing::{info, warn};

use crate::cron_utils::RecurrenceRule;
use crate::window::in_window;
use cronslot_domain::{
    JobCatalog, JobOccurrences, RejectedJob, TimeRange, TimeWindowSpec, TimezoneOffset,
};
use cronslot_errors::PlannerResult;

/// 查询结果中时间戳的格式（本地时间）
pub const OCCURRENCE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Default, Serialize)]
pub struct LookupReport {
    pub rows: Vec<JobOccurrences>,
    pub rejected_jobs: Vec<RejectedJob>,
    /// 匹配次数达到上限、结果被截断的任务
    pub truncated_jobs: Vec<String>,
}

/// 列出每个任务在日期范围内、本地小时落在窗口内的执行时间
///
/// 没有匹配时间的任务不出现在结果中；每个任务最多保留 `cap` 个匹配时间。
pub fn lookup_occurrences(
    catalog: &JobCatalog,
    range: &TimeRange,
    window: &TimeWindowSpec,
    offset: TimezoneOffset,
    cap: usize,
) -> PlannerResult<LookupReport> {
    let mut report = LookupReport::default();
    if window.is_empty() {
        warn!("时间窗口 {} 为空，不会匹配任何执行时间", window);
    }

    for job in catalog.jobs() {
        let rule = match RecurrenceRule::parse(&job.schedule) {
            Ok(rule) => rule,
            Err(e) if e.is_job_scoped() => {
                warn!("跳过任务 {}: {}", job.name, e);
                report.rejected_jobs.push(RejectedJob::new(&job.name, e));
                continue;
            }
            Err(e) => return Err(e),
        };
        if window.is_empty() {
            continue;
        }

        let mut occurrences: Vec<String> = rule
            .occurrences(range.start, range.end)
            .filter(|instant| in_window(*instant, window, offset))
            .take(cap.saturating_add(1))
            .map(|instant| offset.to_local(instant).format(OCCURRENCE_FORMAT).to_string())
            .collect();

        if occurrences.len() > cap {
            occurrences.truncate(cap);
            warn!("任务 {} 的匹配次数达到上限 {}，后续时间被截断", job.name, cap);
            report.truncated_jobs.push(job.name.clone());
        }
        if !occurrences.is_empty() {
            report.rows.push(JobOccurrences {
                job_name: job.name.clone(),
                occurrences,
            });
        }
    }

    if report.rows.is_empty() {
        warn!("时间窗口 {} 内没有找到任何执行时间", window);
    } else {
        info!("时间窗口 {} 内共有 {} 个任务执行", window, report.rows.len());
    }
    Ok(report)
}
