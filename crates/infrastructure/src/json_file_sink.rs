use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use cronslot_domain::{JobOccurrences, ScheduleSink, SynthesizedSchedule, TimeWindowSpec};
use cronslot_errors::{PlannerError, PlannerResult};

pub const SCHEDULES_FILE_NAME: &str = "schedules.json";

/// 查询结果文件名，例如 `jobs_between_3and5.json`
pub fn lookup_file_name(window: &TimeWindowSpec) -> String {
    format!(
        "jobs_between_{}and{}.json",
        window.start_hour(),
        window.end_hour()
    )
}

/// 候选任务比对结果文件名，例如 `fit_new_job.json`，名称中的路径字符替换为 `_`
pub fn fit_file_name(candidate: &str) -> String {
    let name: String = candidate
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("fit_{name}.json")
}

/// 规划结果的输出行，空闲区间展开为两列
#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    free_interval_start: DateTime<Utc>,
    free_interval_end: DateTime<Utc>,
    average_runtime: i64,
    crontab_schedule_utc: &'a str,
    crontab_schedule_local: &'a str,
    num_runs: u32,
    num_unassigned: u32,
    overlap: &'a BTreeMap<String, u32>,
}

impl<'a> From<&'a SynthesizedSchedule> for ScheduleRow<'a> {
    fn from(schedule: &'a SynthesizedSchedule) -> Self {
        Self {
            free_interval_start: schedule.free_interval.start,
            free_interval_end: schedule.free_interval.end,
            average_runtime: schedule.average_runtime,
            crontab_schedule_utc: &schedule.recurrence_expression_utc,
            crontab_schedule_local: &schedule.recurrence_expression_local,
            num_runs: schedule.num_runs,
            num_unassigned: schedule.num_unassigned,
            overlap: &schedule.overlap,
        }
    }
}

/// 把结果写成 JSON 文件
///
/// 先写入同目录下的临时文件，成功后再原子替换目标文件，失败时不会留下半个文件。
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn schedules_path(&self) -> PathBuf {
        self.output_dir.join(SCHEDULES_FILE_NAME)
    }

    pub fn lookup_path(&self, window: &TimeWindowSpec) -> PathBuf {
        self.output_dir.join(lookup_file_name(window))
    }

    pub fn fit_path(&self, candidate: &str) -> PathBuf {
        self.output_dir.join(fit_file_name(candidate))
    }

    fn write_json<T: Serialize + ?Sized>(&self, target: &Path, value: &T) -> PlannerResult<()> {
        fs::create_dir_all(&self.output_dir)?;
        let mut file = NamedTempFile::new_in(&self.output_dir)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.persist(target).map_err(|e| PlannerError::Io(e.error))?;
        Ok(())
    }
}

impl ScheduleSink for JsonFileSink {
    fn write_schedules(&self, schedules: &[SynthesizedSchedule]) -> PlannerResult<()> {
        let rows: Vec<ScheduleRow<'_>> = schedules.iter().map(ScheduleRow::from).collect();
        let target = self.schedules_path();
        self.write_json(&target, &rows)?;
        info!("写入 {} 条候选调度到 {}", rows.len(), target.display());
        Ok(())
    }

    fn write_lookup(&self, rows: &[JobOccurrences], window: &TimeWindowSpec) -> PlannerResult<()> {
        let target = self.lookup_path(window);
        self.write_json(&target, rows)?;
        info!("写入 {} 个任务的执行时间到 {}", rows.len(), target.display());
        Ok(())
    }

    fn write_fit(&self, candidate: &str, rows: &[JobOccurrences]) -> PlannerResult<()> {
        let target = self.fit_path(candidate);
        self.write_json(&target, rows)?;
        info!("写入候选任务 {} 的比对结果到 {}", candidate, target.display());
        Ok(())
    }
}
