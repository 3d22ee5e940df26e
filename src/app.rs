use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use cronslot_config::AppConfig;
use cronslot_domain::{Job, JobSource, ScheduleSink};
use cronslot_engine::{
    FitReport, LookupReport, LookupRequest, PlanReport, PlanRequest, Planner,
    SynthesisConstraints,
};
use cronslot_infrastructure::{FileJobSource, JsonFileSink};

/// 主应用程序，把配置、任务来源、规划引擎与结果输出端连接起来
pub struct Application {
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn file_source(&self) -> FileJobSource {
        FileJobSource::new(&self.config.io.catalog_path)
    }

    pub fn file_sink(&self) -> JsonFileSink {
        JsonFileSink::new(&self.config.io.output_dir)
    }

    /// `now` 用于解析 `now` 与 `+Nd` 形式的范围
    pub fn plan_request(&self, now: DateTime<Utc>) -> Result<PlanRequest> {
        let planner = &self.config.planner;
        Ok(PlanRequest {
            range: self
                .config
                .range
                .to_time_range(now)
                .context("解析日期范围失败")?,
            constraints: SynthesisConstraints::new(planner.max_runs_per_day, planner.min_hours_gap)
                .context("调度约束无效")?,
            runtimes: planner.runtimes(),
            offset: self.config.range.offset().context("解析时区偏移失败")?,
            require_same_category: planner.require_same_category,
            expand_occurrences: planner.expand_occurrences,
            occurrence_cap: planner.occurrence_cap,
        })
    }

    pub fn lookup_request(&self, now: DateTime<Utc>) -> Result<LookupRequest> {
        Ok(LookupRequest {
            range: self
                .config
                .range
                .to_time_range(now)
                .context("解析日期范围失败")?,
            window: self.config.window.to_window().context("时间窗口无效")?,
            offset: self.config.range.offset().context("解析时区偏移失败")?,
            occurrence_cap: self.config.planner.occurrence_cap,
        })
    }

    pub fn run_plan(
        &self,
        source: &dyn JobSource,
        sink: &dyn ScheduleSink,
        now: DateTime<Utc>,
    ) -> Result<PlanReport> {
        let request = self.plan_request(now)?;
        let catalog = source.load_catalog().context("加载任务目录失败")?;
        let report = Planner::new(&catalog).plan(&request).context("规划失败")?;

        for rejected in &report.rejected_jobs {
            warn!("任务 {} 未参与规划: {}", rejected.job_name, rejected.reason);
        }
        sink.write_schedules(&report.schedules)
            .context("写入候选调度失败")?;
        info!("规划结果已写出: {} 条候选调度", report.schedules.len());
        Ok(report)
    }

    pub fn run_lookup(
        &self,
        source: &dyn JobSource,
        sink: &dyn ScheduleSink,
        now: DateTime<Utc>,
    ) -> Result<LookupReport> {
        let request = self.lookup_request(now)?;
        let catalog = source.load_catalog().context("加载任务目录失败")?;
        let report = Planner::new(&catalog)
            .lookup(&request)
            .context("查询失败")?;

        for rejected in &report.rejected_jobs {
            warn!("任务 {} 未参与查询: {}", rejected.job_name, rejected.reason);
        }
        for job_name in &report.truncated_jobs {
            warn!("任务 {} 的查询结果被截断，可调大 occurrence_cap", job_name);
        }
        sink.write_lookup(&report.rows, &request.window)
            .context("写入查询结果失败")?;
        Ok(report)
    }

    pub fn run_fit(
        &self,
        candidate: &Job,
        source: &dyn JobSource,
        sink: &dyn ScheduleSink,
        now: DateTime<Utc>,
    ) -> Result<FitReport> {
        let range = self
            .config
            .range
            .to_time_range(now)
            .context("解析日期范围失败")?;
        let offset = self.config.range.offset().context("解析时区偏移失败")?;
        let catalog = source.load_catalog().context("加载任务目录失败")?;
        let report = Planner::new(&catalog)
            .fit(candidate, &range)
            .with_context(|| format!("候选任务 {} 比对失败", candidate.name))?;

        for rejected in &report.rejected_jobs {
            warn!("任务 {} 未参与比对: {}", rejected.job_name, rejected.reason);
        }
        sink.write_fit(&report.candidate, &report.rows(offset))
            .context("写入比对结果失败")?;
        Ok(report)
    }

    /// 使用配置中的文件路径执行规划
    pub fn plan(&self, now: DateTime<Utc>) -> Result<PlanReport> {
        self.run_plan(&self.file_source(), &self.file_sink(), now)
    }

    /// 使用配置中的文件路径执行查询
    pub fn lookup(&self, now: DateTime<Utc>) -> Result<LookupReport> {
        self.run_lookup(&self.file_source(), &self.file_sink(), now)
    }

    /// 使用配置中的文件路径执行候选任务比对
    pub fn fit(&self, candidate: &Job, now: DateTime<Utc>) -> Result<FitReport> {
        self.run_fit(candidate, &self.file_source(), &self.file_sink(), now)
    }
}
