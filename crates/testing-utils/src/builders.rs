//! Test data builders for creating test entities

use chrono::Duration;

use cronslot_domain::{Job, JobCatalog, UNPROTECTED_PRIORITY};

/// Builder for creating test Job entities
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new() -> Self {
        Self {
            job: Job {
                name: "test_job".to_string(),
                category: "other".to_string(),
                schedule: "0 0 * * *".to_string(),
                average_runtime: Duration::minutes(30),
                priority: UNPROTECTED_PRIORITY,
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.job.name = name.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.job.category = category.to_string();
        self
    }

    pub fn with_schedule(mut self, schedule: &str) -> Self {
        self.job.schedule = schedule.to_string();
        self
    }

    pub fn with_runtime_minutes(mut self, minutes: i64) -> Self {
        self.job.average_runtime = Duration::minutes(minutes);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.job.priority = priority;
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test catalogs
#[derive(Default)]
pub struct CatalogBuilder {
    jobs: Vec<Job>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// 快捷方式：名称、调度、运行分钟数
    pub fn with(self, name: &str, schedule: &str, runtime_minutes: i64) -> Self {
        self.with_job(
            JobBuilder::new()
                .with_name(name)
                .with_schedule(schedule)
                .with_runtime_minutes(runtime_minutes)
                .build(),
        )
    }

    pub fn build(self) -> JobCatalog {
        JobCatalog::new(self.jobs)
    }
}
