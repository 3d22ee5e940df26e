use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::category::assign_category;
use crate::entities::{Job, RejectedJob, UNPROTECTED_PRIORITY};
use crate::runtime::parse_runtime;

/// 任务目录中的一行原始记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    #[serde(alias = "func_name", alias = "dag_id")]
    pub job_name: String,
    pub schedule: String,
    pub avg_runtime: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
}

/// 任务目录文件的结构
///
/// `functions` 与 `dags` 来自两类不同的任务来源，与 `jobs` 一起按
/// functions -> dags -> jobs 的顺序合并；`priorities` 按任务名覆盖优先级。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub functions: Vec<JobRecord>,
    #[serde(default)]
    pub dags: Vec<JobRecord>,
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
    #[serde(default)]
    pub priorities: BTreeMap<String, u8>,
}

/// 不可变的任务目录，按输入顺序保存
#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    jobs: Vec<Job>,
    rejected: Vec<RejectedJob>,
}

impl JobCatalog {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            rejected: Vec::new(),
        }
    }

    /// 从原始文档构建目录，运行时长无法解析的记录被跳过并记录原因
    pub fn from_document(document: CatalogDocument) -> Self {
        let CatalogDocument {
            functions,
            dags,
            jobs,
            priorities,
        } = document;

        let mut catalog = Self::default();
        for record in functions.into_iter().chain(dags).chain(jobs) {
            let average_runtime = match parse_runtime(&record.avg_runtime) {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("跳过任务 {}: {}", record.job_name, e);
                    catalog.rejected.push(RejectedJob::new(record.job_name, e));
                    continue;
                }
            };

            let category = record
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| assign_category(&record.job_name).to_string());
            let priority = priorities
                .get(&record.job_name)
                .copied()
                .or(record.priority)
                .unwrap_or(UNPROTECTED_PRIORITY);

            catalog.jobs.push(Job {
                name: record.job_name,
                category,
                schedule: record.schedule,
                average_runtime,
                priority,
            });
        }

        debug!(
            "任务目录构建完成: {} 个任务, {} 个被跳过",
            catalog.jobs.len(),
            catalog.rejected.len()
        );
        catalog
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn rejected(&self) -> &[RejectedJob] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }

    pub fn protected_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|job| job.is_protected())
    }
}
