use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use cronslot_domain::{CatalogDocument, JobCatalog, JobSource};
use cronslot_errors::{PlannerError, PlannerResult};

/// 任务目录文件格式，按扩展名判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Toml,
    Json,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> PlannerResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(CatalogFormat::Toml),
            Some("json") => Ok(CatalogFormat::Json),
            _ => Err(PlannerError::catalog_error(format!(
                "不支持的任务目录格式: {}，仅支持 .toml 与 .json",
                path.display()
            ))),
        }
    }
}

/// 从本地 TOML/JSON 文件读取任务目录
#[derive(Debug, Clone)]
pub struct FileJobSource {
    path: PathBuf,
}

impl FileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> PlannerResult<CatalogDocument> {
        let format = CatalogFormat::from_path(&self.path)?;
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PlannerError::catalog_error(format!("无法读取任务目录 {}: {}", self.path.display(), e))
        })?;
        debug!("读取任务目录 {} ({} 字节)", self.path.display(), content.len());

        let parsed: Result<CatalogDocument, String> = match format {
            CatalogFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
            CatalogFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| {
            PlannerError::catalog_error(format!("{}: {}", self.path.display(), message))
        })
    }
}

impl JobSource for FileJobSource {
    fn load_catalog(&self) -> PlannerResult<JobCatalog> {
        let catalog = JobCatalog::from_document(self.read_document()?);
        info!(
            "从 {} 加载了 {} 个任务，跳过 {} 个",
            self.path.display(),
            catalog.len(),
            catalog.rejected().len()
        );
        Ok(catalog)
    }
}
