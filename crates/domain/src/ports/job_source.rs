use crate::catalog::JobCatalog;
use cronslot_errors::PlannerResult;

/// 任务目录来源
///
/// 缺少必需列等格式错误应当返回 `PlannerError::Catalog`，批处理随之中止。
pub trait JobSource {
    fn load_catalog(&self) -> PlannerResult<JobCatalog>;
}
