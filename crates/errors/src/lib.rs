use thiserror::Error;


#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("无效的CRON表达式: {expr} - {message}")]
    InvalidRule { expr: String, message: String },
    #[error("无效的时区偏移: {0}，格式应为 ±H:MM")]
    InvalidTimezoneOffset(String),
    #[error("无效的时间窗口: {0}")]
    InvalidTimeWindow(String),
    #[error("无效的日期范围: {0}")]
    InvalidDateRange(String),
    #[error("无效的运行时长: {0}")]
    InvalidRuntime(String),
    #[error("无效的调度约束: {0}")]
    InvalidConstraints(String),
    #[error("任务目录错误: {0}")]
    Catalog(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    pub fn invalid_rule<E: Into<String>, M: Into<String>>(expr: E, message: M) -> Self {
        Self::InvalidRule {
            expr: expr.into(),
            message: message.into(),
        }
    }
    pub fn invalid_offset<S: Into<String>>(raw: S) -> Self {
        Self::InvalidTimezoneOffset(raw.into())
    }
    pub fn invalid_window<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTimeWindow(msg.into())
    }
    pub fn invalid_date_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDateRange(msg.into())
    }
    pub fn invalid_runtime<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRuntime(msg.into())
    }
    pub fn invalid_constraints<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConstraints(msg.into())
    }
    pub fn catalog_error<S: Into<String>>(msg: S) -> Self {
        Self::Catalog(msg.into())
    }
    /// 仅影响单个任务的错误，批处理可以跳过该任务继续执行
    pub fn is_job_scoped(&self) -> bool {
        matches!(
            self,
            PlannerError::InvalidRule { .. } | PlannerError::InvalidRuntime(_)
        )
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PlannerError {
    fn from(err: toml::de::Error) -> Self {
        PlannerError::Catalog(err.to_string())
    }
}
