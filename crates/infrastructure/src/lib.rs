//! 任务目录与结果文件的本地文件适配器

pub mod file_job_source;
pub mod json_file_sink;

pub use file_job_source::{CatalogFormat, FileJobSource};
pub use json_file_sink::{fit_file_name, lookup_file_name, JsonFileSink, SCHEDULES_FILE_NAME};
