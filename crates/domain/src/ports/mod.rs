pub mod job_source;
pub mod schedule_sink;

pub use job_source::JobSource;
pub use schedule_sink::ScheduleSink;
