use crate::entities::{JobOccurrences, SynthesizedSchedule};
use crate::value_objects::TimeWindowSpec;
use cronslot_errors::PlannerResult;

/// 结果输出端，写入要么整体成功要么不留下部分结果
pub trait ScheduleSink {
    fn write_schedules(&self, schedules: &[SynthesizedSchedule]) -> PlannerResult<()>;
    fn write_lookup(&self, rows: &[JobOccurrences], window: &TimeWindowSpec) -> PlannerResult<()>;
    /// 候选任务相对每个目录任务的可用运行时间
    fn write_fit(&self, candidate: &str, rows: &[JobOccurrences]) -> PlannerResult<()>;
}
