//! 定时任务空闲时段分析引擎
//!
//! 从任务目录枚举执行时刻，计算任务之间的空闲区间，为新任务在空闲区间内
//! 合成 cron 表达式，并检查与高优先级任务的冲突。

pub mod conflicts;
pub mod cron_utils;
pub mod free_intervals;
pub mod lookup;
pub mod planner;
pub mod synthesizer;
pub mod window;

pub use conflicts::{check_overlaps, non_overlapping_times, FitReport};
pub use cron_utils::{OccurrenceCursor, Occurrences, RecurrenceRule};
pub use free_intervals::{compute_free_intervals, next_occurrences, occurrences_within, OrderedJobs};
pub use lookup::{lookup_occurrences, LookupReport, OCCURRENCE_FORMAT};
pub use planner::{LookupRequest, PlanReport, PlanRequest, Planner};
pub use synthesizer::{synthesize, synthesize_sweep, SynthesisConstraints};
pub use window::in_window;
