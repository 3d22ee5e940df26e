use chrono::{DateTime, Timelike, Utc};

use cronslot_domain::{TimeWindowSpec, TimezoneOffset};

/// 判断某个执行时刻换算为本地时间后是否落在小时窗口内
///
/// 每个时刻只判断一次：不跨午夜时为 `start <= hour < end`，
/// 跨午夜时为 `hour >= start || hour < end`。
pub fn in_window(instant: DateTime<Utc>, window: &TimeWindowSpec, offset: TimezoneOffset) -> bool {
    window.contains_hour(offset.to_local(instant).hour())
}
