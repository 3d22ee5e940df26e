use chrono::{DateTime, TimeZone, Utc};

use cronslot_domain::{Interval, TimeRange};

/// 构造UTC时间，参数非法时直接panic，仅供测试使用
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_else(|| panic!("非法的测试时间: {year}-{month}-{day} {hour}:{minute}"))
}

/// 2024-01-01 当天的时刻
pub fn jan1(hour: u32, minute: u32) -> DateTime<Utc> {
    utc(2024, 1, 1, hour, minute)
}

pub fn interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Interval {
    Interval::try_new(start, end).unwrap_or_else(|| panic!("区间结束早于开始: {start} > {end}"))
}

pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeRange {
    interval(start, end)
}
