use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::TimeRange;
use cronslot_errors::{PlannerError, PlannerResult};

/// 一天内的小时窗口，`start_hour > end_hour` 时跨越午夜
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindowSpec {
    start_hour: u32,
    end_hour: u32,
}

impl TimeWindowSpec {
    pub fn new(start_hour: u32, end_hour: u32) -> PlannerResult<Self> {
        if start_hour > 23 {
            return Err(PlannerError::invalid_window(format!(
                "开始小时超出范围: {start_hour}"
            )));
        }
        if end_hour > 24 {
            return Err(PlannerError::invalid_window(format!(
                "结束小时超出范围: {end_hour}"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// 全天窗口 `[0, 24)`
    pub fn all_day() -> Self {
        Self {
            start_hour: 0,
            end_hour: 24,
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start_hour > self.end_hour
    }

    pub fn is_empty(&self) -> bool {
        self.start_hour == self.end_hour
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        if self.wraps_midnight() {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            self.start_hour <= hour && hour < self.end_hour
        }
    }
}

impl FromStr for TimeWindowSpec {
    type Err = PlannerError;

    /// 解析 `start_hour end_hour` 格式，例如 `3 5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [start, end] = parts.as_slice() else {
            return Err(PlannerError::invalid_window(format!(
                "应为 `开始小时 结束小时`: {s}"
            )));
        };
        let parse_hour = |raw: &str| {
            raw.parse::<u32>()
                .map_err(|_| PlannerError::invalid_window(format!("无法解析小时: {raw}")))
        };
        Self::new(parse_hour(start)?, parse_hour(end)?)
    }
}

impl fmt::Display for TimeWindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_hour, self.end_hour)
    }
}

/// 相对UTC的分钟偏移，只用于显示和生成本地时间表达式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneOffset {
    minutes: i32,
    offset: FixedOffset,
}

impl TimezoneOffset {
    const MIN_MINUTES: i32 = -12 * 60;
    const MAX_MINUTES: i32 = 14 * 60;

    pub fn utc() -> Self {
        Self {
            minutes: 0,
            offset: Utc.fix(),
        }
    }

    pub fn from_minutes(minutes: i32) -> PlannerResult<Self> {
        if !(Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(PlannerError::invalid_offset(format!("{minutes} 分钟")));
        }
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| PlannerError::invalid_offset(format!("{minutes} 分钟")))?;
        Ok(Self { minutes, offset })
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    /// 把UTC时刻转换为该偏移下的本地时间
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }
}

impl Default for TimezoneOffset {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for TimezoneOffset {
    type Err = PlannerError;

    /// 解析 `±H:MM` 格式，例如 `+5:30`、`-08:00`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || PlannerError::invalid_offset(raw);

        let (sign, rest) = match raw.chars().next() {
            Some('+') => (1, &raw[1..]),
            Some('-') => (-1, &raw[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
            return Err(invalid());
        }

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        Self::from_minutes(sign * (hours * 60 + minutes)).map_err(|_| invalid())
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.abs();
        write!(f, "{sign}{}:{:02}", abs / 60, abs % 60)
    }
}

/// 解析范围起点：`now`、`YYYY-MM-DD` 或 `YYYY-MM-DD HH:MM`（按UTC解释）
pub fn parse_range_start(input: &str, now: DateTime<Utc>) -> PlannerResult<DateTime<Utc>> {
    let raw = input.trim();
    if raw.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    parse_absolute(raw)
}

/// 解析范围终点：绝对日期或相对起点的 `+Nd`
pub fn parse_range_end(input: &str, start: DateTime<Utc>) -> PlannerResult<DateTime<Utc>> {
    let raw = input.trim();
    if let Some(relative) = raw.strip_prefix('+') {
        let days = relative
            .strip_suffix('d')
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| PlannerError::invalid_date_range(format!("相对偏移应为 +Nd: {raw}")))?;
        return Duration::try_days(i64::from(days))
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or_else(|| PlannerError::invalid_date_range(format!("相对偏移超出可表示范围: {raw}")));
    }
    parse_absolute(raw)
}

/// 解析并校验完整的日期范围
pub fn parse_time_range(
    start_input: &str,
    end_input: &str,
    now: DateTime<Utc>,
) -> PlannerResult<TimeRange> {
    let start = parse_range_start(start_input, now)?;
    let end = parse_range_end(end_input, start)?;
    TimeRange::try_new(start, end).ok_or_else(|| {
        PlannerError::invalid_date_range(format!(
            "结束时间早于开始时间: {} < {}",
            end.format("%Y-%m-%d %H:%M"),
            start.format("%Y-%m-%d %H:%M")
        ))
    })
}

fn parse_absolute(raw: &str) -> PlannerResult<DateTime<Utc>> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(datetime.and_utc());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| PlannerError::invalid_date_range(format!("无法解析日期: {raw}")))
}
