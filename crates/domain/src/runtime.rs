use chrono::Duration;

use cronslot_errors::{PlannerError, PlannerResult};

/// 平均运行时长上限，超过一年的运行时长视为数据错误
pub const MAX_RUNTIME_DAYS: i64 = 366;

/// 解析平均运行时长字符串
///
/// 支持 `数值 单位` 成对出现的写法，例如 `1 hours 30 mins`、`2 days 45 secs`，
/// 以及 `HH:MM:SS` 时钟写法（例如 `1 day 02:30:00`）。各部分累加。
/// `years`、`mons` 不是固定长度，无法换算为时长，直接拒绝。
pub fn parse_runtime(input: &str) -> PlannerResult<Duration> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(PlannerError::invalid_runtime("运行时长为空"));
    }
    let too_long = || PlannerError::invalid_runtime(format!("运行时长超出上限: {input}"));

    let mut total = Duration::zero();
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        let component = if token.contains(':') {
            index += 1;
            parse_clock(token)?
        } else {
            let unit = tokens.get(index + 1).ok_or_else(|| {
                PlannerError::invalid_runtime(format!("数值缺少单位: {input}"))
            })?;
            index += 2;
            parse_component(token, unit)?
        };
        total = total.checked_add(&component).ok_or_else(too_long)?;
    }

    if total < Duration::zero() {
        return Err(PlannerError::invalid_runtime(format!("运行时长不能为负: {input}")));
    }
    if total > Duration::days(MAX_RUNTIME_DAYS) {
        return Err(too_long());
    }
    Ok(total)
}

fn parse_component(value: &str, unit: &str) -> PlannerResult<Duration> {
    let invalid_number = || PlannerError::invalid_runtime(format!("无法解析数值: {value}"));
    let out_of_range = || PlannerError::invalid_runtime(format!("数值超出范围: {value} {unit}"));
    let whole = || value.parse::<i64>().map_err(|_| invalid_number());

    match unit.to_lowercase().as_str() {
        "day" | "days" => Duration::try_days(whole()?).ok_or_else(out_of_range),
        "hour" | "hours" => Duration::try_hours(whole()?).ok_or_else(out_of_range),
        "min" | "mins" | "minute" | "minutes" => {
            Duration::try_minutes(whole()?).ok_or_else(out_of_range)
        }
        "sec" | "secs" | "second" | "seconds" => {
            let seconds: f64 = value.parse().map_err(|_| invalid_number())?;
            fractional_seconds(seconds).ok_or_else(out_of_range)
        }
        "year" | "years" | "mon" | "mons" => Err(PlannerError::invalid_runtime(format!(
            "不支持非固定长度的单位: {unit}"
        ))),
        other => Err(PlannerError::invalid_runtime(format!("未知的时间单位: {other}"))),
    }
}

/// 带小数的秒数，非有限值或超出 i64 毫秒范围时返回 `None`
fn fractional_seconds(seconds: f64) -> Option<Duration> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

fn parse_clock(token: &str) -> PlannerResult<Duration> {
    let invalid = || PlannerError::invalid_runtime(format!("无法解析时钟格式: {token}"));
    let parts: Vec<&str> = token.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }
    Duration::try_hours(hours)
        .and_then(|h| h.checked_add(&Duration::minutes(minutes)))
        .and_then(|hm| fractional_seconds(seconds).and_then(|s| hm.checked_add(&s)))
        .ok_or_else(invalid)
}
