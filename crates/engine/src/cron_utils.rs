use chrono::{DateTime, Duration, SubsecRound, Utc};
use cron::Schedule;
use std::str::FromStr;
use tracing::{debug, warn};

use cronslot_errors::{PlannerError, PlannerResult};

/// 标准 cron 的星期编号（0 和 7 均为周日）对应的名称
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// 五段式 cron 表达式（分 时 日 月 周）
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    expression: String,
    schedule: Schedule,
}

impl RecurrenceRule {
    /// 解析并校验表达式，无法满足的表达式（例如 2 月 31 日）同样返回错误
    pub fn parse(expression: &str) -> PlannerResult<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(PlannerError::invalid_rule(
                expression,
                format!("需要5个字段，实际为{}个", fields.len()),
            ));
        }

        let day_of_week = translate_day_of_week(fields[4])
            .map_err(|message| PlannerError::invalid_rule(expression, message))?;
        let normalized = format!(
            "0 {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3], day_of_week
        );
        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| PlannerError::invalid_rule(expression, e.to_string()))?;

        if schedule.after(&DateTime::<Utc>::UNIX_EPOCH).next().is_none() {
            return Err(PlannerError::invalid_rule(expression, "表达式永远不会触发"));
        }

        debug!("解析CRON表达式: {} -> {}", expression, normalized);
        Ok(Self {
            expression: fields.join(" "),
            schedule,
        })
    }

    /// 验证CRON表达式是否有效
    pub fn validate(expression: &str) -> PlannerResult<()> {
        Self::parse(expression).map(|_| ())
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// 严格晚于 `after` 的最早执行时间
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> PlannerResult<DateTime<Utc>> {
        self.schedule.after(&after).next().ok_or_else(|| {
            warn!(
                "无法计算下一次执行时间: {}, 起点: {}",
                self.expression,
                after.format("%Y-%m-%d %H:%M:%S UTC")
            );
            PlannerError::invalid_rule(&self.expression, "在可预见范围内没有下一次执行时间")
        })
    }

    /// 以 `anchor` 为起点的游标，第一次推进得到严格晚于 `anchor` 的时间
    pub fn cursor(&self, anchor: DateTime<Utc>) -> OccurrenceCursor<'_> {
        OccurrenceCursor::new(self, anchor)
    }

    /// 以 `anchor` 为起点的游标，`anchor` 本身若匹配也会被产出
    pub fn cursor_inclusive(&self, anchor: DateTime<Utc>) -> OccurrenceCursor<'_> {
        let floor = anchor.trunc_subsecs(0);
        let start = if floor == anchor {
            floor
                .checked_sub_signed(Duration::seconds(1))
                .unwrap_or(floor)
        } else {
            floor
        };
        OccurrenceCursor::new(self, start)
    }

    /// `anchor` 之后、不晚于 `until` 的执行时间
    pub fn occurrences(&self, anchor: DateTime<Utc>, until: DateTime<Utc>) -> Occurrences<'_> {
        Occurrences {
            cursor: Some(self.cursor(anchor)),
            until,
        }
    }

    /// 获取从指定时间开始的多个执行时间
    pub fn upcoming_times(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.occurrences(from, DateTime::<Utc>::MAX_UTC)
            .take(count)
            .collect()
    }
}

/// 枚举游标 `{rule, last_emitted}`，推进是纯函数，便于重放
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceCursor<'r> {
    rule: &'r RecurrenceRule,
    last_emitted: DateTime<Utc>,
}

impl<'r> OccurrenceCursor<'r> {
    pub fn new(rule: &'r RecurrenceRule, anchor: DateTime<Utc>) -> Self {
        Self {
            rule,
            last_emitted: anchor,
        }
    }

    pub fn rule(&self) -> &'r RecurrenceRule {
        self.rule
    }

    pub fn last_emitted(&self) -> DateTime<Utc> {
        self.last_emitted
    }

    pub fn advance(self) -> PlannerResult<(Self, DateTime<Utc>)> {
        let next = self.rule.next_occurrence(self.last_emitted)?;
        Ok((
            Self {
                last_emitted: next,
                ..self
            },
            next,
        ))
    }
}

/// 有上界的执行时间迭代器
#[derive(Debug, Clone)]
pub struct Occurrences<'r> {
    cursor: Option<OccurrenceCursor<'r>>,
    until: DateTime<Utc>,
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        match cursor.advance() {
            Ok((next_cursor, instant)) if instant <= self.until => {
                self.cursor = Some(next_cursor);
                Some(instant)
            }
            _ => None,
        }
    }
}

/// 把数字星期（0-7）展开为名称，已是名称的部分原样保留
fn translate_day_of_week(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let mut items = Vec::new();
    for item in field.split(',') {
        match expand_numeric_weekdays(item)? {
            Some(days) => {
                let mut names: Vec<&str> = Vec::new();
                for day in days {
                    let name = WEEKDAY_NAMES[(day % 7) as usize];
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                items.push(names.join(","));
            }
            None => items.push(item.to_string()),
        }
    }
    Ok(items.join(","))
}

fn expand_numeric_weekdays(item: &str) -> Result<Option<Vec<u32>>, String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("无效的星期步长: {item}"))?;
            if step == 0 {
                return Err(format!("星期步长不能为0: {item}"));
            }
            (range, Some(step))
        }
        None => (item, None),
    };

    let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let (start, end) = if range == "*" {
        (0, 6)
    } else if let Some((start, end)) = range.split_once('-') {
        if !is_number(start) || !is_number(end) {
            return Ok(None);
        }
        (parse_weekday(start)?, parse_weekday(end)?)
    } else if is_number(range) {
        let start = parse_weekday(range)?;
        (start, if step.is_some() { start.max(6) } else { start })
    } else {
        return Ok(None);
    };

    if start > end {
        return Err(format!("无效的星期范围: {item}"));
    }
    let step = step.unwrap_or(1) as usize;
    Ok(Some((start..=end).step_by(step).collect()))
}

fn parse_weekday(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(day) if day <= 7 => Ok(day),
        _ => Err(format!("星期取值必须在0-7之间: {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_day_of_week() {
        assert_eq!(translate_day_of_week("*").unwrap(), "*");
        assert_eq!(translate_day_of_week("0").unwrap(), "SUN");
        assert_eq!(translate_day_of_week("7").unwrap(), "SUN");
        assert_eq!(
            translate_day_of_week("1-5").unwrap(),
            "MON,TUE,WED,THU,FRI"
        );
        assert_eq!(translate_day_of_week("5-7").unwrap(), "FRI,SAT,SUN");
        assert_eq!(translate_day_of_week("*/2").unwrap(), "SUN,TUE,THU,SAT");
        assert_eq!(translate_day_of_week("0,6").unwrap(), "SUN,SAT");
        assert_eq!(translate_day_of_week("MON-FRI").unwrap(), "MON-FRI");
    }

    #[test]
    fn test_translate_day_of_week_rejects_out_of_range() {
        assert!(translate_day_of_week("8").is_err());
        assert!(translate_day_of_week("5-2").is_err());
        assert!(translate_day_of_week("*/0").is_err());
    }
}
