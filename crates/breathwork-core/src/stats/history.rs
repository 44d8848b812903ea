use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::SessionRecord;

/// Totals over the last seven days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_sessions: usize,
    pub total_duration_secs: u64,
    /// `None` when there were no sessions this week.
    pub most_used_pattern: Option<String>,
}

/// Records sharing one calendar day, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub records: Vec<SessionRecord>,
}

/// Aggregate records dated strictly after `now - 7 days`.
///
/// Ties for the most used pattern go to the pattern seen first in
/// `history`, i.e. the most recently used one.
pub fn weekly_stats(history: &[SessionRecord], now: DateTime<Utc>) -> WeeklyStats {
    let week_ago = now - Duration::days(7);
    let mut stats = WeeklyStats::default();
    let mut pattern_counts: Vec<(&str, usize)> = Vec::new();

    for record in history.iter().filter(|r| r.date > week_ago) {
        stats.total_sessions += 1;
        stats.total_duration_secs += record.duration;
        match pattern_counts.iter_mut().find(|(p, _)| *p == record.pattern) {
            Some((_, count)) => *count += 1,
            None => pattern_counts.push((record.pattern.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (pattern, count) in pattern_counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((pattern, count));
        }
    }
    stats.most_used_pattern = best.map(|(p, _)| p.to_string());
    stats
}

/// Sessions whose date falls on the same calendar day as `now`, in `now`'s
/// time zone.
pub fn today_session_count<Tz: TimeZone>(history: &[SessionRecord], now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let today = now.date_naive();
    history
        .iter()
        .filter(|r| r.date.with_timezone(&tz).date_naive() == today)
        .count()
}

/// Group by calendar day in `tz`, keeping first-seen day order.
pub fn group_by_day<Tz: TimeZone>(history: &[SessionRecord], tz: &Tz) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for record in history {
        let day = record.date.with_timezone(tz).date_naive();
        match groups.iter_mut().find(|g| g.day == day) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(DayGroup {
                day,
                records: vec![record.clone()],
            }),
        }
    }
    groups
}
