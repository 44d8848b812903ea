//! Statistics module for Breathwork
//!
//! Aggregations over session history (weekly totals, today's count, per-day
//! grouping) and the human-readable formatting used by the front ends.

mod format;
mod history;

pub use format::{format_day_label, format_duration, format_duration_short, format_time_of_day};
pub use history::{group_by_day, today_session_count, weekly_stats, DayGroup, WeeklyStats};
