use chrono::{Duration, NaiveDate, NaiveTime};

/// `"1h 5m"`, `"3m 20s"` or `"45s"`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Like [`format_duration`] but never shows seconds: `"1h 5m"` or `"3m"`.
pub fn format_duration_short(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// `"Today"`, `"Yesterday"`, otherwise `"Mar 5"`.
pub fn format_day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".into()
    } else if today.checked_sub_signed(Duration::days(1)) == Some(day) {
        "Yesterday".into()
    } else {
        day.format("%b %-d").to_string()
    }
}

/// 12-hour clock: `"9:05 AM"`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(200), "3m 20s");
        assert_eq!(format_duration(3900), "1h 5m");
        assert_eq!(format_duration_short(45), "0m");
        assert_eq!(format_duration_short(200), "3m");
        assert_eq!(format_duration_short(3900), "1h 5m");
    }

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_day_label(today, today), "Today");
        let yesterday = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_day_label(yesterday, today), "Yesterday");
        let older = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(format_day_label(older, today), "Feb 5");
    }

    #[test]
    fn time_of_day() {
        assert_eq!(format_time_of_day(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "9:05 AM");
        assert_eq!(format_time_of_day(NaiveTime::from_hms_opt(0, 30, 0).unwrap()), "12:30 AM");
        assert_eq!(format_time_of_day(NaiveTime::from_hms_opt(15, 0, 0).unwrap()), "3:00 PM");
    }
}
