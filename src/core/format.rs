use std::time::Duration;

/// Label shown in the indicator: `"42m"` below an hour, `"3h 7m"` above.
pub fn format_label(total: Duration) -> String {
    let total_minutes = total.as_secs() / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn minute_and_hour_boundaries() {
        assert_eq!(format_label(Duration::ZERO), "0m");
        assert_eq!(format_label(mins(59)), "59m");
        assert_eq!(format_label(mins(60)), "1h 0m");
        assert_eq!(format_label(mins(90)), "1h 30m");
    }

    #[test]
    fn seconds_are_truncated() {
        assert_eq!(format_label(Duration::from_secs(59)), "0m");
        assert_eq!(format_label(Duration::from_millis(119_999)), "1m");
        assert_eq!(format_label(Duration::from_secs(3599)), "59m");
    }

    #[test]
    fn long_days_keep_counting_hours() {
        assert_eq!(format_label(mins(25 * 60 + 5)), "25h 5m");
    }
}
