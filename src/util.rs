/// Formats a whole number of seconds as a mm:ss countdown string.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a minute total as "Xm", "Xh", or "Xh Ym".
pub fn format_hours(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        return format!("{}m", mins);
    }

    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Sessions completed today, derived from focus minutes assuming 25-minute
/// sessions regardless of the configured duration.
// TODO: derive this from a per-day session counter once the analytics record
// carries one, instead of dividing by a fixed 25.
pub fn sessions_today(today_focus_minutes: u32) -> u32 {
    today_focus_minutes / 25
}

/// "s" for any count other than one.
pub fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(59), "00:59");
        assert_eq!(format_mm_ss(60), "01:00");
        assert_eq!(format_mm_ss(1500), "25:00");
        assert_eq!(format_mm_ss(3599), "59:59");
    }

    #[test]
    fn test_format_hours_under_an_hour() {
        assert_eq!(format_hours(0), "0m");
        assert_eq!(format_hours(45), "45m");
    }

    #[test]
    fn test_format_hours_exact_hours() {
        assert_eq!(format_hours(60), "1h");
        assert_eq!(format_hours(120), "2h");
    }

    #[test]
    fn test_format_hours_mixed() {
        assert_eq!(format_hours(90), "1h 30m");
        assert_eq!(format_hours(185), "3h 5m");
    }

    #[test]
    fn test_sessions_today_uses_fixed_session_length() {
        assert_eq!(sessions_today(0), 0);
        assert_eq!(sessions_today(24), 0);
        assert_eq!(sessions_today(25), 1);
        assert_eq!(sessions_today(100), 4);
        // a 50-minute configured session still counts as two here
        assert_eq!(sessions_today(50), 2);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "s");
        assert_eq!(plural(1), "");
        assert_eq!(plural(2), "s");
    }
}
