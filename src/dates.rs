//! Due-date input parsing and relative formatting.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};

/// Parse human-friendly due-date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow"
/// - bare weekday names ("friday" = this week's occurrence)
/// - "next monday", "next fri"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" and "YYYY-MM-DD HH:MM"
///
/// Date-only inputs resolve to midnight.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return today.and_hms_opt(0, 0, 0),
        "tomorrow" => return (today + Duration::days(1)).and_hms_opt(0, 0, 0),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return (today + Duration::days(n)).and_hms_opt(0, 0, 0);
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return (today + Duration::weeks(n)).and_hms_opt(0, 0, 0);
        }
    }

    let (next_week, name) = match s.strip_prefix("next ") {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    if let Some(target) = weekday_index(name) {
        let current = today.weekday().num_days_from_monday() as i64;
        let mut ahead = (target - current).rem_euclid(7);
        if next_week {
            ahead += 7;
        }
        return (today + Duration::days(ahead)).and_hms_opt(0, 0, 0);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn weekday_index(name: &str) -> Option<i64> {
    let idx = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(idx)
}

/// Parse a plain calendar date for the `day` view.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();
    match s.as_str() {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok(),
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d",
/// "2d late"). Overdue means strictly before today; today itself is not
/// treated as late.
pub fn format_due_relative(due: Option<NaiveDateTime>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(dt) => {
            let days = (dt.date() - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                d if d > 1 => format!("in {d}d"),
                d => format!("{}d late", -d),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wed() -> NaiveDate {
        // 2026-08-19 is a Wednesday.
        NaiveDate::from_ymd_opt(2026, 8, 19).unwrap()
    }

    #[test]
    fn parses_keywords_and_offsets() {
        let today = wed();
        assert_eq!(parse_due_input("today", today).unwrap().date(), today);
        assert_eq!(
            parse_due_input("tomorrow", today).unwrap().date(),
            today + Duration::days(1)
        );
        assert_eq!(
            parse_due_input("in 3d", today).unwrap().date(),
            today + Duration::days(3)
        );
        assert_eq!(
            parse_due_input("in 2w", today).unwrap().date(),
            today + Duration::days(14)
        );
    }

    #[test]
    fn parses_weekdays() {
        let today = wed();
        // This week's Friday is two days out.
        assert_eq!(
            parse_due_input("friday", today).unwrap().date(),
            today + Duration::days(2)
        );
        // A bare weekday that matches today resolves to today.
        assert_eq!(parse_due_input("wed", today).unwrap().date(), today);
        // "next" always lands in the following week.
        assert_eq!(
            parse_due_input("next wed", today).unwrap().date(),
            today + Duration::days(7)
        );
    }

    #[test]
    fn parses_explicit_dates_and_times() {
        let today = wed();
        let dt = parse_due_input("2026-09-01 18:30", today).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2026-09-01 18:30");
        let midnight = parse_due_input("2026-09-01", today).unwrap();
        assert_eq!(midnight.format("%H:%M").to_string(), "00:00");
        assert!(parse_due_input("someday", today).is_none());
    }

    #[test]
    fn relative_formatting() {
        let today = wed();
        let at = |d: NaiveDate| d.and_hms_opt(9, 0, 0);
        assert_eq!(format_due_relative(at(today), today), "today");
        assert_eq!(format_due_relative(at(today + Duration::days(1)), today), "tomorrow");
        assert_eq!(format_due_relative(at(today + Duration::days(4)), today), "in 4d");
        assert_eq!(format_due_relative(at(today - Duration::days(2)), today), "2d late");
        assert_eq!(format_due_relative(None, today), "-");
    }
}
