use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

/// Resolves user-supplied date text to a calendar date.
///
/// Accepts `today`, `tomorrow`, bare weekday names, `next <weekday>` and
/// the literal formats `%d %B %Y`, `%Y-%m-%d`, `%d-%m-%Y` and `%d/%m/%Y`.
/// A bare weekday means the next occurrence; `next <weekday>` always lands
/// at least a week out.
pub fn normalize_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if lowered == "today" {
        return Some(today);
    }
    if lowered == "tomorrow" {
        return Some(today + Duration::days(1));
    }

    let (explicit_next, day_part) = match lowered.strip_prefix("next ") {
        Some(rest) => (true, rest.trim()),
        None => (false, lowered.as_str()),
    };
    if let Ok(target) = day_part.parse::<Weekday>() {
        let mut days_ahead = i64::from(target.num_days_from_monday())
            - i64::from(today.weekday().num_days_from_monday());
        if days_ahead <= 0 {
            days_ahead += 7;
        }
        if explicit_next && days_ahead < 7 {
            days_ahead += 7;
        }
        return Some(today + Duration::days(days_ahead));
    }

    let literal = raw.trim();
    for format in ["%d %B %Y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(literal, format) {
            return Some(parsed);
        }
    }
    None
}

/// Parses clock text in either `9:00 AM` or 24-hour `14:00` form.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let cleaned = raw.trim().to_uppercase().replace('.', "");
    if cleaned.contains("AM") || cleaned.contains("PM") {
        NaiveTime::parse_from_str(&cleaned, "%I:%M %p").ok()
    } else {
        NaiveTime::parse_from_str(&cleaned, "%H:%M").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        // 2026-08-19 is a Wednesday.
        NaiveDate::from_ymd_opt(2026, 8, 19).unwrap()
    }

    #[test]
    fn resolves_relative_words() {
        let today = wednesday();
        assert_eq!(normalize_date("today", today), Some(today));
        assert_eq!(
            normalize_date("Tomorrow", today),
            Some(NaiveDate::from_ymd_opt(2026, 8, 20).unwrap())
        );
    }

    #[test]
    fn bare_weekday_means_next_occurrence() {
        let today = wednesday();
        assert_eq!(
            normalize_date("friday", today),
            Some(NaiveDate::from_ymd_opt(2026, 8, 21).unwrap())
        );
        // Same weekday rolls a full week forward.
        assert_eq!(
            normalize_date("wednesday", today),
            Some(NaiveDate::from_ymd_opt(2026, 8, 26).unwrap())
        );
    }

    #[test]
    fn explicit_next_lands_at_least_a_week_out() {
        let today = wednesday();
        assert_eq!(
            normalize_date("next friday", today),
            Some(NaiveDate::from_ymd_opt(2026, 8, 28).unwrap())
        );
        assert_eq!(
            normalize_date("next wednesday", today),
            Some(NaiveDate::from_ymd_opt(2026, 8, 26).unwrap())
        );
    }

    #[test]
    fn parses_literal_formats() {
        let today = wednesday();
        let expected = NaiveDate::from_ymd_opt(2025, 11, 27).unwrap();
        assert_eq!(normalize_date("2025-11-27", today), Some(expected));
        assert_eq!(normalize_date("27-11-2025", today), Some(expected));
        assert_eq!(normalize_date("27/11/2025", today), Some(expected));
        assert_eq!(normalize_date("27 November 2025", today), Some(expected));
    }

    #[test]
    fn rejects_unreadable_dates() {
        assert_eq!(normalize_date("whenever", wednesday()), None);
        assert_eq!(normalize_date("", wednesday()), None);
    }

    #[test]
    fn parses_twelve_hour_clock() {
        let expected = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_clock("2:30 PM"), Some(expected));
        assert_eq!(parse_clock("2:30 p.m."), Some(expected));
    }

    #[test]
    fn parses_twenty_four_hour_clock() {
        assert_eq!(parse_clock("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("14:00"), NaiveTime::from_hms_opt(14, 0, 0));
    }

    #[test]
    fn rejects_unreadable_clock() {
        assert_eq!(parse_clock("noon"), None);
        assert_eq!(parse_clock("9 AM"), None);
    }
}
