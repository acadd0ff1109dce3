use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Parse a loose date expression against a reference day.
///
/// Accepted forms:
///   "2026-03-15"                    ISO passthrough
///   "today" / "tomorrow" / "yesterday"
///   "in 3 days" / "3 days from now"
///   "friday" / "fri"                nearest occurrence >= today
///   "next friday"                   strictly future; a full week out when
///                                   today already is that weekday
///   "last friday"                   most recent strictly-past occurrence
///   "on monday"                     "on" prefix is tolerated
///
/// Anything unrecognized returns None; callers omit the field rather than
/// fail the whole record.
pub fn parse_date_expression(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Some(date);
    }

    match text.as_str() {
        "today" | "now" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    // "in 3 days" / "3 days from now" / "in 1 day"
    let words: Vec<&str> = text.split_whitespace().collect();
    match words.as_slice() {
        ["in", n, "day" | "days"] | [n, "day" | "days", "from", "now"] => {
            if let Ok(n) = n.parse::<i64>() {
                return Some(today + Duration::days(n));
            }
        }
        _ => {}
    }

    // Weekday, optionally prefixed with "next", "last" or "on".
    let (prefix, day_word) = match words.as_slice() {
        ["next", day] => (Some("next"), *day),
        ["last", day] => (Some("last"), *day),
        ["on", day] => (None, *day),
        [day] => (None, *day),
        _ => return None,
    };
    let target = parse_weekday(day_word)?;

    let offset = i64::from(target.num_days_from_monday()) - i64::from(today.weekday().num_days_from_monday());
    match prefix {
        Some("last") => {
            // most recent strictly-past occurrence
            let mut behind = (-offset).rem_euclid(7);
            if behind == 0 {
                behind = 7;
            }
            Some(today - Duration::days(behind))
        }
        Some(_) => {
            // "next <day>" never resolves to today
            let mut ahead = offset.rem_euclid(7);
            if ahead == 0 {
                ahead = 7;
            }
            Some(today + Duration::days(ahead))
        }
        None => Some(today + Duration::days(offset.rem_euclid(7))),
    }
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_passthrough() {
        let today = day(2026, 8, 3);
        assert_eq!(parse_date_expression("2026-03-15", today), Some(day(2026, 3, 15)));
        assert_eq!(parse_date_expression(" 2026-12-01 ", today), Some(day(2026, 12, 1)));
    }

    #[test]
    fn test_relative_words() {
        let today = day(2026, 8, 3);
        assert_eq!(parse_date_expression("today", today), Some(today));
        assert_eq!(parse_date_expression("Tomorrow", today), Some(day(2026, 8, 4)));
        assert_eq!(parse_date_expression("yesterday", today), Some(day(2026, 8, 2)));
    }

    #[test]
    fn test_in_n_days() {
        let today = day(2026, 8, 3);
        assert_eq!(parse_date_expression("in 3 days", today), Some(day(2026, 8, 6)));
        assert_eq!(parse_date_expression("in 1 day", today), Some(day(2026, 8, 4)));
        assert_eq!(parse_date_expression("10 days from now", today), Some(day(2026, 8, 13)));
    }

    #[test]
    fn test_bare_weekday_rolls_to_nearest_at_or_after_today() {
        // 2026-08-03 is a Monday.
        let monday = day(2026, 8, 3);
        assert_eq!(parse_date_expression("friday", monday), Some(day(2026, 8, 7)));
        assert_eq!(parse_date_expression("Fri", monday), Some(day(2026, 8, 7)));
        // Today's own weekday counts as the nearest occurrence.
        assert_eq!(parse_date_expression("monday", monday), Some(monday));
        // Already-passed weekday rolls into next week.
        assert_eq!(parse_date_expression("sunday", monday), Some(day(2026, 8, 9)));
        assert_eq!(parse_date_expression("on wednesday", monday), Some(day(2026, 8, 5)));
    }

    #[test]
    fn test_next_weekday_is_strictly_future() {
        let monday = day(2026, 8, 3);
        // "next monday" said on a Monday is a week out, never today.
        assert_eq!(parse_date_expression("next monday", monday), Some(day(2026, 8, 10)));
        assert_eq!(parse_date_expression("next friday", monday), Some(day(2026, 8, 7)));
    }

    #[test]
    fn test_last_weekday_is_strictly_past() {
        let monday = day(2026, 8, 3);
        assert_eq!(parse_date_expression("last friday", monday), Some(day(2026, 7, 31)));
        // "last monday" said on a Monday is a week back, never today.
        assert_eq!(parse_date_expression("last monday", monday), Some(day(2026, 7, 27)));
    }

    #[test]
    fn test_garbage_is_none() {
        let today = day(2026, 8, 3);
        assert_eq!(parse_date_expression("", today), None);
        assert_eq!(parse_date_expression("soonish", today), None);
        assert_eq!(parse_date_expression("in five days", today), None);
        assert_eq!(parse_date_expression("2026-13-40", today), None);
    }
}
