use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration, Month,
    OffsetDateTime, UtcOffset,
};

const DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse a calendar day from `YYYY-MM-DD` or from the date part of an
/// RFC 3339 timestamp (normalized to UTC).
pub fn parse_date(raw: &str) -> Option<Date> {
    if let Ok(date) = Date::parse(raw, DATE_FORMAT) {
        return Some(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).date())
}

/// Parse a log timestamp: a full RFC 3339 datetime is kept as-is, a bare
/// date means UTC midnight of that day.
pub fn parse_logged_at(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    Date::parse(raw, DATE_FORMAT)
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Half-open UTC window covering one calendar day. `start <= t < end` is
/// equivalent to the inclusive start-of-day/end-of-day contract at
/// timestamp granularity. `None` when the window's end is not
/// representable (the last supported calendar day).
pub fn day_bounds(day: Date) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let start = day.midnight().assume_utc();
    let end = start.checked_add(Duration::days(1))?;
    Some((start, end))
}

/// UTC window for a whole month, plus the number of days in it. `None`
/// for an invalid month or one whose end is not representable.
pub fn month_bounds(year: i32, month: u8) -> Option<(OffsetDateTime, OffsetDateTime, u8)> {
    let month = Month::try_from(month).ok()?;
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let days = time::util::days_in_year_month(year, month);
    let start = first.midnight().assume_utc();
    let end = start.checked_add(Duration::days(i64::from(days)))?;
    Some((start, end, days))
}

/// Half-open UTC window covering seven days from `start`. `None` when the
/// window runs past the last representable day.
pub fn week_bounds(start: Date) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let window_start = start.midnight().assume_utc();
    let window_end = window_start.checked_add(Duration::days(7))?;
    Some((window_start, window_end))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_bare_dates_and_timestamps() {
        assert_eq!(parse_date("2025-02-14"), Some(date!(2025 - 02 - 14)));
        assert_eq!(
            parse_date("2025-02-14T23:10:00Z"),
            Some(date!(2025 - 02 - 14))
        );
        assert_eq!(parse_date("14/02/2025"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn timestamp_date_is_normalized_to_utc() {
        // 23:30 at +02:00 is 21:30 UTC, still the 14th.
        assert_eq!(
            parse_date("2025-02-14T23:30:00+02:00"),
            Some(date!(2025 - 02 - 14))
        );
        // 00:30 at +02:00 is 22:30 UTC the previous day.
        assert_eq!(
            parse_date("2025-02-15T00:30:00+02:00"),
            Some(date!(2025 - 02 - 14))
        );
    }

    #[test]
    fn bare_logged_at_means_utc_midnight() {
        assert_eq!(
            parse_logged_at("2025-02-14"),
            Some(datetime!(2025-02-14 00:00 UTC))
        );
        assert_eq!(
            parse_logged_at("2025-02-14T12:30:00Z"),
            Some(datetime!(2025-02-14 12:30 UTC))
        );
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let (start, end) = day_bounds(date!(2025 - 02 - 14)).expect("in range");
        assert_eq!(start, datetime!(2025-02-14 00:00 UTC));
        assert_eq!(end, datetime!(2025-02-15 00:00 UTC));
    }

    #[test]
    fn day_bounds_reject_the_last_representable_day() {
        // The window end would be 10000-01-01, which `time` cannot hold.
        assert!(day_bounds(date!(9999 - 12 - 31)).is_none());
        assert!(day_bounds(date!(9999 - 12 - 30)).is_some());
    }

    #[test]
    fn week_bounds_cover_seven_days() {
        let (start, end) = week_bounds(date!(2025 - 03 - 10)).expect("in range");
        assert_eq!(start, datetime!(2025-03-10 00:00 UTC));
        assert_eq!(end, datetime!(2025-03-17 00:00 UTC));
    }

    #[test]
    fn week_bounds_reject_windows_past_the_calendar_end() {
        let (_, end) = week_bounds(date!(9999 - 12 - 24)).expect("in range");
        assert_eq!(end, datetime!(9999-12-31 00:00 UTC));
        assert!(week_bounds(date!(9999 - 12 - 25)).is_none());
        assert!(week_bounds(date!(9999 - 12 - 31)).is_none());
    }

    #[test]
    fn month_bounds_handle_leap_years() {
        let (start, end, days) = month_bounds(2024, 2).expect("valid month");
        assert_eq!(days, 29);
        assert_eq!(start, datetime!(2024-02-01 00:00 UTC));
        assert_eq!(end, datetime!(2024-03-01 00:00 UTC));

        let (_, _, days) = month_bounds(2025, 2).expect("valid month");
        assert_eq!(days, 28);

        assert!(month_bounds(2025, 13).is_none());
        assert!(month_bounds(2025, 0).is_none());
    }

    #[test]
    fn month_bounds_reject_the_last_representable_month() {
        // December 9999 ends at 10000-01-01, past the supported range.
        assert!(month_bounds(9999, 12).is_none());
        assert!(month_bounds(9999, 11).is_some());
    }

    #[test]
    fn formats_dates_zero_padded() {
        assert_eq!(format_date(date!(2025 - 03 - 05)), "2025-03-05");
    }
}
