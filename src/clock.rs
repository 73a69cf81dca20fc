use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

/// Today on the local calendar, or the UTC day when the local offset is unknown.
pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub fn local_tomorrow() -> Date {
    let today = local_today();
    today.next_day().unwrap_or(today)
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses a `YYYY-MM-DD` calendar date; anything after the day is ignored.
pub fn parse_date(raw: &str) -> Option<Date> {
    let head = raw.trim().get(..10)?;
    let mut parts = head.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u8>().ok()?;
    let day = parts.next()?.parse::<u8>().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

#[cfg(test)]
mod tests {
    use super::{format_date, local_today, local_tomorrow, now_utc_rfc3339, parse_date};
    use time::format_description::well_known::Rfc3339;
    use time::{Date, Month, OffsetDateTime};

    #[test]
    fn timestamps_are_rfc3339() {
        let stamp = now_utc_rfc3339();
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok());
    }

    #[test]
    fn formats_and_parses_calendar_dates() {
        let date = Date::from_calendar_date(2026, Month::March, 7).expect("valid date");
        assert_eq!(format_date(date), "2026-03-07");
        assert_eq!(parse_date("2026-03-07"), Some(date));
        assert_eq!(parse_date("2026-03-07T10:00:00.000Z"), Some(date));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2026-13-01"), None);
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("tomorrow"), None);
    }

    #[test]
    fn tomorrow_is_the_day_after_the_local_date() {
        let expected = OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
            .next_day()
            .expect("tomorrow exists");
        assert_eq!(local_tomorrow(), expected);
        assert_eq!(local_today().next_day(), Some(expected));
    }
}
