use crate::models::WeekRange;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn local_day_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn local_day(instant: &DateTime<Utc>) -> NaiveDate {
    local_day_in(instant, &Local)
}

pub fn today() -> NaiveDate {
    local_day(&Utc::now())
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

pub fn week_range(today: NaiveDate, offset: i32) -> WeekRange {
    let from_monday = i64::from(today.weekday().num_days_from_monday());
    let shift = i64::from(offset) * 7 - from_monday;
    let start = shift_days(today, shift);
    WeekRange {
        start,
        end: shift_days(start, 6),
    }
}

// Rounded up; direction is ignored.
pub fn elapsed_days_ceil(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    let millis = (*to - *from).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn day(raw: &str) -> NaiveDate {
        parse_day(raw).expect("valid day")
    }

    #[test]
    fn projects_instant_onto_the_local_wall_clock_day() {
        let instant = DateTime::parse_from_rfc3339("2024-03-01T18:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let shanghai = FixedOffset::east_opt(8 * 3600).expect("offset");
        let new_york = FixedOffset::west_opt(5 * 3600).expect("offset");
        assert_eq!(local_day_in(&instant, &shanghai), day("2024-03-02"));
        assert_eq!(local_day_in(&instant, &new_york), day("2024-03-01"));
        assert_eq!(local_day_in(&instant, &Utc), day("2024-03-01"));
    }

    #[test]
    fn day_strings_round_trip() {
        assert_eq!(format_day(day("2024-01-09")), "2024-01-09");
        assert!(parse_day("2024-1-9x").is_none());
        assert!(parse_day("").is_none());
    }

    #[test]
    fn week_range_starts_on_monday() {
        // 2024-06-12 is a Wednesday.
        let current = week_range(day("2024-06-12"), 0);
        assert_eq!(current.start, day("2024-06-10"));
        assert_eq!(current.end, day("2024-06-16"));

        let previous = week_range(day("2024-06-12"), -1);
        assert_eq!(previous.start, day("2024-06-03"));
        assert_eq!(previous.end, day("2024-06-09"));
    }

    #[test]
    fn sunday_belongs_to_the_week_that_started_six_days_earlier() {
        let range = week_range(day("2024-06-16"), 0);
        assert_eq!(range.start, day("2024-06-10"));
        assert_eq!(range.end, day("2024-06-16"));
    }

    #[test]
    fn elapsed_days_round_up_partial_days() {
        let start = Utc::now();
        assert_eq!(elapsed_days_ceil(&start, &start), 0);
        assert_eq!(elapsed_days_ceil(&start, &(start + Duration::hours(1))), 1);
        assert_eq!(elapsed_days_ceil(&start, &(start + Duration::days(7))), 7);
        assert_eq!(elapsed_days_ceil(&(start + Duration::hours(25)), &start), 2);
    }

    #[test]
    fn days_before_crosses_month_boundaries() {
        assert_eq!(days_before(day("2024-03-01"), 1), day("2024-02-29"));
        assert_eq!(days_before(day("2024-03-01"), 0), day("2024-03-01"));
    }
}
