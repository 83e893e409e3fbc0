use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Utc};

/// Largest accepted magnitude for a client-supplied UTC offset (±14h).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Builds a fixed offset from the client's `tzOffsetMinutes` (minutes east of UTC).
///
/// Out-of-range offsets fall back to UTC.
pub fn local_offset(offset_minutes: i32) -> FixedOffset {
    if offset_minutes.abs() > MAX_OFFSET_MINUTES {
        return Utc.fix();
    }
    FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Returns the end of the goal week containing `now`: the following Sunday at
/// 23:59:59 in `now`'s own offset. A Sunday maps to 23:59:59 of that same day.
pub fn week_end<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let days_until_sunday = (7 - now.weekday().num_days_from_sunday()) % 7;
    let end_date = now.date_naive() + Duration::days(i64::from(days_until_sunday));
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");
    let naive_end = end_date.and_time(end_of_day);
    // Fixed offsets are never ambiguous; for zones with DST pick the earliest
    // instant so the week never extends past the wall-clock deadline.
    now.timezone()
        .from_local_datetime(&naive_end)
        .earliest()
        .unwrap_or_else(|| now.clone() + Duration::days(i64::from(days_until_sunday)))
}

/// Convenience wrapper returning the week end as a UTC instant.
pub fn week_end_utc(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    week_end(&now.with_timezone(&offset)).with_timezone(&Utc)
}
