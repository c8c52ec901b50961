use time::OffsetDateTime;

/// Current UTC time truncated to microseconds.
///
/// PostgreSQL `TIMESTAMPTZ` keeps microsecond precision, so a timestamp taken
/// here reads back from any store unchanged.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let micros = now.microsecond();
    now.replace_microsecond(micros).unwrap_or(now)
}
