// src/utils/time.rs

/// Extracts the year from a DHIS2-style period code.
///
/// The first four characters must be ASCII digits (`"2023"`, `"202307"`).
/// Anything shorter or non-numeric yields `None`; the record then simply
/// drops out of year-keyed aggregations.
pub fn period_year(period: &str) -> Option<i32> {
    let year = period.get(0..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Extracts the calendar month (1-12) from a monthly period code.
///
/// Requires a parseable year and at least six characters; out-of-range
/// months (e.g. `"202313"`) yield `None`.
pub fn period_month(period: &str) -> Option<u32> {
    period_year(period)?;
    let month = period.get(4..6)?;
    if !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}
