//! Invoice numbers: `INV-<year>-<seq>` with a 4-digit, zero-padded sequence
//! scoped to tenant + calendar year.
//!
//! These helpers are pure; the store-backed "next number for this tenant"
//! lives in the engine, and the uniqueness constraint at persist time stays
//! the final authority under concurrency.

/// Format a number for the given year and sequence.
pub fn format(year: i32, sequence: u32) -> String {
    format!("INV-{year}-{sequence:04}")
}

/// Prefix shared by all numbers of a year.
pub fn prefix(year: i32) -> String {
    format!("INV-{year}-")
}

/// Extract the sequence of a number issued in `year`; `None` when the number
/// belongs to a different year or does not parse.
pub fn sequence_for_year(number: &str, year: i32) -> Option<u32> {
    let rest = number.strip_prefix(&prefix(year))?;
    rest.parse().ok()
}

/// Next number in the year's sequence given every existing number for the
/// tenant: max sequence + 1, starting at `0001`.
pub fn next_in_sequence<'a>(existing: impl IntoIterator<Item = &'a str>, year: i32) -> String {
    let max = existing
        .into_iter()
        .filter_map(|number| sequence_for_year(number, year))
        .max()
        .unwrap_or(0);
    format(year, max + 1)
}
