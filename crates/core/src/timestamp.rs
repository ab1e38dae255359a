use chrono::NaiveDateTime;

/// Formats tried in order, each with the exact year width it accepts; the
/// first one that parses wins.
///
/// Day-first variants come before the US month-first one, so an ambiguous
/// date such as `01/02/23` always reads as 1 February.
pub const TIMESTAMP_FORMATS: [(&str, usize); 7] = [
    ("%d/%m/%y %I:%M:%S %p", 2),
    ("%d/%m/%Y %I:%M:%S %p", 4),
    ("%m/%d/%y %I:%M:%S %p", 2),
    ("%d/%m/%y %I:%M %p", 2),
    ("%d/%m/%Y %I:%M %p", 4),
    ("%d/%m/%y %H:%M", 2),
    ("%d/%m/%Y %H:%M", 4),
];

/// Digits in the year field of `D/M/Y ...`, if the date part has three fields.
fn year_width(cleaned: &str) -> Option<usize> {
    let date = cleaned.split_whitespace().next()?;
    let year = date.split('/').nth(2)?;
    year.chars()
        .all(|c| c.is_ascii_digit())
        .then_some(year.len())
}

/// Parses a header timestamp token such as `[12/01/24, 10:30:45 AM]`.
///
/// Commas and square brackets are removed before matching. Returns `None`
/// when no known format fits.
pub fn parse_timestamp(token: &str) -> Option<NaiveDateTime> {
    let cleaned: String = token
        .chars()
        .filter(|c| !matches!(c, ',' | '[' | ']'))
        .collect();

    // chrono's %Y takes any number of digits; only 2- or 4-digit years are valid
    let width = year_width(&cleaned)?;
    TIMESTAMP_FORMATS
        .iter()
        .filter(|(_, year_digits)| *year_digits == width)
        .find_map(|(format, _)| NaiveDateTime::parse_from_str(&cleaned, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, s).unwrap())
    }

    #[test]
    fn test_parse_timestamp_bracketed_with_seconds() {
        assert_eq!(
            parse_timestamp("[12/01/24, 10:30:45 AM]"),
            Some(at(2024, 1, 12, 10, 30, 45))
        );
    }

    #[test]
    fn test_parse_timestamp_four_digit_year_with_seconds() {
        assert_eq!(
            parse_timestamp("12/01/2024, 10:30:45 PM"),
            Some(at(2024, 1, 12, 22, 30, 45))
        );
    }

    #[test]
    fn test_parse_timestamp_us_variant_when_day_first_is_invalid() {
        // Month 13 rules out day-first, so the month-first format applies.
        assert_eq!(
            parse_timestamp("12/13/24, 9:05:00 AM"),
            Some(at(2024, 12, 13, 9, 5, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_ambiguous_date_is_day_first() {
        assert_eq!(
            parse_timestamp("01/02/23, 10:00 AM"),
            Some(at(2023, 2, 1, 10, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_short_time() {
        assert_eq!(
            parse_timestamp("12/01/24, 10:30 AM"),
            Some(at(2024, 1, 12, 10, 30, 0))
        );
        assert_eq!(
            parse_timestamp("5/1/2024, 1:07 PM"),
            Some(at(2024, 1, 5, 13, 7, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_twenty_four_hour() {
        assert_eq!(
            parse_timestamp("12/01/24, 18:45"),
            Some(at(2024, 1, 12, 18, 45, 0))
        );
        assert_eq!(
            parse_timestamp("12/01/2024 18:45"),
            Some(at(2024, 1, 12, 18, 45, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_us_short_time_is_not_supported() {
        // Only the seconds-bearing layout has a month-first variant.
        assert_eq!(parse_timestamp("12/13/24, 10:00 AM"), None);
    }

    #[test]
    fn test_parse_timestamp_dash_dates_are_rejected() {
        assert_eq!(parse_timestamp("12-01-24, 10:00 AM"), None);
    }

    #[test]
    fn test_parse_timestamp_rejects_three_digit_years() {
        assert_eq!(parse_timestamp("12/01/024, 10:00 AM"), None);
        assert_eq!(parse_timestamp("12/01/201 18:45"), None);
        assert_eq!(parse_timestamp("[12/01/202, 10:30:45 AM]"), None);
    }

    #[test]
    fn test_parse_timestamp_four_digit_year_short_time() {
        assert_eq!(
            parse_timestamp("12/01/2024, 10:00 AM"),
            Some(at(2024, 1, 12, 10, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a timestamp"), None);
        assert_eq!(parse_timestamp("32/01/24, 10:00"), None);
    }
}
