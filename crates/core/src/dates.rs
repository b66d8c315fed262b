use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Last bookable day, counted from today.
pub const SEARCH_WINDOW_DAYS: i64 = 359;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSlot {
    Outbound,
    Return,
}

impl DateSlot {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound date",
            Self::Return => "return date",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl SearchWindow {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            earliest: today + Duration::days(1),
            latest: today + Duration::days(SEARCH_WINDOW_DAYS),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.earliest && date <= self.latest
    }
}

impl std::fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "between {} and {}", self.earliest, self.latest)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DateRejection {
    #[error(
        "could not read {} `{input}`; use YYYY-MM-DD (or a day and month such as `15 Dec`) {window}",
        .slot.label()
    )]
    Unparseable { slot: DateSlot, input: String, window: SearchWindow },
    #[error("{} {date} must be strictly after today ({today}); choose a date {window}", .slot.label())]
    NotInFuture { slot: DateSlot, date: NaiveDate, today: NaiveDate, window: SearchWindow },
    #[error("{} {date} is beyond the searchable window; choose a date {window}", .slot.label())]
    BeyondWindow { slot: DateSlot, date: NaiveDate, window: SearchWindow },
    #[error("return date {return_date} must be after the outbound date {outbound}")]
    NotAfterOutbound { return_date: NaiveDate, outbound: NaiveDate },
}

impl DateRejection {
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::NotAfterOutbound { .. })
    }
}

/// Today's date at UTC midnight.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn validate_outbound(candidate: &str, today: NaiveDate) -> Result<NaiveDate, DateRejection> {
    let date = parse_travel_date(DateSlot::Outbound, candidate, today)?;
    check_window(DateSlot::Outbound, date, today)?;
    Ok(date)
}

pub fn validate_return(
    candidate: &str,
    outbound: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, DateRejection> {
    let date = parse_travel_date(DateSlot::Return, candidate, today)?;
    check_window(DateSlot::Return, date, today)?;
    if let Some(outbound) = outbound {
        check_ordering(outbound, date)?;
    }
    Ok(date)
}

pub fn check_window(slot: DateSlot, date: NaiveDate, today: NaiveDate) -> Result<(), DateRejection> {
    let window = SearchWindow::for_today(today);
    if date <= today {
        return Err(DateRejection::NotInFuture { slot, date, today, window });
    }
    if date > window.latest {
        return Err(DateRejection::BeyondWindow { slot, date, window });
    }
    Ok(())
}

pub fn check_ordering(outbound: NaiveDate, return_date: NaiveDate) -> Result<(), DateRejection> {
    if return_date <= outbound {
        return Err(DateRejection::NotAfterOutbound { return_date, outbound });
    }
    Ok(())
}

/// Strict ISO parse first, then day/month phrases resolved to their next occurrence.
pub fn parse_travel_date(
    slot: DateSlot,
    candidate: &str,
    today: NaiveDate,
) -> Result<NaiveDate, DateRejection> {
    let trimmed = candidate.trim();
    let unparseable = || DateRejection::Unparseable {
        slot,
        input: trimmed.to_string(),
        window: SearchWindow::for_today(today),
    };

    if is_iso_shape(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| unparseable());
    }

    let (day, month, year) = parse_day_month(trimmed).ok_or_else(unparseable)?;
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unparseable);
    }

    next_occurrence(day, month, today).ok_or_else(unparseable)
}

fn is_iso_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

fn next_occurrence(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date > today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn parse_day_month(value: &str) -> Option<(u32, u32, Option<i32>)> {
    let tokens = value
        .split(|ch: char| ch.is_whitespace() || ch == ',' || ch == '/' || ch == '.')
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();

    let (first, second, rest) = match tokens.as_slice() {
        [first, second] => (*first, *second, None),
        [first, second, third] => (*first, *second, Some(*third)),
        _ => return None,
    };

    let (day, month) = match (parse_day(first), month_number(second)) {
        (Some(day), Some(month)) => (day, month),
        _ => (parse_day(second)?, month_number(first)?),
    };

    let year = match rest {
        Some(token) if token.len() == 4 => Some(token.parse::<i32>().ok()?),
        Some(_) => return None,
        None => None,
    };

    Some((day, month, year))
}

fn parse_day(token: &str) -> Option<u32> {
    let lowered = token.to_ascii_lowercase();
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lowered.strip_suffix(suffix))
        .unwrap_or(lowered.as_str());
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|day| (1..=31).contains(day))
}

fn month_number(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let lowered = token.to_ascii_lowercase();
    if lowered.len() < 3 {
        return None;
    }
    let lowered = if lowered == "sept" { "sep".to_string() } else { lowered };
    MONTHS
        .iter()
        .position(|month| month.starts_with(lowered.as_str()))
        .and_then(|index| u32::try_from(index + 1).ok())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        check_window, parse_travel_date, validate_outbound, validate_return, DateRejection,
        DateSlot, SearchWindow,
    };

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid fixture date")
    }

    #[test]
    fn window_edges_follow_strict_future_and_day_359() {
        let today = date("2026-01-01");

        assert!(matches!(
            validate_outbound("2026-01-01", today),
            Err(DateRejection::NotInFuture { .. })
        ));
        assert_eq!(validate_outbound("2026-01-02", today), Ok(date("2026-01-02")));
        assert_eq!(validate_outbound("2026-12-26", today), Ok(date("2026-12-26")));
        assert!(matches!(
            validate_outbound("2026-12-27", today),
            Err(DateRejection::BeyondWindow { .. })
        ));
    }

    #[test]
    fn rejection_message_names_the_window() {
        let today = date("2026-01-01");
        let message = validate_outbound("2025-12-01", today).expect_err("past date").to_string();

        assert!(message.contains("strictly after today"));
        assert!(message.contains("between 2026-01-02 and 2026-12-26"));

        let message = validate_outbound("2027-06-01", today).expect_err("too far").to_string();
        assert!(message.contains("beyond the searchable window"));
    }

    #[test]
    fn partial_dates_resolve_to_next_future_occurrence() {
        let today = date("2026-10-16");

        assert_eq!(parse_travel_date(DateSlot::Outbound, "15 Dec", today), Ok(date("2026-12-15")));
        assert_eq!(parse_travel_date(DateSlot::Outbound, "Dec 15", today), Ok(date("2026-12-15")));
        assert_eq!(
            parse_travel_date(DateSlot::Outbound, "3rd March", today),
            Ok(date("2027-03-03"))
        );
        assert_eq!(
            parse_travel_date(DateSlot::Outbound, "October 16", today),
            Ok(date("2027-10-16")),
            "today itself rolls over to next year"
        );
        assert_eq!(
            parse_travel_date(DateSlot::Outbound, "Jan 5, 2027", today),
            Ok(date("2027-01-05"))
        );
    }

    #[test]
    fn garbage_and_impossible_dates_are_unparseable() {
        let today = date("2026-01-01");

        for input in ["next friday", "2026-02-30", "2026/03/01x", "31 Feb", "Dec", "2026-3-1"] {
            assert!(
                matches!(
                    parse_travel_date(DateSlot::Outbound, input, today),
                    Err(DateRejection::Unparseable { .. })
                ),
                "{input} should be unparseable"
            );
        }
    }

    #[test]
    fn return_date_must_follow_outbound() {
        let today = date("2026-01-01");
        let outbound = Some(date("2026-03-10"));

        let same_day = validate_return("2026-03-10", outbound, today).expect_err("same day");
        assert!(same_day.is_ordering());
        assert!(validate_return("2026-03-09", outbound, today).is_err());
        assert_eq!(validate_return("2026-03-11", outbound, today), Ok(date("2026-03-11")));
        assert_eq!(validate_return("2026-03-11", None, today), Ok(date("2026-03-11")));
    }

    #[test]
    fn window_helper_matches_check_window() {
        let today = date("2026-01-01");
        let window = SearchWindow::for_today(today);

        for candidate in ["2026-01-01", "2026-01-02", "2026-12-26", "2026-12-27"] {
            let day = date(candidate);
            assert_eq!(window.contains(day), check_window(DateSlot::Return, day, today).is_ok());
        }
    }
}
