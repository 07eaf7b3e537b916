use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{validation_error, Error};

const DATE_FORMATS: [&str; 4] = ["%b %d %Y", "%B %d %Y", "%d %b %Y", "%d %B %Y"];

/// A priced-ready search. Built once per search and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripSearch {
    pub stops: Vec<String>,
    pub date: String,
    pub guests: u32,
    pub distance_km: f64,
}

impl TripSearch {
    pub fn new(stops: Vec<String>, date: &str, guests: u32, distance_km: f64) -> Self {
        Self {
            stops,
            date: date.trim().into(),
            guests,
            distance_km,
        }
    }

    pub fn pickup(&self) -> Option<&str> {
        self.stops.first().map(String::as_str)
    }
}

/// Lower-cases, strips commas and trims a display date.
pub fn normalize_date(date: &str) -> String {
    date.to_lowercase().replace(',', "").trim().to_string()
}

/// Key used to decide whether two stop names are the same place.
pub fn stop_key(stop: &str) -> String {
    stop.to_lowercase().split_whitespace().collect()
}

pub fn validate_stops(stops: &[String]) -> Result<(), Error> {
    if stops.len() < 2 {
        return Err(validation_error("stops", "a route needs a pickup and a destination"));
    }

    if stops.iter().any(|stop| stop.trim().is_empty()) {
        return Err(validation_error("stops", "route stops must not be empty"));
    }

    if let [origin, destination] = stops {
        if stop_key(origin) == stop_key(destination) {
            return Err(validation_error("stops", "pickup and destination are the same place"));
        }
    }

    Ok(())
}

/// Parses the calendar day out of a display date, ignoring any time suffix.
pub fn parse_display_date(date: &str) -> Option<NaiveDate> {
    let cleaned = date.replace(',', " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    if let Some(first) = tokens.first() {
        if let Ok(day) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
            return Some(day);
        }
    }

    let head = tokens.get(..3)?.join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&head, format).ok())
}

/// Calendar day at `now` in the given zone.
pub fn local_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Rejects empty dates and dates before `today`. Free-form dates that do not
/// parse are let through.
pub fn validate_date(date: &str, today: NaiveDate) -> Result<(), Error> {
    if date.trim().is_empty() {
        return Err(validation_error("date", "date is required"));
    }

    match parse_display_date(date) {
        Some(day) if day < today => Err(validation_error("date", "date is in the past")),
        _ => Ok(()),
    }
}

pub fn validate_guests(guests: u32) -> Result<(), Error> {
    if guests == 0 {
        return Err(validation_error("guests", "at least one guest is required"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn normalizes_dates() {
        assert_eq!(normalize_date("  Oct 20, 2026 "), "oct 20 2026");
    }

    #[test]
    fn rejects_degenerate_routes() {
        assert!(validate_stops(&stops(&["Tbilisi"])).is_err());
        assert!(validate_stops(&stops(&["Tbilisi", " "])).is_err());
        assert!(validate_stops(&stops(&["Tbilisi", " tbi lisi "])).is_err());
        assert!(validate_stops(&stops(&["Tbilisi", "Gudauri"])).is_ok());
        // a round trip through a waypoint is fine
        assert!(validate_stops(&stops(&["Tbilisi", "Mtskheta", "Tbilisi"])).is_ok());
    }

    #[test]
    fn parses_display_dates() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 20);

        assert_eq!(parse_display_date("Oct 20, 2026"), expected);
        assert_eq!(parse_display_date("October 20, 2026 10:00"), expected);
        assert_eq!(parse_display_date("20 Oct 2026"), expected);
        assert_eq!(parse_display_date("2026-10-20"), expected);
        assert_eq!(parse_display_date("next tuesday"), None);
    }

    #[test]
    fn rejects_past_dates_only() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        assert!(validate_date("Oct 15, 2026", today).is_err());
        assert!(validate_date("Oct 16, 2026", today).is_ok());
        assert!(validate_date("sometime soon", today).is_ok());
        assert!(validate_date("", today).is_err());
    }

    #[test]
    fn yesterday_is_past_once_the_local_day_starts() {
        let tbilisi = FixedOffset::east_opt(4 * 3600).unwrap();
        // 01:30 on Oct 17 in Tbilisi, still Oct 16 in UTC
        let now = DateTime::parse_from_rfc3339("2026-10-16T21:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let today = local_today(now, tbilisi);
        assert_eq!(today, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert!(validate_date("Oct 16, 2026", today).is_err());
        assert!(validate_date("Oct 17, 2026", today).is_ok());
    }

    #[test]
    fn needs_at_least_one_guest() {
        assert!(validate_guests(0).unwrap_err().is_validation_error());
        assert!(validate_guests(1).is_ok());
    }
}
