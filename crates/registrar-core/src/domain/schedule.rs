//! Weekly schedule slots and the overlap rule

use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

/// Teaching day. Only weekdays are schedulable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    /// Parse a three-letter day code (`MON`..`FRI`, any case).
    ///
    /// # Errors
    ///
    /// Returns `InvalidDay` for anything else, including weekend days.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::from_str(value.trim()).map_err(|_| ValidationError::InvalidDay {
            value: value.to_string(),
        })
    }
}

/// Parse an `HH:MM` time of day.
///
/// # Errors
///
/// Returns `InvalidTime` when the value is not a valid 24h time.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidTime {
            value: value.to_string(),
        }
    })
}

/// Render a time of day as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// A weekly slot `[start, end)` on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// # Errors
    ///
    /// Returns `TimeOrder` unless `start < end`.
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::TimeOrder {
                start: format_time(start),
                end: format_time(end),
            });
        }
        Ok(Self { day, start, end })
    }

    #[must_use]
    pub const fn day(&self) -> Weekday {
        self.day
    }

    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Same day and the half-open intervals intersect.
    ///
    /// Back-to-back slots (`[09:00,10:00)` and `[10:00,11:00)`) do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;

    fn slot(day: Weekday, start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(
            day,
            parse_time(start).expect("valid start"),
            parse_time(end).expect("valid end"),
        )
        .expect("valid slot")
    }

    #[test]
    fn test_weekday_parse() {
        assert_eq!(Weekday::parse("MON").ok(), Some(Weekday::Mon));
        assert_eq!(Weekday::parse("fri").ok(), Some(Weekday::Fri));
        assert!(matches!(
            Weekday::parse("SAT"),
            Err(ValidationError::InvalidDay { .. })
        ));
        assert!(Weekday::parse("").is_err());
    }

    #[test]
    fn test_weekday_round_trips_through_display() {
        for day in Weekday::iter() {
            assert_eq!(Weekday::parse(&day.to_string()).ok(), Some(day));
        }
        assert_eq!(Weekday::Wed.as_ref(), "WED");
    }

    #[test]
    fn test_weekday_serializes_as_code() {
        let json = serde_json::to_string(&Weekday::Thu).expect("serialize");
        assert_eq!(json, "\"THU\"");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("09:30").map(format_time).ok(),
            Some("09:30".to_string())
        );
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_slot_requires_start_before_end() {
        let start = parse_time("16:00").expect("valid");
        let end = parse_time("15:00").expect("valid");
        assert!(matches!(
            TimeSlot::new(Weekday::Tue, start, end),
            Err(ValidationError::TimeOrder { .. })
        ));
        assert!(TimeSlot::new(Weekday::Tue, start, start).is_err());
    }

    #[test]
    fn test_overlapping_slots_conflict() {
        let a = slot(Weekday::Mon, "09:00", "10:30");
        let b = slot(Weekday::Mon, "10:00", "11:30");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_adjacent_slots_do_not_conflict() {
        let a = slot(Weekday::Mon, "09:00", "10:00");
        let b = slot(Weekday::Mon, "10:00", "11:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_different_days_do_not_conflict() {
        let a = slot(Weekday::Mon, "09:00", "10:30");
        let b = slot(Weekday::Tue, "09:00", "10:30");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_containment_conflicts() {
        let outer = slot(Weekday::Wed, "09:00", "12:00");
        let inner = slot(Weekday::Wed, "10:00", "11:00");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    fn minutes_to_time(minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).expect("in range")
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric_and_matches_interval_rule(
            a_start in 0u32..1380,
            a_len in 1u32..60,
            b_start in 0u32..1380,
            b_len in 1u32..60,
        ) {
            let a = TimeSlot::new(
                Weekday::Mon,
                minutes_to_time(a_start),
                minutes_to_time(a_start + a_len),
            ).expect("valid slot");
            let b = TimeSlot::new(
                Weekday::Mon,
                minutes_to_time(b_start),
                minutes_to_time(b_start + b_len),
            ).expect("valid slot");

            let expected = a_start < b_start + b_len && a_start + a_len > b_start;
            prop_assert_eq!(a.overlaps(&b), expected);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
