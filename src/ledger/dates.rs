use std::fmt;

use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, Duration, OffsetDateTime};
use tracing::warn;

use crate::clock::Clock;

const KEY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none]");

/// "Yesterday" is taken as exactly this far behind now, not as the previous
/// calendar day.
const YESTERDAY_OFFSET_MS: i64 = 86_400_000;

/// A device-local calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(Date);

impl DateKey {
    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn date(self) -> Date {
        self.0
    }

    pub fn parse(raw: &str) -> Result<Self, time::error::Parse> {
        Date::parse(raw, KEY_FORMAT).map(Self)
    }

    /// Key for the device-local day `local` falls on.
    pub fn for_instant(local: OffsetDateTime) -> Self {
        Self(local.date())
    }

    pub fn today(clock: &dyn Clock) -> Self {
        Self::for_instant(clock.now())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl TryFrom<String> for DateKey {
    type Error = time::error::Parse;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl TryFrom<i64> for Direction {
    type Error = i64;

    fn try_from(step: i64) -> Result<Self, Self::Error> {
        match step {
            -1 => Ok(Self::Previous),
            1 => Ok(Self::Next),
            other => Err(other),
        }
    }
}

/// "Today", "Yesterday", or a short month/day label such as "Dec 25".
///
/// Yesterday is whatever local day the instant 24h before now falls on, so
/// the label can be off by one around a daylight-saving change.
pub fn display_label(key: DateKey, clock: &dyn Clock) -> String {
    let now = clock.now();
    if key == DateKey::for_instant(now) {
        return "Today".into();
    }
    let yesterday = clock.localize(now - Duration::milliseconds(YESTERDAY_OFFSET_MS));
    if key == DateKey::for_instant(yesterday) {
        return "Yesterday".into();
    }
    key.date().format(LABEL_FORMAT).unwrap_or_else(|e| {
        warn!(error = %e, date = %key, "date label formatting failed");
        key.to_string()
    })
}

/// Step one day from `current`. Steps past `today` are refused and leave the
/// date where it was; steps backwards are unbounded.
pub fn change_selected_date(current: DateKey, direction: Direction, today: DateKey) -> DateKey {
    let stepped = match direction {
        Direction::Previous => current.date().previous_day(),
        Direction::Next => current.date().next_day(),
    };
    match stepped {
        Some(date) if date <= today.date() => DateKey(date),
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use time::macros::{date, datetime};

    #[test]
    fn key_is_zero_padded() {
        let key = DateKey::from_date(date!(2024-01-05));
        assert_eq!(key.to_string(), "2024-01-05");
        assert_eq!(DateKey::parse("2024-01-05").unwrap(), key);
    }

    #[test]
    fn parse_rejects_loose_formats() {
        assert!(DateKey::parse("2024-1-5").is_err());
        assert!(DateKey::parse("2024-02-30").is_err());
        assert!(DateKey::parse("yesterday").is_err());
    }

    #[test]
    fn same_local_day_same_key() {
        let morning = datetime!(2024-06-01 00:00:01 +2);
        let night = datetime!(2024-06-01 23:59:59 +2);
        assert_eq!(DateKey::for_instant(morning), DateKey::for_instant(night));
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = DateKey::from_date(date!(2023-12-25));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2023-12-25\"");
        let back: DateKey = serde_json::from_str("\"2023-12-25\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DateKey>("\"12/25/2023\"").is_err());
    }

    #[test]
    fn labels_today_yesterday_and_older() {
        let clock = FixedClock(datetime!(2024-12-27 10:00 -8));
        let today = DateKey::today(&clock);
        assert_eq!(display_label(today, &clock), "Today");

        let yesterday = DateKey::from_date(date!(2024-12-26));
        assert_eq!(display_label(yesterday, &clock), "Yesterday");

        let christmas = DateKey::from_date(date!(2024-12-25));
        assert_eq!(display_label(christmas, &clock), "Dec 25");

        let early = DateKey::from_date(date!(2024-03-04));
        assert_eq!(display_label(early, &clock), "Mar 4");
    }

    #[test]
    fn label_just_after_midnight() {
        let clock = FixedClock(datetime!(2024-05-02 00:05 UTC));
        assert_eq!(display_label(DateKey::from_date(date!(2024-05-01)), &clock), "Yesterday");
        assert_eq!(display_label(DateKey::from_date(date!(2024-05-02)), &clock), "Today");
    }

    #[test]
    fn cannot_navigate_into_future() {
        let today = DateKey::from_date(date!(2024-07-10));
        assert_eq!(change_selected_date(today, Direction::Next, today), today);
    }

    #[test]
    fn back_then_forward_returns_to_today() {
        let today = DateKey::from_date(date!(2024-03-01));
        let back = change_selected_date(today, Direction::Previous, today);
        assert_eq!(back.to_string(), "2024-02-29");
        assert_eq!(change_selected_date(back, Direction::Next, today), today);
    }

    #[test]
    fn backwards_is_unbounded() {
        let today = DateKey::from_date(date!(2024-01-02));
        let mut key = today;
        for _ in 0..400 {
            key = change_selected_date(key, Direction::Previous, today);
        }
        assert_eq!(key.to_string(), "2022-11-28");
    }

    #[test]
    fn direction_from_step() {
        assert_eq!(Direction::try_from(-1), Ok(Direction::Previous));
        assert_eq!(Direction::try_from(1), Ok(Direction::Next));
        assert_eq!(Direction::try_from(0), Err(0));
        assert_eq!(Direction::try_from(2), Err(2));
    }
}
