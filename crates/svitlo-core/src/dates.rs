//! Calendar targeting: which `(day, month)` pairs count as today and tomorrow.

use crate::types::{Slot, SvitloError, SvitloResult};
use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};
use chrono_tz::Tz;

/// Ukrainian genitive month names, as they appear after a day number
/// ("26 грудня"), in calendar order.
pub const MONTHS_GENITIVE: [(&str, Month); 12] = [
    ("січня", Month::January),
    ("лютого", Month::February),
    ("березня", Month::March),
    ("квітня", Month::April),
    ("травня", Month::May),
    ("червня", Month::June),
    ("липня", Month::July),
    ("серпня", Month::August),
    ("вересня", Month::September),
    ("жовтня", Month::October),
    ("листопада", Month::November),
    ("грудня", Month::December),
];

/// Default civil timezone of the utility's schedules.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Kyiv;

/// Lowercase genitive name of a month.
pub fn month_genitive(month: Month) -> &'static str {
    MONTHS_GENITIVE[month.number_from_month() as usize - 1].0
}

/// Parse a genitive month name, ignoring case.
pub fn parse_month(name: &str) -> Option<Month> {
    let lower = name.to_lowercase();
    MONTHS_GENITIVE
        .iter()
        .find(|(genitive, _)| *genitive == lower)
        .map(|(_, month)| *month)
}

/// Month from a 1-based number.
pub fn month_from_number(number: u32) -> Option<Month> {
    let idx = usize::try_from(number).ok()?.checked_sub(1)?;
    MONTHS_GENITIVE.get(idx).map(|(_, month)| *month)
}

/// The two civil dates a cycle is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDates {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl TargetDates {
    /// Targets for a given local date. Tomorrow rolls over month and year ends.
    pub fn from_date(today: NaiveDate) -> Self {
        Self {
            today,
            tomorrow: today.succ_opt().unwrap_or(today),
        }
    }

    /// Slot whose date has exactly this day and month, if any.
    pub fn slot_for(&self, day: u32, month: Month) -> Option<Slot> {
        let matches = |date: &NaiveDate| {
            date.day() == day && date.month() == month.number_from_month()
        };
        if matches(&self.today) {
            Some(Slot::Today)
        } else if matches(&self.tomorrow) {
            Some(Slot::Tomorrow)
        } else {
            None
        }
    }

    pub fn date(&self, slot: Slot) -> NaiveDate {
        match slot {
            Slot::Today => self.today,
            Slot::Tomorrow => self.tomorrow,
        }
    }
}

/// Resolves target dates from an instant in a fixed civil timezone.
#[derive(Debug, Clone, Copy)]
pub struct DateResolver {
    tz: Tz,
}

impl DateResolver {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from an IANA name such as `Europe/Kyiv`.
    pub fn from_name(name: &str) -> SvitloResult<Self> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|_| SvitloError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local civil date of `now`.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    pub fn targets(&self, now: DateTime<Utc>) -> TargetDates {
        TargetDates::from_date(self.local_date(now))
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}
