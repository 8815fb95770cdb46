//! Date-range presets to concrete UTC windows.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use transcript_store::TimeWindow;

use crate::filter::{DatePreset, Filter};
use crate::settings::clamp_range_days;

/// Resolves a [`Filter`]'s date range against a reference instant.
///
/// Day boundaries are local midnights of the display timezone: the reference
/// instant is projected into that zone to find "today", and the local
/// midnight of that date is converted back to UTC.
#[derive(Debug, Clone, Copy)]
pub struct WindowResolver {
    offset: FixedOffset,
    default_days: i64,
}

impl WindowResolver {
    pub fn new(offset: FixedOffset, default_days: i64) -> Self {
        Self {
            offset,
            default_days: clamp_range_days(default_days),
        }
    }

    /// Resolve the filter's preset into a half-open `[start, end)` window.
    ///
    /// Custom bounds are taken as plain calendar dates at UTC midnight, and
    /// the `to` day is included whole. A custom preset missing either bound
    /// falls back to the default range.
    pub fn resolve(&self, filter: &Filter, now: DateTime<Utc>) -> TimeWindow {
        if filter.preset == DatePreset::Custom {
            if let (Some(from), Some(to)) = (filter.from.as_deref(), filter.to.as_deref()) {
                return self.custom(from, to, now);
            }
        }

        let start_of_today = self.start_of_local_day(self.local_date(now));
        let tomorrow = start_of_today + Duration::days(1);

        match filter.preset {
            DatePreset::Today => TimeWindow::new(start_of_today, tomorrow),
            DatePreset::Last30Days => TimeWindow::new(days_before(tomorrow, 30), tomorrow),
            DatePreset::DefaultRange | DatePreset::Custom => {
                TimeWindow::new(days_before(tomorrow, self.default_days), tomorrow)
            }
        }
    }

    fn custom(&self, from: &str, to: &str, now: DateTime<Utc>) -> TimeWindow {
        let today = self.local_date(now);
        let from = parse_date(from).unwrap_or(today);
        let to = parse_date(to).unwrap_or(today);
        let (first, last) = if to < from {
            (to, from)
        } else {
            (from, to)
        };

        let end = utc_midnight(last)
            .checked_add_signed(Duration::days(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        TimeWindow::new(utc_midnight(first), end)
    }

    /// Calendar date of `instant` in the display timezone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// UTC instant of local midnight on `date`.
    pub fn start_of_local_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc = local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// `end` minus `days`, saturating at the earliest representable instant.
fn days_before(end: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
