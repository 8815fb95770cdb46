//! Engine tuning knobs.

use chrono::{Duration, FixedOffset, Offset, Utc};

/// Settings the aggregation engine reads on every request.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Fixed display timezone used for day boundaries.
    pub display_offset: FixedOffset,
    /// Age after which an unanswered human message marks its session pending.
    pub pending_threshold: Duration,
    /// Length of the fallback date-range preset, in days.
    pub default_range_days: i64,
    /// Rows in the dashboard's recent-session and pending lists.
    pub dashboard_page_size: usize,
    /// Rows per page of the session listing.
    pub listing_page_size: usize,
    /// Human messages scanned per context for token frequency.
    pub token_scan_cap: i64,
    /// Number of tokens reported.
    pub top_token_count: usize,
    /// Maximum messages returned for one session.
    pub message_cap: i64,
    /// Message count above which a session needs attention.
    pub busy_session_threshold: i64,
}

impl EngineSettings {
    pub const DEFAULT_PENDING_MINUTES: i64 = 2;
    pub const DEFAULT_RANGE_DAYS: i64 = 7;
    /// Upper bound for the fallback range, about a century.
    pub const MAX_RANGE_DAYS: i64 = 36_500;
    /// Upper bound for the pending threshold, the same century in minutes.
    pub const MAX_PENDING_MINUTES: i64 = Self::MAX_RANGE_DAYS * 24 * 60;
    /// Asia/Jakarta, which has no daylight saving.
    pub const DEFAULT_OFFSET_SECONDS: i32 = 7 * 3600;

    /// Set the pending threshold, clamped to `1..=MAX_PENDING_MINUTES`.
    pub fn with_pending_threshold_minutes(mut self, minutes: i64) -> Self {
        self.pending_threshold = Duration::minutes(minutes.clamp(1, Self::MAX_PENDING_MINUTES));
        self
    }

    /// Set the fallback range; non-positive values fall back to seven days
    /// and anything longer than `MAX_RANGE_DAYS` is cut to it.
    pub fn with_default_range_days(mut self, days: i64) -> Self {
        self.default_range_days = clamp_range_days(days);
        self
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }
}

pub(crate) fn clamp_range_days(days: i64) -> i64 {
    if days > 0 {
        days.min(EngineSettings::MAX_RANGE_DAYS)
    } else {
        EngineSettings::DEFAULT_RANGE_DAYS
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            display_offset: FixedOffset::east_opt(Self::DEFAULT_OFFSET_SECONDS)
                .unwrap_or_else(|| Utc.fix()),
            pending_threshold: Duration::minutes(Self::DEFAULT_PENDING_MINUTES),
            default_range_days: Self::DEFAULT_RANGE_DAYS,
            dashboard_page_size: 20,
            listing_page_size: 50,
            token_scan_cap: 5000,
            top_token_count: 10,
            message_cap: 1000,
            busy_session_threshold: 20,
        }
    }
}
