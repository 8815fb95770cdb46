//! Request filters.
//!
//! Parsing is permissive: anything unrecognised falls back to "all", the
//! default date range, or page 1 instead of being rejected.

use serde::{Deserialize, Serialize};
use transcript_store::{BotType, BusinessUnit, Context};

/// Raw query-string parameters as sent by the dashboard.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilterParams {
    pub office: Option<String>,
    pub bot: Option<String>,
    pub range: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Requested date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatePreset {
    #[serde(rename = "today")]
    Today,
    /// The configured default range (seven days unless overridden).
    #[serde(rename = "7d")]
    DefaultRange,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "custom")]
    Custom,
}

impl DatePreset {
    /// Parse a preset code; unknown codes select the default range.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("today") => DatePreset::Today,
            Some("30d") => DatePreset::Last30Days,
            Some("custom") => DatePreset::Custom,
            _ => DatePreset::DefaultRange,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::DefaultRange => "7d",
            DatePreset::Last30Days => "30d",
            DatePreset::Custom => "custom",
        }
    }
}

/// A normalised dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// `None` selects every business unit.
    pub unit: Option<BusinessUnit>,
    /// `None` selects every bot type.
    pub bot: Option<BotType>,
    pub preset: DatePreset,
    /// Custom lower bound (`YYYY-MM-DD`), kept only for [`DatePreset::Custom`].
    pub from: Option<String>,
    /// Custom upper bound (`YYYY-MM-DD`, inclusive), kept only for [`DatePreset::Custom`].
    pub to: Option<String>,
    /// Case-insensitive session-id substring.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            unit: None,
            bot: None,
            preset: DatePreset::DefaultRange,
            from: None,
            to: None,
            search: None,
            page: 1,
        }
    }
}

impl From<FilterParams> for Filter {
    fn from(params: FilterParams) -> Self {
        let preset = DatePreset::from_code(params.range.as_deref());
        let custom = preset == DatePreset::Custom;

        Self {
            unit: params.office.as_deref().and_then(BusinessUnit::from_code),
            bot: params.bot.as_deref().and_then(BotType::from_code),
            preset,
            from: params.from.filter(|_| custom).and_then(non_empty),
            to: params.to.filter(|_| custom).and_then(non_empty),
            search: params.q.and_then(non_empty),
            page: parse_page(params.page.as_deref()),
        }
    }
}

impl Filter {
    /// Whether `context` belongs to the selected unit and bot.
    pub fn matches(&self, context: &Context) -> bool {
        self.unit.map_or(true, |unit| unit == context.unit())
            && self.bot.map_or(true, |bot| bot == context.bot())
    }

    /// Query-string code of the unit filter.
    pub fn unit_code(&self) -> &'static str {
        self.unit.map_or("all", |unit| unit.code())
    }

    /// Query-string code of the bot filter.
    pub fn bot_code(&self) -> &'static str {
        self.bot.map_or("all", |bot| bot.code())
    }
}

/// Parse a page number; anything that is not a number of at least one is page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|page| page.is_finite() && *page >= 1.0)
        .map(|page| page.floor().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(1)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
