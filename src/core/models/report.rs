use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::core::cost::pricing::ModelKey;
use crate::core::models::usage::TokenCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Summary,
    Hourly,
    Daily,
}

impl ReportMode {
    pub fn title(&self) -> &'static str {
        match self {
            ReportMode::Summary => "Summary",
            ReportMode::Hourly => "Hourly",
            ReportMode::Daily => "Daily",
        }
    }

    pub fn is_time_bucketed(&self) -> bool {
        !matches!(self, ReportMode::Summary)
    }
}

/// Clock used to cut events into hours and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTimezone {
    #[default]
    Local,
    Utc,
}

impl ReportTimezone {
    pub fn naive(&self, ts: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            ReportTimezone::Local => ts.with_timezone(&Local).naive_local(),
            ReportTimezone::Utc => ts.naive_utc(),
        }
    }

    /// Inverse of [`ReportTimezone::naive`]. Skipped local times (DST gaps) are read as UTC.
    pub fn to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            ReportTimezone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
            ReportTimezone::Utc => Utc.from_utc_datetime(&naive),
        }
    }
}

/// Time span a bucket covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Overall,
    /// Start of the hour.
    Hour(NaiveDateTime),
    Day(NaiveDate),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Overall => f.write_str("overall"),
            Period::Hour(start) => write!(f, "{}", start.format("%Y-%m-%d %H:00")),
            Period::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Totals for one (model key, period) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageBucket {
    pub model: ModelKey,
    pub period: Period,
    pub tokens: TokenCounts,
    pub requests: u64,
    pub cost: f64,
    pub cache_savings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub tokens: TokenCounts,
    pub requests: u64,
    pub cost: f64,
    pub cache_savings: f64,
}

impl Totals {
    pub fn of<'a>(buckets: impl IntoIterator<Item = &'a UsageBucket>) -> Self {
        let mut totals = Totals::default();
        for b in buckets {
            totals.tokens += b.tokens;
            totals.requests += b.requests;
            totals.cost += b.cost;
            totals.cache_savings += b.cache_savings;
        }
        totals
    }
}

/// Finished aggregation for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub mode: ReportMode,
    /// One bucket per model over the whole window, in display order.
    pub overall: Vec<UsageBucket>,
    /// Hour or day buckets in display order; empty in summary mode.
    pub periods: Vec<UsageBucket>,
    pub totals: Totals,
}

impl Aggregation {
    pub fn empty(mode: ReportMode) -> Self {
        Self {
            mode,
            overall: Vec::new(),
            periods: Vec::new(),
            totals: Totals::default(),
        }
    }
}
