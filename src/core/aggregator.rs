use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::cost::calculator::{calculate_cache_savings, cost_of};
use crate::core::cost::pricing::{self, ModelKey};
use crate::core::models::report::{
    Aggregation, Period, ReportMode, ReportTimezone, Totals, UsageBucket,
};
use crate::core::models::usage::{TokenCounts, UsageEvent};

#[derive(Debug, Default)]
struct Accumulator {
    tokens: TokenCounts,
    requests: u64,
}

/// Folds usage events into per-model buckets for one report.
#[derive(Debug)]
pub struct Aggregator {
    mode: ReportMode,
    timezone: ReportTimezone,
    since: Option<DateTime<Utc>>,
    sums: HashMap<(ModelKey, Period), Accumulator>,
}

impl Aggregator {
    pub fn new(mode: ReportMode, timezone: ReportTimezone) -> Self {
        Self {
            mode,
            timezone,
            since: None,
            sums: HashMap::new(),
        }
    }

    /// Ignore events logged before `cutoff`.
    pub fn since(mut self, cutoff: DateTime<Utc>) -> Self {
        self.since = Some(cutoff);
        self
    }

    pub fn add(&mut self, event: &UsageEvent) {
        if self.since.is_some_and(|cutoff| event.timestamp < cutoff) {
            return;
        }

        let key = pricing::resolve(&event.model);
        let tokens = event.tokens();

        self.accumulate(key, Period::Overall, tokens);
        if let Some(period) = self.period_of(&event.timestamp) {
            self.accumulate(key, period, tokens);
        }
    }

    fn accumulate(&mut self, key: ModelKey, period: Period, tokens: TokenCounts) {
        let entry = self.sums.entry((key, period)).or_default();
        entry.tokens += tokens;
        entry.requests += 1;
    }

    fn period_of(&self, ts: &DateTime<Utc>) -> Option<Period> {
        let local = self.timezone.naive(ts);
        match self.mode {
            ReportMode::Summary => None,
            ReportMode::Hourly => Some(Period::Hour(hour_start(local))),
            ReportMode::Daily => Some(Period::Day(local.date())),
        }
    }

    /// Price every bucket, drop the empty ones and put the rest in display order.
    pub fn finish(self) -> Aggregation {
        let mut overall = Vec::new();
        let mut periods = Vec::new();

        for ((model, period), acc) in self.sums {
            if acc.tokens.is_empty() {
                continue;
            }
            let bucket = UsageBucket {
                model,
                period,
                tokens: acc.tokens,
                requests: acc.requests,
                cost: cost_of(model, &acc.tokens),
                cache_savings: calculate_cache_savings(model, acc.tokens.cache_read),
            };
            if period == Period::Overall {
                overall.push(bucket);
            } else {
                periods.push(bucket);
            }
        }

        overall.sort_by(display_order);
        periods.sort_by(display_order);
        let totals = Totals::of(&overall);

        Aggregation {
            mode: self.mode,
            overall,
            periods,
            totals,
        }
    }
}

/// Aggregate a whole event stream in one pass.
pub fn aggregate<'a>(
    events: impl IntoIterator<Item = &'a UsageEvent>,
    mode: ReportMode,
    timezone: ReportTimezone,
    since: Option<DateTime<Utc>>,
) -> Aggregation {
    let mut aggregator = Aggregator::new(mode, timezone);
    if let Some(cutoff) = since {
        aggregator = aggregator.since(cutoff);
    }
    for event in events {
        aggregator.add(event);
    }
    aggregator.finish()
}

/// Most expensive first, then by key name, then oldest period first.
pub fn display_order(a: &UsageBucket, b: &UsageBucket) -> Ordering {
    b.cost
        .partial_cmp(&a.cost)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.model.as_str().cmp(b.model.as_str()))
        .then_with(|| a.period.cmp(&b.period))
}

/// Earliest instant a report looks at, or `None` for no limit.
///
/// Hourly reports cover the current hour plus the `hours - 1` before it; daily reports cover
/// today plus the `days - 1` before it, with boundaries taken in `timezone`. A window reaching
/// past the calendar's range is unbounded.
pub fn window_start(
    mode: ReportMode,
    timezone: ReportTimezone,
    now: DateTime<Utc>,
    hours: u32,
    days: u32,
) -> Option<DateTime<Utc>> {
    let local = timezone.naive(&now);
    let start = match mode {
        ReportMode::Summary => return None,
        ReportMode::Hourly => {
            let back = Duration::try_hours(i64::from(hours.saturating_sub(1)))?;
            hour_start(local).checked_sub_signed(back)?
        }
        ReportMode::Daily => {
            let back = Duration::try_days(i64::from(days.saturating_sub(1)))?;
            let first_day = local.date().checked_sub_signed(back)?;
            first_day.and_hms_opt(0, 0, 0)?
        }
    };
    Some(timezone.to_utc(start))
}

fn hour_start(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_hms_opt(ts.hour(), 0, 0).unwrap_or(ts)
}
