use serde::Serialize;
use std::fmt;

/// Price tier a model is billed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKey {
    #[serde(rename = "opus-4-5")]
    Opus45,
    #[serde(rename = "sonnet-4-5")]
    Sonnet45,
    #[serde(rename = "haiku-4-5")]
    Haiku45,
    Opus,
    Sonnet,
    Haiku,
}

impl ModelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::Opus45 => "opus-4-5",
            ModelKey::Sonnet45 => "sonnet-4-5",
            ModelKey::Haiku45 => "haiku-4-5",
            ModelKey::Opus => "opus",
            ModelKey::Sonnet => "sonnet",
            ModelKey::Haiku => "haiku",
        }
    }

    pub fn pricing(&self) -> &'static PricingEntry {
        PRICING_TABLE
            .iter()
            .find(|p| p.key == *self)
            .map(|p| &p.entry)
            .unwrap_or(&DEFAULT_PRICING)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit prices in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingEntry {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

struct PricedModel {
    key: ModelKey,
    entry: PricingEntry,
}

const DEFAULT_PRICING: PricingEntry = PricingEntry {
    input: 3.0,
    output: 15.0,
    cache_write: 3.75,
    cache_read: 0.30,
};

static PRICING_TABLE: &[PricedModel] = &[
    PricedModel {
        key: ModelKey::Opus45,
        entry: PricingEntry {
            input: 5.0,
            output: 25.0,
            cache_write: 6.25,
            cache_read: 0.50,
        },
    },
    PricedModel {
        key: ModelKey::Sonnet45,
        entry: PricingEntry {
            input: 3.0,
            output: 15.0,
            cache_write: 3.75,
            cache_read: 0.30,
        },
    },
    PricedModel {
        key: ModelKey::Haiku45,
        entry: PricingEntry {
            input: 1.0,
            output: 5.0,
            cache_write: 1.25,
            cache_read: 0.10,
        },
    },
    PricedModel {
        key: ModelKey::Opus,
        entry: PricingEntry {
            input: 15.0,
            output: 75.0,
            cache_write: 18.75,
            cache_read: 1.50,
        },
    },
    PricedModel {
        key: ModelKey::Sonnet,
        entry: DEFAULT_PRICING,
    },
    PricedModel {
        key: ModelKey::Haiku,
        entry: PricingEntry {
            input: 0.25,
            output: 1.25,
            cache_write: 0.30,
            cache_read: 0.03,
        },
    },
];

/// Substrings marking a 4.5-generation model.
const GENERATION_MARKERS: &[&str] = &["4-5", "4.5"];

/// One row of the resolution table: a size marker and the keys it selects.
/// A row without a marker matches every name.
struct SizeRule {
    marker: Option<&'static str>,
    current: ModelKey,
    legacy: ModelKey,
}

/// Checked top to bottom; the last row is the catch-all.
static SIZE_RULES: &[SizeRule] = &[
    SizeRule {
        marker: Some("opus"),
        current: ModelKey::Opus45,
        legacy: ModelKey::Opus,
    },
    SizeRule {
        marker: Some("haiku"),
        current: ModelKey::Haiku45,
        legacy: ModelKey::Haiku,
    },
    SizeRule {
        marker: None,
        current: ModelKey::Sonnet45,
        legacy: ModelKey::Sonnet,
    },
];

/// Map a free-form model name onto the price tier it is billed at.
/// Examples:
///   "claude-opus-4-5-20251101" -> opus-4-5
///   "claude-3-opus-20240229"   -> opus
///   "unknown-model"            -> sonnet
pub fn resolve(model_name: &str) -> ModelKey {
    let name = model_name.to_lowercase();
    let is_current = GENERATION_MARKERS.iter().any(|m| name.contains(m));

    let rule = SIZE_RULES
        .iter()
        .find(|r| r.marker.map_or(true, |m| name.contains(m)))
        .unwrap_or(&SIZE_RULES[SIZE_RULES.len() - 1]);

    if is_current {
        rule.current
    } else {
        rule.legacy
    }
}
