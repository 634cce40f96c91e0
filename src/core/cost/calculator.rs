use crate::core::cost::pricing::ModelKey;
use crate::core::models::usage::TokenCounts;

const PER_MILLION: f64 = 1_000_000.0;

/// Cost in USD of the given token counts at the key's unit prices.
pub fn calculate_cost(
    key: ModelKey,
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: u64,
    cache_write_tokens: u64,
) -> f64 {
    let p = key.pricing();
    (input_tokens as f64 / PER_MILLION) * p.input
        + (output_tokens as f64 / PER_MILLION) * p.output
        + (cache_read_tokens as f64 / PER_MILLION) * p.cache_read
        + (cache_write_tokens as f64 / PER_MILLION) * p.cache_write
}

/// What the cache reads would have cost extra had they been billed as plain input.
pub fn calculate_cache_savings(key: ModelKey, cache_read_tokens: u64) -> f64 {
    let p = key.pricing();
    (cache_read_tokens as f64 / PER_MILLION) * (p.input - p.cache_read)
}

pub fn cost_of(key: ModelKey, tokens: &TokenCounts) -> f64 {
    calculate_cost(
        key,
        tokens.input,
        tokens.output,
        tokens.cache_read,
        tokens.cache_write,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn opus_4_5_each_kind() {
        assert!(approx(calculate_cost(ModelKey::Opus45, 1_000_000, 0, 0, 0), 5.0));
        assert!(approx(calculate_cost(ModelKey::Opus45, 0, 1_000_000, 0, 0), 25.0));
        assert!(approx(calculate_cost(ModelKey::Opus45, 0, 0, 1_000_000, 0), 0.5));
        assert!(approx(calculate_cost(ModelKey::Opus45, 0, 0, 0, 1_000_000), 6.25));
    }

    #[test]
    fn sonnet_4_5_input_and_output() {
        let cost = calculate_cost(ModelKey::Sonnet45, 1_000_000, 1_000_000, 0, 0);
        assert!(approx(cost, 18.0));
    }

    #[test]
    fn legacy_opus_is_three_times_current() {
        let legacy = calculate_cost(ModelKey::Opus, 1_000_000, 1_000_000, 0, 0);
        let current = calculate_cost(ModelKey::Opus45, 1_000_000, 1_000_000, 0, 0);
        assert!(approx(legacy, current * 3.0));
    }

    #[test]
    fn small_counts_are_not_rounded() {
        let cost = calculate_cost(ModelKey::Haiku, 1, 0, 0, 0);
        assert!(approx(cost, 0.25 / 1_000_000.0));
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        assert_eq!(calculate_cost(ModelKey::Opus, 0, 0, 0, 0), 0.0);
        assert_eq!(calculate_cache_savings(ModelKey::Opus, 0), 0.0);
    }

    #[test]
    fn cache_savings_opus_4_5() {
        assert!(approx(calculate_cache_savings(ModelKey::Opus45, 1_000_000), 4.5));
    }

    #[test]
    fn cache_savings_sonnet_4_5() {
        assert!(approx(calculate_cache_savings(ModelKey::Sonnet45, 1_000_000), 2.7));
    }

    #[test]
    fn cost_of_matches_calculate_cost() {
        let tokens = TokenCounts {
            input: 1_000_000,
            output: 100_000,
            cache_read: 500_000,
            cache_write: 50_000,
        };
        // 3.0 + 1.5 + 0.15 + 0.1875
        assert!(approx(cost_of(ModelKey::Sonnet45, &tokens), 4.8375));
    }
}
