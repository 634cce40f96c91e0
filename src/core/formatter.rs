use num_format::{Locale, ToFormattedString};

use crate::core::error::ReportError;

const COST_SUFFIX: &str = " USD";

/// Token magnitude thresholds, largest first. Anything below a million is shown in thousands.
const TOKEN_UNITS: &[(u64, &str)] = &[
    (1_000_000_000_000, " Ttok"),
    (1_000_000_000, " Gtok"),
    (1_000_000, " Mtok"),
    (1_000, " Ktok"),
];

/// Returns a token count in exactly `width` characters, right-aligned with one decimal,
/// e.g. `format_tokens_fixed(15_500_000, 10)` -> `" 15.5 Mtok"`.
pub fn format_tokens_fixed(n: u64, width: usize) -> Result<String, ReportError> {
    let (divisor, unit) = TOKEN_UNITS
        .iter()
        .find(|(threshold, _)| n >= *threshold)
        .copied()
        .unwrap_or(TOKEN_UNITS[TOKEN_UNITS.len() - 1]);

    let field = width
        .checked_sub(unit.len())
        .ok_or(ReportError::FieldTooNarrow {
            width,
            suffix: unit,
        })?;

    let value = n as f64 / divisor as f64;
    Ok(format!("{}{}", fit_number(value, 1, field), unit))
}

/// Returns a cost in exactly `width` characters: two decimals, right-aligned, `" USD"` suffix.
pub fn format_cost_fixed(cost: f64, width: usize) -> Result<String, ReportError> {
    let field = width
        .checked_sub(COST_SUFFIX.len())
        .ok_or(ReportError::FieldTooNarrow {
            width,
            suffix: COST_SUFFIX,
        })?;
    Ok(format!("{}{}", fit_number(cost, 2, field), COST_SUFFIX))
}

/// Returns "1,234.56 USD" for amounts of a thousand or more, "123.45 USD" below.
pub fn format_usd(amount: f64) -> String {
    let plain = format!("{:.2}", amount);
    if amount < 1000.0 {
        return format!("{}{}", plain, COST_SUFFIX);
    }
    let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    match whole.parse::<u64>() {
        Ok(w) => format!("{}.{}{}", w.to_formatted_string(&Locale::en), frac, COST_SUFFIX),
        Err(_) => format!("{}{}", plain, COST_SUFFIX),
    }
}

/// Right-align `value` in `field` columns. A value too long for the field drops its decimals,
/// and if it still does not fit the field is filled with `#`.
fn fit_number(value: f64, decimals: usize, field: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    if text.len() <= field {
        return format!("{:>field$}", text);
    }
    let whole = format!("{:.0}", value);
    if whole.len() <= field {
        return format!("{:>field$}", whole);
    }
    "#".repeat(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(n: u64) -> String {
        format_tokens_fixed(n, 10).unwrap()
    }

    fn cost(c: f64) -> String {
        format_cost_fixed(c, 10).unwrap()
    }

    #[test]
    fn tokens_ttok() {
        assert_eq!(tok(1_500_000_000_000), "  1.5 Ttok");
        assert_eq!(tok(15_000_000_000_000), " 15.0 Ttok");
    }

    #[test]
    fn tokens_gtok() {
        assert_eq!(tok(1_500_000_000), "  1.5 Gtok");
        assert_eq!(tok(15_000_000_000), " 15.0 Gtok");
    }

    #[test]
    fn tokens_mtok() {
        assert_eq!(tok(309_500_000), "309.5 Mtok");
        assert_eq!(tok(15_500_000), " 15.5 Mtok");
        assert_eq!(tok(1_000_000), "  1.0 Mtok");
    }

    #[test]
    fn tokens_below_a_million_use_ktok() {
        assert_eq!(tok(89_000), " 89.0 Ktok");
        assert_eq!(tok(625_000), "625.0 Ktok");
        assert_eq!(tok(1_000), "  1.0 Ktok");
        assert_eq!(tok(500), "  0.5 Ktok");
        assert_eq!(tok(1), "  0.0 Ktok");
        assert_eq!(tok(0), "  0.0 Ktok");
    }

    #[test]
    fn tokens_unit_boundaries() {
        assert!(tok(999_999).ends_with("Ktok"));
        assert!(tok(999_999_999).ends_with("Mtok"));
        assert!(tok(999_999_999_999).ends_with("Gtok"));
        assert!(tok(u64::MAX).ends_with("Ttok"));
    }

    #[test]
    fn tokens_always_exact_width() {
        let samples = [
            0,
            1,
            999,
            999_949,
            999_999,
            1_000_000,
            123_456_789,
            999_999_999_999,
            1_000_000_000_000_000,
            u64::MAX,
        ];
        for width in [5, 8, 10, 12, 20] {
            for n in samples {
                let s = format_tokens_fixed(n, width).unwrap();
                assert_eq!(s.chars().count(), width, "n={} width={} -> {:?}", n, width, s);
            }
        }
    }

    #[test]
    fn tokens_rounding_past_field_drops_decimals() {
        // 999.999 rounds to "1000.0", one column too many for a 10-wide field
        assert_eq!(tok(999_999), " 1000 Ktok");
    }

    #[test]
    fn tokens_width_too_small_for_suffix() {
        assert_eq!(
            format_tokens_fixed(1, 4),
            Err(ReportError::FieldTooNarrow {
                width: 4,
                suffix: " Ktok"
            })
        );
        assert_eq!(format_tokens_fixed(1, 5).unwrap(), " Ktok");
    }

    #[test]
    fn cost_fixed_width() {
        assert_eq!(cost(464.22), "464.22 USD");
        assert_eq!(cost(1.33), "  1.33 USD");
        assert_eq!(cost(0.01), "  0.01 USD");
        assert_eq!(cost(99.99), " 99.99 USD");
        assert_eq!(cost(0.0), "  0.00 USD");
    }

    #[test]
    fn cost_too_large_for_field() {
        assert_eq!(cost(12345.678), " 12346 USD");
        assert_eq!(cost(1e12), "###### USD");
    }

    #[test]
    fn cost_width_too_small_for_suffix() {
        assert!(matches!(
            format_cost_fixed(1.0, 3),
            Err(ReportError::FieldTooNarrow { width: 3, .. })
        ));
    }

    #[test]
    fn usd_with_separators() {
        assert_eq!(format_usd(1234.56), "1,234.56 USD");
        assert_eq!(format_usd(9999.99), "9,999.99 USD");
        assert_eq!(format_usd(1_234_567.5), "1,234,567.50 USD");
        assert_eq!(format_usd(1000.0), "1,000.00 USD");
    }

    #[test]
    fn usd_without_separators() {
        assert_eq!(format_usd(123.45), "123.45 USD");
        assert_eq!(format_usd(0.01), "0.01 USD");
        assert_eq!(format_usd(0.0), "0.00 USD");
    }
}
