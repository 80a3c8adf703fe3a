use crate::core::cost::parser::UsageRecord;

/// Dollars per million tokens for one pricing tier.
#[derive(Debug, Clone, Copy)]
pub struct PricingTier {
    pub fragment: &'static str,
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

/// Cache reads bill at a tenth of the input rate.
pub const CACHE_READ_DISCOUNT: f64 = 0.1;

/// Checked in order; first case-insensitive substring match wins.
static PRICING_TIERS: &[PricingTier] = &[
    PricingTier {
        fragment: "opus",
        input_per_mtok: 15.0,
        output_per_mtok: 75.0,
    },
    PricingTier {
        fragment: "haiku",
        input_per_mtok: 0.25,
        output_per_mtok: 1.25,
    },
];

/// Fallback for unrecognized model identifiers (Sonnet rates).
static DEFAULT_TIER: PricingTier = PricingTier {
    fragment: "",
    input_per_mtok: 3.0,
    output_per_mtok: 15.0,
};

/// Look up (input, output) prices per million tokens. Total function: an
/// unknown model falls back to the default tier.
pub fn price_for(model: &str) -> (f64, f64) {
    let lowered = model.to_lowercase();
    let tier = PRICING_TIERS
        .iter()
        .find(|t| lowered.contains(t.fragment))
        .unwrap_or(&DEFAULT_TIER);
    (tier.input_per_mtok, tier.output_per_mtok)
}

/// Dollar cost of one usage record. Cache-creation tokens bill at the input
/// rate, cache reads at the discounted input rate.
pub fn record_cost(record: &UsageRecord) -> f64 {
    let (input_price, output_price) = price_for(&record.model);
    (record.input_tokens + record.cache_creation_tokens) / 1e6 * input_price
        + record.cache_read_tokens / 1e6 * input_price * CACHE_READ_DISCOUNT
        + record.output_tokens / 1e6 * output_price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_for_opus_tier() {
        let (input, output) = price_for("claude-opus-4-20250514");
        assert!((input - 15.0).abs() < f64::EPSILON);
        assert!((output - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_for_haiku_tier() {
        let (input, output) = price_for("claude-3-5-haiku-latest");
        assert!((input - 0.25).abs() < f64::EPSILON);
        assert!((output - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn price_for_is_case_insensitive() {
        assert_eq!(price_for("Claude-OPUS-4"), price_for("claude-opus-4"));
    }

    #[test]
    fn price_for_unknown_falls_back_to_default() {
        let (input, output) = price_for("some-other-model");
        assert!((input - 3.0).abs() < f64::EPSILON);
        assert!((output - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_for_sonnet_matches_default() {
        assert_eq!(price_for("claude-sonnet-4-5"), price_for(""));
    }

    #[test]
    fn record_cost_applies_cache_read_discount() {
        // 1M input + 1M cache-read + 1M output on the opus tier:
        // 15 + 15*0.1 + 75 = 91.5
        let record = UsageRecord {
            model: "claude-opus-4".to_string(),
            input_tokens: 1_000_000.0,
            output_tokens: 1_000_000.0,
            cache_creation_tokens: 0.0,
            cache_read_tokens: 1_000_000.0,
        };
        assert!((record_cost(&record) - 91.5).abs() < 1e-9);
    }

    #[test]
    fn record_cost_bills_cache_creation_at_input_rate() {
        let record = UsageRecord {
            model: "claude-opus-4".to_string(),
            input_tokens: 500_000.0,
            output_tokens: 0.0,
            cache_creation_tokens: 500_000.0,
            cache_read_tokens: 0.0,
        };
        assert!((record_cost(&record) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn record_cost_unknown_model_uses_default_rates() {
        let record = UsageRecord {
            model: "mystery".to_string(),
            input_tokens: 1_000_000.0,
            output_tokens: 1_000_000.0,
            cache_creation_tokens: 0.0,
            cache_read_tokens: 0.0,
        };
        assert!((record_cost(&record) - 18.0).abs() < 1e-9);
    }
}
