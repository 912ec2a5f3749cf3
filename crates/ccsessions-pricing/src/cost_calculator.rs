//! Cost calculator module for computing session costs
//!
//! Pricing is a fixed table of three tiers. A model identifier selects its tier by
//! case-insensitive substring match, and a session's cost is the per-million rate
//! of each token class applied to its token counts.
//!
//! # Examples
//!
//! ```
//! use ccsessions_core::types::{ModelName, TokenCounts};
//! use ccsessions_pricing::{CostCalculator, PricingTier};
//!
//! let tokens = TokenCounts::new(1_000_000, 1_000_000, 0, 0);
//! let cost = CostCalculator::calculate_cost(&tokens, &ModelName::new("claude-opus-4-6"));
//! assert!((cost - 30.0).abs() < 1e-9);
//!
//! assert_eq!(PricingTier::for_model("claude-3-5-haiku"), PricingTier::HAIKU);
//! ```

use ccsessions_core::types::{ModelName, TokenCounts};
use tracing::debug;

const TOKENS_PER_UNIT: f64 = 1_000_000.0;

/// Cache reads are billed at this fraction of the input rate
const CACHE_READ_MULTIPLIER: f64 = 0.1;

/// Cache writes are billed at this multiple of the input rate
const CACHE_WRITE_MULTIPLIER: f64 = 1.25;

/// Per-million-token USD rates for one model family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingTier {
    /// Tier name as shown to users
    pub name: &'static str,
    /// USD per million input tokens
    pub input_per_million: f64,
    /// USD per million output tokens
    pub output_per_million: f64,
}

impl PricingTier {
    pub const OPUS: PricingTier = PricingTier {
        name: "Opus",
        input_per_million: 5.0,
        output_per_million: 25.0,
    };

    pub const SONNET: PricingTier = PricingTier {
        name: "Sonnet",
        input_per_million: 3.0,
        output_per_million: 15.0,
    };

    pub const HAIKU: PricingTier = PricingTier {
        name: "Haiku",
        input_per_million: 1.0,
        output_per_million: 5.0,
    };

    /// Select the tier for a model identifier
    ///
    /// Matching is a case-insensitive substring test checked in the order
    /// opus, sonnet, haiku. Anything else, including an empty identifier,
    /// is priced as Sonnet.
    pub fn for_model(model: &str) -> PricingTier {
        let lower = model.to_lowercase();
        if lower.contains("opus") {
            Self::OPUS
        } else if lower.contains("sonnet") {
            Self::SONNET
        } else if lower.contains("haiku") {
            Self::HAIKU
        } else {
            Self::SONNET
        }
    }

    /// USD per million cache-read tokens
    pub fn cache_read_per_million(&self) -> f64 {
        self.input_per_million * CACHE_READ_MULTIPLIER
    }

    /// USD per million cache-write tokens
    pub fn cache_write_per_million(&self) -> f64 {
        self.input_per_million * CACHE_WRITE_MULTIPLIER
    }
}

/// Computes USD cost from token usage
pub struct CostCalculator;

impl CostCalculator {
    /// Calculate the cost of `tokens` under the tier selected by `model_name`
    ///
    /// The result is not rounded.
    pub fn calculate_cost(tokens: &TokenCounts, model_name: &ModelName) -> f64 {
        let tier = PricingTier::for_model(model_name.as_str());
        Self::calculate_from_tier(tokens, &tier)
    }

    /// Calculate cost from an explicit tier
    pub fn calculate_from_tier(tokens: &TokenCounts, tier: &PricingTier) -> f64 {
        let weighted = tokens.input_tokens as f64 * tier.input_per_million
            + tokens.output_tokens as f64 * tier.output_per_million
            + tokens.cache_read_tokens as f64 * tier.cache_read_per_million()
            + tokens.cache_creation_tokens as f64 * tier.cache_write_per_million();
        let cost = weighted / TOKENS_PER_UNIT;

        debug!(
            "Calculated cost: ${:.6} for {} total tokens ({} tier)",
            cost,
            tokens.total(),
            tier.name
        );

        cost
    }
}
