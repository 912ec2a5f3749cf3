//! Cost calculation for ccsessions
//!
//! This crate maps model identifiers to fixed pricing tiers and computes the
//! estimated USD cost of a session's token usage. It never touches the network.

pub mod cost_calculator;

pub use cost_calculator::{CostCalculator, PricingTier};
