//! Property-based tests for ccsessions
//!
//! These tests check invariants of the parser, the text helpers and the cost
//! model over generated inputs.

use ccsessions::model_formatter::short_model_name;
use ccsessions::types::{ModelName, SessionId, TokenCounts};
use ccsessions_pricing::CostCalculator;
use ccsessions_provider_claude::sanitize::{sanitize, truncate};
use ccsessions_provider_claude::{ProjectResolver, SessionParser};
use proptest::prelude::*;
use serde_json::json;

fn arb_token_counts() -> impl Strategy<Value = TokenCounts> {
    (0u64..10_000_000, 0u64..10_000_000, 0u64..10_000_000, 0u64..10_000_000)
        .prop_map(|(i, o, cc, cr)| TokenCounts::new(i, o, cc, cr))
}

fn arb_model() -> impl Strategy<Value = ModelName> {
    prop::sample::select(vec![
        "claude-opus-4-6",
        "claude-sonnet-4-5-20250929",
        "claude-3-5-haiku-20241022",
        "gpt-4",
        "",
    ])
    .prop_map(ModelName::new)
}

/// A log with one user message and one assistant record per usage pair
fn log_with_usage(usage: &[(u64, u64)]) -> String {
    let mut lines = vec![
        json!({
            "type": "user",
            "timestamp": "2024-05-01T09:00:00Z",
            "message": { "content": "Summarize the logs" },
        })
        .to_string(),
    ];
    for (index, (input, output)) in usage.iter().enumerate() {
        lines.push(
            json!({
                "type": "assistant",
                "timestamp": format!("2024-05-01T09:{:02}:00Z", index % 60),
                "message": {
                    "model": "claude-sonnet-4-5",
                    "usage": { "input_tokens": input, "output_tokens": output },
                    "content": [{ "type": "tool_use", "name": "Read", "input": {} }],
                },
            })
            .to_string(),
        );
    }
    lines.join("\n")
}

fn parser() -> SessionParser {
    SessionParser::new(ProjectResolver::new("/Users/alice"))
}

proptest! {
    #[test]
    fn test_cost_never_negative(tokens in arb_token_counts(), model in arb_model()) {
        prop_assert!(CostCalculator::calculate_cost(&tokens, &model) >= 0.0);
    }

    #[test]
    fn test_cost_grows_with_tokens(
        tokens in arb_token_counts(),
        extra in arb_token_counts(),
        model in arb_model(),
    ) {
        let base = CostCalculator::calculate_cost(&tokens, &model);
        let more = CostCalculator::calculate_cost(&(tokens + extra), &model);
        prop_assert!(more + 1e-9 >= base);
    }

    #[test]
    fn test_sanitize_is_idempotent(text in ".{0,200}") {
        let once = sanitize(&text);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_sanitize_removes_reminders(before in "[a-z ]{0,20}", inside in "[a-z\n ]{0,40}", after in "[a-z ]{0,20}") {
        let text = format!("{before}<system-reminder>{inside}</system-reminder>{after}");
        prop_assert!(!sanitize(&text).contains("system-reminder"));
    }

    #[test]
    fn test_truncate_bounds(text in ".{0,300}", max in 0usize..150) {
        let truncated = truncate(&text, max);
        let chars = text.chars().count();
        if chars <= max {
            prop_assert_eq!(truncated, text);
        } else {
            prop_assert_eq!(truncated.chars().count(), max + 3);
            prop_assert!(truncated.ends_with("..."));
        }
    }

    #[test]
    fn test_short_model_name_never_empty(model in "[a-z0-9.-]{0,40}") {
        prop_assert!(!short_model_name(&model).is_empty());
    }

    #[test]
    fn test_parsed_tokens_are_sums(usage in prop::collection::vec((0u64..1_000_000, 0u64..1_000_000), 0..40)) {
        let content = log_with_usage(&usage);
        let session = parser()
            .parse_content(SessionId::new("sum"), &content, content.len() as u64, "-Users-alice")
            .unwrap();

        let input: u64 = usage.iter().map(|(i, _)| i).sum();
        let output: u64 = usage.iter().map(|(_, o)| o).sum();
        prop_assert_eq!(session.tokens.input_tokens, input);
        prop_assert_eq!(session.tokens.output_tokens, output);
        prop_assert_eq!(session.assistant_messages, usage.len() as u64);
        prop_assert_eq!(session.tool_counts.get("Read").copied().unwrap_or(0), usage.len() as u64);
        prop_assert!(session.estimated_cost >= 0.0);
    }

    #[test]
    fn test_parsing_is_deterministic(
        usage in prop::collection::vec((0u64..1_000, 0u64..1_000), 0..10),
        junk in prop::collection::vec("[^\n]{0,30}", 0..5),
    ) {
        let mut content = log_with_usage(&usage);
        for line in &junk {
            content.push('\n');
            content.push_str(line);
        }

        let first = parser().parse_content(SessionId::new("d"), &content, 1, "-Users-alice");
        let second = parser().parse_content(SessionId::new("d"), &content, 1, "-Users-alice");
        prop_assert_eq!(first, second);
    }
}
