// Line normalization architecture
//
// This module splits long dialogue text into readable lines and retimes them:
// - Metric: readable symbol counting shared by every length decision
// - Rules: pluggable "good line end" predicates
// - Balancer: budget-respecting split of a single screen line
// - Screen: pairing of split lines into two-line captions
// - Retime: proportional time reallocation for one event

pub mod metric;
pub mod rules;
pub mod balancer;
pub mod screen;
pub mod retime;

pub use balancer::*;
pub use metric::{symbol_count, LINE_BREAK};
pub use retime::*;
pub use screen::ScreenBuilder;

use crate::config::BreakRuleMode;

/// Decides whether a word is a natural place to end a line
pub trait BreakRule: Send + Sync {
    /// True when a line ending with `word` reads as a finished clause
    fn is_good_end(&self, word: &str) -> bool;
}

/// Factory for creating break rule instances
pub struct BreakRuleFactory;

impl BreakRuleFactory {
    /// Create a break rule based on the configured mode
    pub fn create_rule(mode: BreakRuleMode) -> Box<dyn BreakRule> {
        match mode {
            BreakRuleMode::Punctuation => Box::new(rules::PunctuationRule),
            BreakRuleMode::Sentence => Box::new(rules::SentenceRule),
            BreakRuleMode::None => Box::new(rules::NoBreakRule),
        }
    }
}
