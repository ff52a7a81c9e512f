#![deny(warnings)]

use thiserror::Error;

/// Problems detected while assembling a `Grammar` with `GrammarBuilder`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Duplicate Symbol: {0}")]
    DuplicateSymbol(String),
    #[error("Duplicate Rule: {0}")]
    DuplicateRule(String),
    #[error("Missing Symbol: {0}")]
    MissingSymbol(String),
    #[error("Not a NonTerm: {0}")]
    NotNonTerm(String),
}

/// Reasons a `Learner` run stops without an accepted hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnError {
    #[error("no non-terminals to learn with")]
    NoNonTerminals,
    #[error("gave up after {rounds} rounds without an accepted hypothesis")]
    RoundLimit { rounds: usize },
}
