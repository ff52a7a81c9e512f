#![deny(warnings)]

mod error;
pub use crate::error::{GrammarError, LearnError};

mod grammar;
pub use crate::grammar::{Grammar, GrammarBuilder, Rule, Symbol};

mod nullable;
pub use crate::nullable::{Nullable, epsilon_free};

mod items;
mod chart;

mod recognizer;
pub use crate::recognizer::{EarleyRecognizer, Language};

mod trees;
pub use crate::trees::{Derivation, Nodes};

mod learner;
pub use crate::learner::{Learner, LearnerConfig, Round, Verdict, learn};

#[cfg(test)]
mod learner_test;
