#![deny(warnings)]

use crate::chart::{Chart, GOAL};
use crate::grammar::Grammar;
use crate::nullable::{Nullable, epsilon_free};
use crate::trees::Derivation;
use std::collections::VecDeque;

/// Earley recognizer over an epsilon-free grammar.
///
/// Empty rules are not matched directly, instead predicting a nullable
/// non-terminal also skips over it (see `Nullable`).
pub struct EarleyRecognizer {
    pub grammar: Grammar,
    pub nullable: Nullable,
    // Only rules that can be part of a sentence. Enumerating over dead
    // rules would keep shifting without ever completing.
    viable: Grammar,
}

impl EarleyRecognizer {
    /// Normalize `grammar` (analyze nullability, drop empty rules)
    pub fn new(grammar: &Grammar) -> EarleyRecognizer {
        EarleyRecognizer::from_parts(epsilon_free(grammar), Nullable::analyze(grammar))
    }

    /// Use an already epsilon-free `grammar` along with its nullability
    pub fn from_parts(grammar: Grammar, nullable: Nullable) -> EarleyRecognizer {
        let viable = grammar.prune_with(|nonterm| nullable.is_nullable(nonterm));
        EarleyRecognizer { grammar, nullable, viable }
    }

    fn chart<'a, T: AsRef<str>>(&'a self, nonterm: &str, tokens: &'a [T])
        -> Chart<'a, impl Fn(usize, &str) -> bool + 'a>
    {
        let mut chart = Chart::new(&self.grammar, &self.nullable, nonterm,
            move |pos: usize, term: &str| tokens.get(pos).is_some_and(|tok| tok.as_ref() == term));
        chart.process();
        while chart.position() < tokens.len() && chart.advance() {
            chart.process();
        }
        if cfg!(feature="debug") {
            chart.dump();
        }
        chart
    }

    /// Derivation steps (including the goal rule) of the cheapest way
    /// `nonterm` derives exactly `tokens`
    fn goal_steps<T: AsRef<str>>(&self, nonterm: &str, tokens: &[T]) -> Option<usize> {
        let chart = self.chart(nonterm, tokens);
        if chart.position() != tokens.len() {
            return None;
        }
        chart.completed(0, GOAL).map(|id| chart.item(id).steps)
    }

    /// Check the start symbol derives exactly `tokens`
    pub fn recognize<T: AsRef<str>>(&self, tokens: &[T]) -> bool {
        self.accepts(&self.grammar.start, tokens)
    }

    /// Check `nonterm` derives exactly `tokens`
    pub fn accepts<T: AsRef<str>>(&self, nonterm: &str, tokens: &[T]) -> bool {
        self.goal_steps(nonterm, tokens).is_some()
    }

    /// Fewest rule applications needed to derive `tokens` from the start symbol
    pub fn min_derivation_len<T: AsRef<str>>(&self, tokens: &[T]) -> Option<usize> {
        // the synthetic goal rule isn't part of the grammar
        self.goal_steps(&self.grammar.start, tokens).map(|steps| steps - 1)
    }

    /// One (the cheapest) derivation of `tokens` from `nonterm`
    pub fn derive<T: AsRef<str>>(&self, nonterm: &str, tokens: &[T]) -> Option<Derivation> {
        let chart = self.chart(nonterm, tokens);
        if chart.position() != tokens.len() {
            return None;
        }
        let goal = chart.completed(0, GOAL)?;
        // strip the synthetic goal rule
        chart.derivation(goal).children.into_iter().next()
    }

    /// Lazily enumerate every sentence of the grammar.
    /// Sentences show up grouped by length, shortest first.
    pub fn language(&self) -> Language<'_> {
        fn any(_: usize, _: &str) -> bool { true }
        Language {
            chart: Chart::new(&self.viable, &self.nullable, &self.viable.start,
                              any as fn(usize, &str) -> bool).record_terminals(),
            started: false,
            pending: VecDeque::new(),
        }
    }
}

/// Iterator over a grammar's language. Each time it runs dry it advances
/// the chart by one position. Ends only if the language is finite.
pub struct Language<'g> {
    chart: Chart<'g, fn(usize, &str) -> bool>,
    started: bool,
    pending: VecDeque<Vec<String>>,
}

impl Iterator for Language<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() {
            // nothing shifted means no longer sentences are possible
            if self.started && !self.chart.advance() {
                return None;
            }
            self.started = true;
            self.chart.process();
            for id in self.chart.take_accepted() {
                self.pending.push_back(self.chart.item(id).consumed.clone());
            }
        }
        self.pending.pop_front()
    }
}
