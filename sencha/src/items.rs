#![deny(warnings)]

use crate::grammar::{Rule, Symbol};
use std::fmt;
use std::rc::Rc;


/// Index of an `Item` within the chart's arena
pub type ItemId = usize;

/// Backlink recording how an Item came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// Fresh item at the start of its rule
    Predict,
    /// Advanced from `prev` by matching a terminal
    Scan(ItemId),
    /// Advanced from `prev` because `child` completed its next non-terminal
    Complete(ItemId, ItemId),
    /// Advanced from `prev` over a nullable non-terminal deriving ε
    Nullable(ItemId),
}

/// What processing an Item amounts to, given its shape.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    Shift(&'a str),
    Predict(&'a str),
    Reduce,
}

/// An Item is a partially matched `Rule`. `dot` shows the match progress.
#[derive(Clone)]
pub struct Item {
    pub rule: Rc<Rule>,  // LR0item (dotted rule)
    pub dot: usize,      // dot position within the rule
    pub start: usize,    // input stream position where item starts
    pub end: usize,      // input stream position where item ends
    /// derivation steps spent so far (counting this item's own rule)
    pub steps: usize,
    /// terminals matched by the part of the rule left of the dot. Only
    /// recorded when enumerating, input spans already pin it down otherwise.
    pub consumed: Vec<String>,
    pub source: Source,
}

/// Items sharing a key are interchangeable within a chart position
/// (only the cheapest one matters). Rules are told apart by address, all
/// items of a chart share the grammar's `Rc`s.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    rule: *const Rule,
    start: usize,
    dot: usize,
    consumed: Vec<String>,
}

impl Item {
    /// Build a new `Prediction` based Item.
    pub fn predict_new(rule: &Rc<Rule>, start: usize) -> Item {
        Item {
            rule: rule.clone(),
            dot: 0,
            start,
            end: start,
            steps: 1,
            consumed: Vec::new(),
            source: Source::Predict,
        }
    }

    /// Build a `Scan` based Item. The rule is advanced by matching a terminal.
    /// With `record` the terminal is appended to `consumed`.
    pub fn scan_new(&self, id: ItemId, end: usize, record: bool) -> Item {
        let mut consumed = self.consumed.clone();
        if let (true, Some(Symbol::Term(token))) = (record, self.next_symbol()) {
            consumed.push(token.clone());
        }
        Item {
            dot: self.dot + 1,
            end,
            consumed,
            source: Source::Scan(id),
            ..self.clone()
        }
    }

    /// Build a `Completion` based Item.
    /// The rule is advanced because its next symbol matches the completed `trigger`.
    pub fn complete_new(&self, id: ItemId, trigger: &Item, trigger_id: ItemId) -> Item {
        let mut consumed = self.consumed.clone();
        consumed.extend(trigger.consumed.iter().cloned());
        Item {
            dot: self.dot + 1,
            end: trigger.end,
            steps: self.steps + trigger.steps,
            consumed,
            source: Source::Complete(id, trigger_id),
            ..self.clone()
        }
    }

    /// Advance over a nullable next symbol that derives ε in `cost` steps.
    pub fn skip_new(&self, id: ItemId, cost: usize) -> Item {
        Item {
            dot: self.dot + 1,
            steps: self.steps + cost,
            source: Source::Nullable(id),
            ..self.clone()
        }
    }

    /// Exposes the next symbol in the progress of the Rule
    pub fn next_symbol(&self) -> Option<&Symbol> {
        self.rule.spec.get(self.dot)
    }

    pub fn step(&self) -> Step<'_> {
        match self.next_symbol() {
            Some(Symbol::Term(token)) => Step::Shift(token),
            Some(Symbol::NonTerm(name)) => Step::Predict(name),
            None => Step::Reduce,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey {
            rule: Rc::as_ptr(&self.rule),
            start: self.start,
            dot: self.dot,
            consumed: self.consumed.clone(),
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pre = self.rule.spec.iter().take(self.dot)
            .map(|s| s.name()).collect::<Vec<_>>().join(" ");
        let post = self.rule.spec.iter().skip(self.dot)
            .map(|s| s.name()).collect::<Vec<_>>().join(" ");
        write!(f, "({} - {}) {} -> {} \u{00b7} {} #steps: {} {:?}",
               self.start, self.end, self.rule.head, pre, post,
               self.steps, self.consumed)
    }
}

///////////////////////////////////////////////////////////////////////////////
