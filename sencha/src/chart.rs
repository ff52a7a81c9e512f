#![deny(warnings)]

use crate::grammar::{Grammar, Rule, Symbol};
use crate::items::{Item, ItemId, ItemKey, Source, Step};
use crate::nullable::Nullable;
use crate::trees::Derivation;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;

/// Head of the synthetic rule `<Goal> -> Nonterm` that seeds every chart
pub const GOAL: &str = "<Goal>";

/// Incremental Earley chart. Items are kept in an arena and refer to each
/// other by `ItemId`. The chart is driven one input position at a time:
/// `process` runs the current position to exhaustion, `advance` moves on
/// to the next one carrying whatever got shifted.
///
/// Shifting is decided by `shift(position, terminal)`. Matching against
/// an input token recognizes that input; always shifting explores every
/// terminal transition (ie: enumerates the language). Only enumeration
/// needs to `record_terminals`, recognition reads them off the input.
pub struct Chart<'g, P> {
    grammar: &'g Grammar,
    nullable: &'g Nullable,
    goal: Rc<Rule>,
    shift: P,
    record: bool,
    position: usize,
    items: Vec<Item>,
    // Cheapest derivations pop first, FIFO otherwise (ids grow)
    worklist: BinaryHeap<Reverse<(usize, ItemId)>>,
    shifted: Vec<ItemId>,
    processed: HashSet<ItemKey>,
    predicted: HashSet<String>,
    // (start, nonterm) -> items waiting for nonterm to complete from start
    waiting: HashMap<(usize, String), Vec<ItemId>>,
    // (start, nonterm) -> cheapest derivation completed at the current position
    completions: HashMap<(usize, String), ItemId>,
    accepted: Vec<ItemId>,
}

enum Child {
    Completed(ItemId),
    Empty(Derivation),
}

// A node of `derivation` whose children are still being built
struct Pending {
    id: ItemId,
    children: Vec<Child>,
    built: Vec<Derivation>,
}

impl<'g, P> Chart<'g, P> where P: Fn(usize, &str) -> bool {
    pub fn new(grammar: &'g Grammar, nullable: &'g Nullable, nonterm: &str, shift: P) -> Self {
        let goal = Rc::new(Rule::new(GOAL, vec![Symbol::NonTerm(nonterm.to_string())]));
        let mut chart = Chart {
            grammar,
            nullable,
            goal,
            shift,
            record: false,
            position: 0,
            items: Vec::new(),
            worklist: BinaryHeap::new(),
            shifted: Vec::new(),
            processed: HashSet::new(),
            predicted: HashSet::new(),
            waiting: HashMap::new(),
            completions: HashMap::new(),
            accepted: Vec::new(),
        };
        // A nullable start completes the goal right away through `predict`
        let seed = Item::predict_new(&chart.goal, 0);
        chart.schedule(seed);
        chart
    }

    /// Keep track of the terminals each item matched (see `Item::consumed`)
    pub fn record_terminals(mut self) -> Self {
        self.record = true;
        self
    }

    pub fn position(&self) -> usize { self.position }

    pub fn item(&self, id: ItemId) -> &Item { &self.items[id] }

    fn alloc(&mut self, item: Item) -> ItemId {
        self.items.push(item);
        self.items.len() - 1
    }

    fn schedule(&mut self, item: Item) {
        let steps = item.steps;
        let id = self.alloc(item);
        self.worklist.push(Reverse((steps, id)));
    }

    /// Run shift/predict/reduce at the current position until no work is left
    pub fn process(&mut self) {
        while let Some(Reverse((_, id))) = self.worklist.pop() {
            // Duplicates (even costlier ones) are dropped: guarantees termination
            if !self.processed.insert(self.items[id].key()) {
                continue;
            }
            let item = self.items[id].clone();
            tracing::trace!(position = self.position, ?item, "processing");
            match item.step() {
                Step::Shift(token) => {
                    if (self.shift)(self.position, token) {
                        let scanned = item.scan_new(id, self.position + 1, self.record);
                        let scanned = self.alloc(scanned);
                        self.shifted.push(scanned);
                    }
                }
                Step::Predict(nonterm) => self.predict(id, &item, nonterm),
                Step::Reduce => self.reduce(id, &item),
            }
        }
    }

    fn predict(&mut self, id: ItemId, item: &Item, nonterm: &str) {
        let grammar = self.grammar;
        if self.predicted.insert(nonterm.to_string()) {
            for rule in grammar.rules_for(nonterm) {
                self.schedule(Item::predict_new(rule, self.position));
            }
        }
        self.waiting.entry((self.position, nonterm.to_string())).or_default().push(id);
        // Empty rules were removed from the grammar, account for them here
        if let Some(cost) = self.nullable.cost(nonterm) {
            self.schedule(item.skip_new(id, cost));
        }
    }

    fn reduce(&mut self, id: ItemId, item: &Item) {
        let key = (item.start, item.rule.head.clone());
        self.completions.entry(key.clone()).or_insert(id);
        if Rc::ptr_eq(&item.rule, &self.goal) {
            tracing::trace!(position = self.position, consumed = ?item.consumed, "accepted");
            self.accepted.push(id);
        }
        let waiting = self.waiting.get(&key).cloned().unwrap_or_default();
        for source in waiting {
            let resumed = self.items[source].complete_new(source, item, id);
            self.schedule(resumed);
        }
    }

    /// Move to the next position, seeding it with the items shifted so far.
    /// Returns false when nothing got shifted (ie: the chart is dead).
    pub fn advance(&mut self) -> bool {
        self.position += 1;
        self.processed.clear();
        self.predicted.clear();
        self.completions.clear();
        for id in std::mem::take(&mut self.shifted) {
            self.worklist.push(Reverse((self.items[id].steps, id)));
        }
        !self.worklist.is_empty()
    }

    /// Cheapest item completing `nonterm` from `start` at the current position
    pub fn completed(&self, start: usize, nonterm: &str) -> Option<ItemId> {
        self.completions.get(&(start, nonterm.to_string())).copied()
    }

    /// Goal completions found since the last call (in discovery order)
    pub fn take_accepted(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.accepted)
    }

    /// Children of `id` found by retracing its backlinks, rightmost first
    fn children(&self, id: ItemId) -> Vec<Child> {
        let mut children = Vec::new();
        let mut cursor = id;
        loop {
            match self.items[cursor].source {
                Source::Predict => return children,
                Source::Scan(prev) => cursor = prev,
                Source::Complete(prev, child) => {
                    children.push(Child::Completed(child));
                    cursor = prev;
                }
                Source::Nullable(prev) => {
                    let skipped = &self.items[prev];
                    let tree = skipped.next_symbol()
                        .and_then(|sym| self.nullable.derive_empty(sym.name(), skipped.end));
                    children.extend(tree.map(Child::Empty));
                    cursor = prev;
                }
            }
        }
    }

    /// Rebuild the derivation that produced `id`.
    /// Trees can be as deep as the input is long, so no recursion here.
    pub fn derivation(&self, id: ItemId) -> Derivation {
        let mut current = Pending { id, children: self.children(id), built: Vec::new() };
        let mut parents = Vec::new();
        loop {
            match current.children.pop() {
                Some(Child::Completed(child)) => {
                    let next = Pending { id: child, children: self.children(child), built: Vec::new() };
                    parents.push(std::mem::replace(&mut current, next));
                }
                Some(Child::Empty(tree)) => current.built.push(tree),
                None => {
                    let item = &self.items[current.id];
                    let tree = Derivation {
                        rule: item.rule.clone(),
                        start: item.start,
                        end: item.end,
                        children: current.built,
                    };
                    match parents.pop() {
                        Some(parent) => {
                            current = parent;
                            current.built.push(tree);
                        }
                        None => return tree,
                    }
                }
            }
        }
    }

    pub fn dump(&self) {
        tracing::debug!(position = self.position, items = self.items.len(), "=== Chart ===");
        for (id, item) in self.items.iter().enumerate() {
            tracing::debug!("{} {:?} -- SRC: {:?}", id, item, item.source);
        }
    }
}
