#![deny(warnings)]

use crate::grammar::Rule;
use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;


/// One concrete derivation of an input span.
/// There's a child for each non-terminal in the rule's spec (in order).
/// Rules that only match terminals produce leaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation {
    pub rule: Rc<Rule>,
    pub start: usize,
    pub end: usize,
    pub children: Vec<Derivation>,
}

impl Derivation {
    pub fn head(&self) -> &str { &self.rule.head }

    pub fn span(&self) -> Range<usize> { self.start..self.end }

    /// The slice of `input` this node covers
    pub fn tokens<'t, T>(&self, input: &'t [T]) -> &'t [T] {
        &input[self.span()]
    }

    pub fn is_leaf(&self) -> bool { self.children.is_empty() }

    /// Breadth-first walk over this node and all its descendants
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes { pending: VecDeque::from([self]) }
    }
}

pub struct Nodes<'a> {
    pending: VecDeque<&'a Derivation>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Derivation;
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop_front()?;
        self.pending.extend(node.children.iter());
        Some(node)
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn walk(node: &Derivation, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
            writeln!(f, "{:indent$}{} [{}..{}]", "", node.rule, node.start, node.end,
                     indent = depth * 2)?;
            node.children.iter().try_for_each(|child| walk(child, f, depth + 1))
        }
        walk(self, f, 0)
    }
}
