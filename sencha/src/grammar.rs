#![deny(warnings)]

use crate::error::GrammarError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Grammar symbols. Terminals are atomic tokens matched by equality.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    NonTerm(String),
    Term(String),
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: String,
    pub spec: Vec<Symbol>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    pub start: String,
    pub rules: Vec<Rc<Rule>>,
}

#[derive(Default)]
pub struct GrammarBuilder {
    symbols: HashMap<String, Symbol>,
    rules: Vec<Rc<Rule>>,
    error: Option<GrammarError>,
}


impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::NonTerm(name) => name,
            Symbol::Term(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Term(_))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Term(name) => write!(f, "Term({})", name),
            Symbol::NonTerm(name) => write!(f, "NonTerm({})", name),
        }
    }
}

impl Rule {
    pub fn new(head: impl Into<String>, spec: Vec<Symbol>) -> Self {
        Rule { head: head.into(), spec }
    }

    /// CNF terminal rule `head -> term`
    pub fn leaf(head: impl Into<String>, term: impl Into<String>) -> Self {
        Rule::new(head, vec![Symbol::Term(term.into())])
    }

    /// CNF branching rule `head -> left right`
    pub fn branch(
        head: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>) -> Self
    {
        Rule::new(head, vec![
            Symbol::NonTerm(left.into()),
            Symbol::NonTerm(right.into()),
        ])
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.spec.as_slice(), [Symbol::Term(_)])
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.spec.as_slice(), [Symbol::NonTerm(_), Symbol::NonTerm(_)])
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.head, self.spec.iter().map(
               |s| s.name()).collect::<Vec<_>>().join(" "))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Grammar {
    /// A grammar with a start symbol but no rules (ie: the empty language)
    pub fn new(start: impl Into<String>) -> Self {
        Grammar { start: start.into(), rules: Vec::new() }
    }

    /// Alternatives for `nonterm` in the order they were added
    pub fn rules_for<'a>(&'a self, nonterm: &'a str)
        -> impl Iterator<Item=&'a Rc<Rule>> + 'a
    {
        self.rules.iter().filter(move |rule| rule.head == nonterm)
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.iter().any(|r| **r == *rule)
    }

    /// Add a rule unless it's already part of the grammar
    pub fn insert(&mut self, rule: Rule) -> bool {
        if self.contains(&rule) {
            return false;
        }
        self.rules.push(Rc::new(rule));
        true
    }

    pub fn remove(&mut self, rule: &Rule) -> bool {
        match self.rules.iter().position(|r| **r == *rule) {
            Some(idx) => { self.rules.remove(idx); true },
            None => false,
        }
    }

    pub fn len(&self) -> usize { self.rules.len() }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Non-terminals in order of appearance, starting with `start`
    pub fn nonterms(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let heads = self.rules.iter().flat_map(|rule|
            std::iter::once(rule.head.as_str()).chain(rule.spec.iter()
                .filter(|s| !s.is_terminal()).map(|s| s.name())));
        std::iter::once(self.start.as_str())
            .chain(heads)
            .filter(|nt| seen.insert(*nt))
            .collect()
    }

    /// Terminals in order of appearance
    pub fn terminals(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules.iter()
            .flat_map(|rule| rule.spec.iter())
            .filter(|s| s.is_terminal())
            .map(|s| s.name())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn is_cnf(&self) -> bool {
        self.rules.iter().all(|rule| rule.is_leaf() || rule.is_branch())
    }

    /// Keep only rules that are reachable from `start` and can derive
    /// some terminal string. Pruning an already pruned grammar is a noop.
    pub fn prune(&self) -> Grammar {
        self.prune_with(|_| false)
    }

    /// Like `prune` but non-terminals for which `derives_empty` holds are
    /// productive even if they have no rules (ie: epsilon-free grammars).
    pub fn prune_with(&self, derives_empty: impl Fn(&str) -> bool) -> Grammar {
        // Productive symbols: fixpoint over rules whose spec is all productive
        let mut productive = HashSet::new();
        loop {
            let known = productive.len();
            for rule in &self.rules {
                if rule.spec.iter().all(|s| s.is_terminal() ||
                                        derives_empty(s.name()) ||
                                        productive.contains(s.name())) {
                    productive.insert(rule.head.as_str());
                }
            }
            if known == productive.len() {
                break;
            }
        }
        let usable = |spec: &[Symbol]| spec.iter()
            .all(|s| s.is_terminal() || derives_empty(s.name()) || productive.contains(s.name()));

        // Reachability only follows rules that survive productivity
        let mut reachable = HashSet::from([self.start.as_str()]);
        let mut pending = vec![self.start.as_str()];
        while let Some(nonterm) = pending.pop() {
            for rule in self.rules_for(nonterm).filter(|r| usable(r.spec.as_slice())) {
                for sym in rule.spec.iter().filter(|s| !s.is_terminal()) {
                    if reachable.insert(sym.name()) {
                        pending.push(sym.name());
                    }
                }
            }
        }

        Grammar {
            start: self.start.clone(),
            rules: self.rules.iter()
                .filter(|r| reachable.contains(r.head.as_str()) && usable(r.spec.as_slice()))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Builds a Gramar while validating existence of Symbols and checking rules.
impl GrammarBuilder {
    fn fail(&mut self, error: GrammarError) {
        // keep the first problem found
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn add_symbol(&mut self, symbol: Symbol, quiet: bool) {
        // Check for duplicate symbols to avoid overwriting by mistake
        if !self.symbols.contains_key(symbol.name()) {
            self.symbols.insert(symbol.name().to_string(), symbol);
        } else if !quiet {
            // Convenience for adding symbols programatically
            self.fail(GrammarError::DuplicateSymbol(symbol.name().to_string()));
        }
    }

    pub fn nonterm(mut self, name: impl Into<String>) -> Self {
        self.add_symbol(Symbol::NonTerm(name.into()), false);
        self
    }

    pub fn terminal(mut self, name: impl Into<String>) -> Self {
        self.add_symbol(Symbol::Term(name.into()), false);
        self
    }

    // Quiet silently ignores adding pre-existent symbols to the grammar.
    // Also quiet versions don't use chaining to be invoked in loops.

    pub fn quiet_nonterm(&mut self, name: impl Into<String>) {
        self.add_symbol(Symbol::NonTerm(name.into()), true);
    }

    pub fn quiet_terminal(&mut self, name: impl Into<String>) {
        self.add_symbol(Symbol::Term(name.into()), true);
    }

    /// Register new rules for the grammar
    fn add_rule<S, S2>(&mut self, head: S, spec: &[S2], quiet: bool)
        where S: AsRef<str>, S2: AsRef<str>
    {
        // First check that all symbols have been registered (need references)
        if let Some(s) = spec.iter().find(|n| !self.symbols.contains_key(n.as_ref())) {
            self.fail(GrammarError::MissingSymbol(s.as_ref().to_string()));
            return;
        }
        match self.symbols.get(head.as_ref()).cloned() {
            None => {
                self.fail(GrammarError::MissingSymbol(head.as_ref().to_string()));
                return;
            }
            Some(Symbol::Term(name)) => {
                self.fail(GrammarError::NotNonTerm(name));
                return;
            }
            Some(Symbol::NonTerm(_)) => (),
        }
        let rule = Rc::new(Rule {
            head: head.as_ref().to_string(),
            spec: spec.iter().map(|s| self.symbols[s.as_ref()].clone()).collect()
        });
        // Check this rule is only added once. NOTE: `Rc`s equal on inner value
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        } else if !quiet {
            self.fail(GrammarError::DuplicateRule(rule.to_string()));
        }
    }

    pub fn rule<S, S2>(mut self, head: S, spec: &[S2]) -> Self
        where S: AsRef<str>, S2: AsRef<str>
    {
        self.add_rule(head, spec, false);
        self
    }

    pub fn quiet_rule<S, S2>(&mut self, head: S, spec: &[S2])
        where S: AsRef<str>, S2: AsRef<str>
    {
        self.add_rule(head, spec, true)
    }

    pub fn into_grammar(mut self, start: impl Into<String>) -> Result<Grammar, GrammarError> {
        let start = start.into();
        if !self.symbols.contains_key(&start) {
            self.fail(GrammarError::MissingSymbol(start.clone()));
        }
        self.error.map_or(Ok(Grammar{start, rules: self.rules}), Err)
    }
}


///////////////////////////////////////////////////////////////////////////////
