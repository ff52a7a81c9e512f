#![deny(warnings)]

use crate::error::LearnError;
use crate::grammar::{Grammar, Rule, Symbol};
use crate::recognizer::EarleyRecognizer;
use crate::trees::Derivation;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;


/// Answer of a counterexample oracle to a hypothesis
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// A sentence the hypothesis gets wrong (either way)
    Counterexample(Vec<String>),
}

/// Outcome of a single refinement round
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Round {
    Accepted(Grammar),
    Refined,
}

#[derive(Clone, Debug, Default)]
pub struct LearnerConfig {
    /// Give up after this many counterexample queries. Unbounded if None.
    pub max_rounds: Option<usize>,
}

/// Learns a CNF grammar over a fixed set of non-terminals by querying a
/// membership oracle `member(nonterm, tokens)` and a counterexample
/// oracle `counter(hypothesis)`.
///
/// The hypothesis starts with every branching rule `A -> B C` and no
/// terminal rules. Branches are only ever removed. Terminal rules get
/// added when a counterexample can't be derived, and once one is blamed
/// it is blacklisted for the rest of the run.
pub struct Learner<M, C> {
    nonterms: Vec<String>,
    member: M,
    counter: C,
    config: LearnerConfig,
    grammar: Grammar,
    blacklist: HashSet<(String, String)>,
    answers: HashMap<(String, Vec<String>), bool>,
    rounds: usize,
}

impl<M, C> Learner<M, C>
where
    M: FnMut(&str, &[String]) -> bool,
    C: FnMut(&Grammar) -> Verdict,
{
    /// The first of `nonterms` is the start symbol
    pub fn new<S: AsRef<str>>(nonterms: &[S], member: M, counter: C) -> Result<Self, LearnError> {
        let nonterms: Vec<String> = nonterms.iter().map(|nt| nt.as_ref().to_string()).collect();
        let start = nonterms.first().ok_or(LearnError::NoNonTerminals)?;
        let mut grammar = Grammar::new(start.as_str());
        for head in &nonterms {
            for left in &nonterms {
                for right in &nonterms {
                    grammar.insert(Rule::branch(head, left, right));
                }
            }
        }
        Ok(Learner {
            nonterms,
            member,
            counter,
            config: LearnerConfig::default(),
            grammar,
            blacklist: HashSet::new(),
            answers: HashMap::new(),
            rounds: 0,
        })
    }

    pub fn with_config(mut self, config: LearnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current (unpruned) working grammar
    pub fn hypothesis(&self) -> &Grammar { &self.grammar }

    pub fn blacklist(&self) -> &HashSet<(String, String)> { &self.blacklist }

    pub fn rounds(&self) -> usize { self.rounds }

    /// Distinct membership questions forwarded to the oracle
    pub fn membership_queries(&self) -> usize { self.answers.len() }

    fn is_member(&mut self, nonterm: &str, tokens: &[String]) -> bool {
        let key = (nonterm.to_string(), tokens.to_vec());
        if let Some(answer) = self.answers.get(&key) {
            return *answer;
        }
        let answer = (self.member)(nonterm, tokens);
        self.answers.insert(key, answer);
        answer
    }

    /// Show the pruned hypothesis to the counterexample oracle and refine
    /// the working grammar with its answer.
    pub fn step(&mut self) -> Round {
        self.rounds += 1;
        let pruned = self.grammar.prune();
        let counterexample = match (self.counter)(&pruned) {
            Verdict::Accept => {
                tracing::info!(rounds = self.rounds, rules = pruned.len(), "hypothesis accepted");
                return Round::Accepted(pruned);
            }
            Verdict::Counterexample(tokens) => tokens,
        };
        tracing::debug!(round = self.rounds, ?counterexample, "counterexample");

        // Diagnose against the unpruned grammar, it still holds every candidate
        let tree = EarleyRecognizer::new(&self.grammar)
            .derive(&self.grammar.start, &counterexample);
        match tree {
            Some(tree) => {
                for rule in self.diagnose(&tree, &counterexample) {
                    tracing::debug!(round = self.rounds, %rule, "removing rule");
                    self.grammar.remove(&rule);
                    if let [Symbol::Term(token)] = rule.spec.as_slice() {
                        self.blacklist.insert((rule.head.clone(), token.clone()));
                    }
                }
            }
            None => self.add_leaves(&counterexample),
        }
        Round::Refined
    }

    /// Over-generate terminal rules for every token of an underivable sentence
    fn add_leaves(&mut self, tokens: &[String]) {
        for token in tokens {
            for nonterm in &self.nonterms {
                if self.blacklist.contains(&(nonterm.clone(), token.clone())) {
                    continue;
                }
                if self.grammar.insert(Rule::leaf(nonterm, token)) {
                    tracing::debug!(round = self.rounds, %nonterm, %token, "adding leaf");
                }
            }
        }
    }

    /// Walk the tree breadth-first looking for the rules to blame.
    /// Children the oracle disagrees with are searched further, a node
    /// whose children all check out is blamed itself.
    fn diagnose(&mut self, tree: &Derivation, input: &[String]) -> Vec<Rc<Rule>> {
        let mut blamed: Vec<Rc<Rule>> = Vec::new();
        let mut pending = VecDeque::from([tree]);
        while let Some(node) = pending.pop_front() {
            let wrong: Vec<_> = node.children.iter()
                .filter(|child| !self.is_member(child.head(), child.tokens(input)))
                .collect();
            if !wrong.is_empty() {
                pending.extend(wrong);
            } else if !blamed.contains(&node.rule) {
                blamed.push(node.rule.clone());
            }
        }
        blamed
    }

    /// Refine until the counterexample oracle accepts a hypothesis
    pub fn run(mut self) -> Result<Grammar, LearnError> {
        loop {
            if self.config.max_rounds.is_some_and(|limit| self.rounds >= limit) {
                return Err(LearnError::RoundLimit { rounds: self.rounds });
            }
            if let Round::Accepted(grammar) = self.step() {
                return Ok(grammar);
            }
        }
    }
}

/// Learn a grammar with no round limit
pub fn learn<S, M, C>(nonterms: &[S], member: M, counter: C) -> Result<Grammar, LearnError>
where
    S: AsRef<str>,
    M: FnMut(&str, &[String]) -> bool,
    C: FnMut(&Grammar) -> Verdict,
{
    Learner::new(nonterms, member, counter)?.run()
}
