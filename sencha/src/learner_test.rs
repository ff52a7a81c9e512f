#![deny(warnings)]

use crate::error::LearnError;
use crate::grammar::{Grammar, GrammarBuilder};
use crate::learner::{Learner, LearnerConfig, Round, Verdict, learn};
use crate::recognizer::EarleyRecognizer;
use std::cell::Cell;
use std::collections::HashSet;


fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sentences(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
    let mut all = vec![Vec::new()];
    let mut last: Vec<Vec<String>> = vec![Vec::new()];
    for _ in 0..max_len {
        last = last.iter().flat_map(|prefix| alphabet.iter().map(move |sym| {
            let mut s = prefix.clone();
            s.push(sym.to_string());
            s
        })).collect();
        all.extend(last.iter().cloned());
    }
    all
}

/// Sentences up to `len` tokens long and the ones past it
fn split(sentences: Vec<Vec<String>>, len: usize) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    sentences.into_iter().partition(|s| s.len() <= len)
}

// Balanced parentheses in CNF
//   S -> S S | A B;  A -> (;  B -> ) | S B
fn parens() -> Grammar {
    GrammarBuilder::default()
      .nonterm("S")
      .nonterm("A")
      .nonterm("B")
      .terminal("(")
      .terminal(")")
      .rule("S", &["S", "S"])
      .rule("S", &["A", "B"])
      .rule("A", &["("])
      .rule("B", &[")"])
      .rule("B", &["S", "B"])
      .into_grammar("S")
      .expect("Bad grammar")
}

fn member(target: &EarleyRecognizer) -> impl FnMut(&str, &[String]) -> bool + '_ {
    move |nonterm: &str, tokens: &[String]| target.accepts(nonterm, tokens)
}

/// Compares the hypothesis with the target over every sample, shortest first
fn counter<'a>(target: &'a EarleyRecognizer, samples: &'a [Vec<String>])
    -> impl FnMut(&Grammar) -> Verdict + 'a
{
    move |hypothesis: &Grammar| {
        let guess = EarleyRecognizer::new(hypothesis);
        samples.iter()
            .find(|s| guess.recognize(s.as_slice()) != target.recognize(s.as_slice()))
            .map_or(Verdict::Accept, |s| Verdict::Counterexample(s.clone()))
    }
}

///////////////////////////////////////////////////////////////////////////////

#[test]
fn learn_single_nonterm() {
    init_tracing();
    // S -> S S | a
    let target = GrammarBuilder::default()
      .nonterm("S")
      .terminal("a")
      .rule("S", &["S", "S"])
      .rule("S", &["a"])
      .into_grammar("S")
      .expect("Bad grammar");
    let target = EarleyRecognizer::new(&target);
    let (samples, unseen) = split(sentences(&["a", "b"], 8), 4);
    let learned = learn(&["S"], member(&target), counter(&target, &samples)).unwrap();
    assert_eq!(learned.to_string(), "S -> S S\nS -> a\n");
    let learned = EarleyRecognizer::new(&learned);
    for s in &unseen {
        assert_eq!(learned.recognize(s), target.recognize(s), "disagree on {:?}", s);
    }
}

#[test]
fn learn_balanced_parens() {
    init_tracing();
    let target = EarleyRecognizer::new(&parens());
    let (samples, unseen) = split(sentences(&["(", ")"], 12), 8);
    let learned = learn(&["S", "A", "B"], member(&target), counter(&target, &samples)).unwrap();
    assert!(learned.is_cnf());
    assert_eq!(learned.start, "S");
    // Sentences longer than anything the counterexample oracle looked at
    let learned = EarleyRecognizer::new(&learned);
    assert_eq!(unseen.len(), (9..=12).map(|n| 1 << n).sum::<usize>());
    for s in &unseen {
        assert_eq!(learned.recognize(s), target.recognize(s), "disagree on {:?}", s);
    }
    // Only the right terminal rules survive
    let mut leaves: Vec<_> = learned.grammar.rules.iter()
        .filter(|r| r.is_leaf())
        .map(|r| r.to_string())
        .collect();
    leaves.sort();
    assert_eq!(leaves, vec!["A -> (", "B -> )"]);
}

#[test]
fn learner_rounds() {
    let target = EarleyRecognizer::new(&parens());
    let samples = sentences(&["(", ")"], 6);
    let mut learner = Learner::new(&["S", "A", "B"], member(&target), counter(&target, &samples))
        .unwrap();
    assert_eq!(learner.hypothesis().len(), 27);
    assert!(learner.hypothesis().is_cnf());

    // Nothing is derivable yet, "( )" is the first miss. It gets leaves.
    assert_eq!(learner.step(), Round::Refined);
    assert_eq!(learner.rounds(), 1);
    assert_eq!(learner.hypothesis().len(), 27 + 6);
    assert!(learner.blacklist().is_empty());
    assert_eq!(learner.membership_queries(), 0);

    // Now everything is derivable and "(" is wrongly accepted
    assert_eq!(learner.step(), Round::Refined);
    assert_eq!(learner.hypothesis().len(), 27 + 5);
    let blacklist: HashSet<_> = [("S".to_string(), "(".to_string())].into();
    assert_eq!(*learner.blacklist(), blacklist);
}

#[test]
fn blacklist_only_grows() {
    let target = EarleyRecognizer::new(&parens());
    let samples = sentences(&["(", ")"], 6);
    let mut learner = Learner::new(&["S", "A", "B"], member(&target), counter(&target, &samples))
        .unwrap();
    let mut seen = HashSet::new();
    let mut size = learner.hypothesis().len();
    let learned = loop {
        assert!(learner.rounds() < 100, "learner doesn't converge");
        let round = learner.step();
        assert!(learner.blacklist().is_superset(&seen));
        seen = learner.blacklist().clone();
        // blacklisted leaves never come back
        for rule in learner.hypothesis().rules.iter().filter(|r| r.is_leaf()) {
            assert!(!seen.contains(&(rule.head.clone(), rule.spec[0].name().to_string())));
        }
        // branches never come back either
        let branches = learner.hypothesis().rules.iter().filter(|r| r.is_branch()).count();
        assert!(branches <= size);
        size = branches;
        if let Round::Accepted(grammar) = round {
            break grammar;
        }
    };
    assert!(!seen.is_empty());
    assert!(learned.rules.iter().all(|r| learner.hypothesis().contains(r)));
}

#[test]
fn membership_is_memoized() {
    let target = EarleyRecognizer::new(&parens());
    let samples = sentences(&["(", ")"], 6);
    let calls = Cell::new(0);
    let mut asked = HashSet::new();
    let oracle = |nonterm: &str, tokens: &[String]| {
        calls.set(calls.get() + 1);
        assert!(asked.insert((nonterm.to_string(), tokens.to_vec())), "asked twice");
        target.accepts(nonterm, tokens)
    };
    let mut learner = Learner::new(&["S", "A", "B"], oracle, counter(&target, &samples))
        .unwrap();
    while learner.step() == Round::Refined {
        assert!(learner.rounds() < 100, "learner doesn't converge");
    }
    assert!(calls.get() > 0);
    assert_eq!(calls.get(), learner.membership_queries());
}

#[test]
fn round_limit() {
    let target = EarleyRecognizer::new(&parens());
    let samples = sentences(&["(", ")"], 6);
    let learner = Learner::new(&["S", "A", "B"], member(&target), counter(&target, &samples))
        .unwrap()
        .with_config(LearnerConfig { max_rounds: Some(3) });
    assert_eq!(learner.run().unwrap_err(), LearnError::RoundLimit { rounds: 3 });
}

#[test]
fn no_nonterms() {
    let learned = learn::<&str, _, _>(&[], |_: &str, _: &[String]| true,
                                      |_: &Grammar| Verdict::Accept);
    assert_eq!(learned, Err(LearnError::NoNonTerminals));
    assert_eq!(LearnError::NoNonTerminals.to_string(), "no non-terminals to learn with");
}
