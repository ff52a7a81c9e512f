#![deny(warnings)]

use crate::grammar::{Grammar, Rule, Symbol};
use crate::trees::Derivation;
use std::collections::HashMap;
use std::rc::Rc;


/// Which non-terminals derive the empty sequence, and how cheaply.
///
/// For every nullable non-terminal we keep the fewest derivation steps
/// needed to reach ε and the rule that achieves it (its witness). The
/// recognizer charges that cost when it skips over a nullable symbol and
/// uses the witness to rebuild the skipped subtree.
#[derive(Clone, Debug, Default)]
pub struct Nullable {
    witnesses: HashMap<String, (usize, Rc<Rule>)>,
}

impl Nullable {
    pub fn analyze(grammar: &Grammar) -> Self {
        let mut witnesses: HashMap<String, (usize, Rc<Rule>)> = HashMap::new();
        // Costs only ever shrink and are bounded below so this settles
        loop {
            let mut changed = false;
            for rule in &grammar.rules {
                let cost = rule.spec.iter().try_fold(1, |acc, sym| match sym {
                    Symbol::Term(_) => None,
                    Symbol::NonTerm(name) => witnesses.get(name).map(|(c, _)| acc + c),
                });
                let Some(cost) = cost else { continue };
                if witnesses.get(&rule.head).is_none_or(|(known, _)| cost < *known) {
                    witnesses.insert(rule.head.clone(), (cost, rule.clone()));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Nullable { witnesses }
    }

    pub fn is_nullable(&self, nonterm: &str) -> bool {
        self.witnesses.contains_key(nonterm)
    }

    /// Fewest derivation steps for `nonterm` to derive ε
    pub fn cost(&self, nonterm: &str) -> Option<usize> {
        self.witnesses.get(nonterm).map(|(cost, _)| *cost)
    }

    /// Cheapest derivation of ε from `nonterm`, placed at input position `at`
    pub fn derive_empty(&self, nonterm: &str, at: usize) -> Option<Derivation> {
        let (_, rule) = self.witnesses.get(nonterm)?;
        // witness children are strictly cheaper so recursion bottoms out
        let children = rule.spec.iter()
            .map(|sym| self.derive_empty(sym.name(), at))
            .collect::<Option<Vec<_>>>()?;
        Some(Derivation { rule: rule.clone(), start: at, end: at, children })
    }
}

/// Drop empty alternatives. Nullability must be analyzed beforehand
/// since the recognizer makes up for the removed rules through it.
pub fn epsilon_free(grammar: &Grammar) -> Grammar {
    Grammar {
        start: grammar.start.clone(),
        rules: grammar.rules.iter().filter(|rule| !rule.is_empty()).cloned().collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::{Nullable, epsilon_free};
    use crate::grammar::{Grammar, GrammarBuilder};

    fn grammar() -> Grammar {
        // S -> A B | b;  A -> <e> | B;  B -> A A | a;  C -> S
        GrammarBuilder::default()
            .nonterm("S").nonterm("A").nonterm("B").nonterm("C")
            .terminal("a").terminal("b")
            .rule("S", &["A", "B"])
            .rule("S", &["b"])
            .rule::<_, &str>("A", &[])
            .rule("A", &["B"])
            .rule("B", &["A", "A"])
            .rule("B", &["a"])
            .rule("C", &["S"])
            .into_grammar("S")
            .unwrap()
    }

    #[test]
    fn nullable_symbols() {
        let nullable = Nullable::analyze(&grammar());
        for nt in ["S", "A", "B", "C"] {
            assert!(nullable.is_nullable(nt), "{} should be nullable", nt);
        }
        assert!(!nullable.is_nullable("a"));
        assert_eq!(nullable.cost("A"), Some(1));
        // B -> A A -> ε ε
        assert_eq!(nullable.cost("B"), Some(3));
        // S -> A B
        assert_eq!(nullable.cost("S"), Some(5));
        assert_eq!(nullable.cost("C"), Some(6));
    }

    #[test]
    fn nothing_nullable() {
        let g = GrammarBuilder::default()
            .nonterm("S").terminal("a")
            .rule("S", &["S", "a"])
            .rule("S", &["a"])
            .into_grammar("S")
            .unwrap();
        let nullable = Nullable::analyze(&g);
        assert!(!nullable.is_nullable("S"));
        assert!(nullable.derive_empty("S", 0).is_none());
    }

    #[test]
    fn empty_derivation_tree() {
        let nullable = Nullable::analyze(&grammar());
        let tree = nullable.derive_empty("B", 4).unwrap();
        assert_eq!(tree.rule.to_string(), "B -> A A");
        assert_eq!(tree.span(), 4..4);
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children.iter().all(|c| c.rule.to_string() == "A -> "));
        assert_eq!(tree.nodes().count(), 3);
    }

    #[test]
    fn removes_only_empty_rules() {
        let g = grammar();
        let free = epsilon_free(&g);
        assert_eq!(free.len(), g.len() - 1);
        assert!(free.rules.iter().all(|rule| !rule.is_empty()));
        assert_eq!(free.start, "S");
    }
}
