//! Conversions between right-linear grammars and finite automata.

use std::collections::HashMap;

use tracing::debug;

use crate::definition::AutomatonDef;
use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarDef, Rule};
use crate::nfa::{fresh_name, FiniteAutomaton, Kind, DFA, NDFA};

/// Name the accepting state added by `grammar_to_ndfa` starts from.
pub const FINAL: &str = "FINAL";

/// Transition table of a grammar.
///
/// States are the non-terminals plus a fresh accepting `FINAL` state.
/// `A → a` becomes `A --a--> FINAL`, `A → aB` becomes `A --a--> B` and
/// `A → ε` makes `A` accepting. Several productions may share a
/// (state, symbol) pair, hence the NDFA.
pub fn grammar_to_ndfa(grammar: &Grammar) -> Result<NDFA> {
    let final_state = fresh_name(FINAL, |name| {
        grammar.non_terminals().contains(name) || grammar.terminals().contains(name)
    });

    let mut def = AutomatonDef::new(grammar.start().clone()).accept(final_state.clone());
    def.states.extend(grammar.non_terminals().iter().cloned());
    def.alphabet.extend(grammar.terminals().iter().cloned());

    for (lhs, rhss) in grammar.productions() {
        for rhs in rhss {
            let rule = match grammar.rule(rhs) {
                Some(rule) if grammar.non_terminals().contains(lhs) => rule,
                _ => {
                    return Err(Error::NotRegular {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    })
                }
            };
            def = match rule {
                Rule::Empty => def.accept(lhs.clone()),
                Rule::Terminal(a) => def.transition(lhs.clone(), a, final_state.clone()),
                Rule::Continue(a, b) => def.transition(lhs.clone(), a, b),
            };
        }
    }

    NDFA::new(def)
}

/// Equivalent DFA of a grammar.
///
/// When no two productions of a non-terminal start with the same terminal,
/// the table of `grammar_to_ndfa` is already deterministic and keeps the
/// non-terminal names; otherwise it goes through subset construction.
pub fn grammar_to_dfa(grammar: &Grammar) -> Result<DFA> {
    let ndfa = grammar_to_ndfa(grammar)?;
    if ndfa.is_unambiguous() {
        return ndfa.into_deterministic();
    }
    debug!(start = %grammar.start(), "grammar table is ambiguous, determinizing");
    Ok(ndfa.convert_to_dfa())
}

/// Right-linear grammar generating the language of `automaton`.
///
/// Every state gets a fresh non-terminal (`A0`, `A1`, ... in state order,
/// with a letter that occurs in no terminal, primed if a terminal still
/// takes the name). `S --a--> T` yields `S → aT`,
/// plus `S → a` when `T` accepts; accepting states also get `S → ε`.
pub fn automaton_to_grammar<K: Kind>(automaton: &FiniteAutomaton<K>) -> Result<Grammar> {
    let alphabet = automaton.alphabet();
    let prefix = (b'A'..=b'Z')
        .map(|c| (c as char).to_string())
        .find(|p| !alphabet.iter().any(|sym| sym.contains(p.as_str())))
        .unwrap_or_else(|| "N".to_string());
    let names: HashMap<&str, String> = automaton.states()
        .enumerate()
        .map(|(n, state)| {
            let base = format!("{}{}", prefix, n);
            let name = fresh_name(&base, |name| alphabet.iter().any(|sym| sym == name));
            (state.as_str(), name)
        })
        .collect();

    let mut def = GrammarDef::new(names[automaton.start().as_str()].clone())
        .non_terminals(names.values().cloned())
        .terminals(automaton.alphabet().iter().cloned());

    for (from, symbol, to) in automaton.transitions() {
        let mut rhss = vec![format!("{}{}", symbol, names[to.as_str()])];
        if automaton.is_accepting_state(to) {
            rhss.push(symbol.clone());
        }
        def = def.productions(names[from.as_str()].clone(), rhss);
    }
    for state in automaton.accepting() {
        def = def.productions(names[state.as_str()].clone(), Some(String::new()));
    }

    Grammar::new(def)
}

impl Grammar {
    /// See `grammar_to_dfa`.
    pub fn convert_to_dfa(&self) -> Result<DFA> {
        grammar_to_dfa(self)
    }
}

impl<K: Kind> FiniteAutomaton<K> {
    /// See `automaton_to_grammar`.
    pub fn convert_to_regular_grammar(&self) -> Result<Grammar> {
        automaton_to_grammar(self)
    }
}
