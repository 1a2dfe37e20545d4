//! Graphviz output, for handing an automaton to a renderer.

use std::collections::BTreeMap;
use std::fmt;

use crate::nfa::{fresh_name, FiniteAutomaton, Kind, State, Symbol};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DotOptions {
    /// `rankdir=LR`
    pub left_to_right: bool,
    /// One edge per state pair, labelled with all its symbols.
    pub merge_edges: bool,
}

/// `Display`s as a DOT digraph.
pub struct Dot<'a, K: 'a> {
    automaton: &'a FiniteAutomaton<K>,
    options: DotOptions,
}

/// DOT string literal: only `"` and `\` are escaped.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl<K: Kind> FiniteAutomaton<K> {
    pub fn dot(&self, options: DotOptions) -> Dot<K> {
        Dot {
            automaton: self,
            options: options,
        }
    }
}

impl<'a, K: Kind> fmt::Display for Dot<'a, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let aut = self.automaton;
        writeln!(f, "digraph {} {{", K::NAME)?;
        if self.options.left_to_right {
            writeln!(f, "    rankdir=LR;")?;
        }

        // Invisible node the start arrow comes from
        let entry = quote(&fresh_name("__start", |name| aut.has_state(name)));
        writeln!(f, "    {} [shape=point];", entry)?;
        for state in aut.states() {
            let shape = if aut.is_accepting_state(state) { "doublecircle" } else { "circle" };
            writeln!(f, "    {} [shape={}];", quote(state), shape)?;
        }
        writeln!(f, "    {} -> {};", entry, quote(aut.start()))?;

        if self.options.merge_edges {
            let mut edges: BTreeMap<(&State, &State), Vec<&Symbol>> = BTreeMap::new();
            for (from, symbol, to) in aut.transitions() {
                edges.entry((from, to)).or_insert_with(Vec::new).push(symbol);
            }
            for ((from, to), symbols) in edges {
                let label: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
                writeln!(f, "    {} -> {} [label={}];", quote(from), quote(to), quote(&label.join(", ")))?;
            }
        } else {
            for (from, symbol, to) in aut.transitions() {
                writeln!(f, "    {} -> {} [label={}];", quote(from), quote(to), quote(symbol))?;
            }
        }
        writeln!(f, "}}")
    }
}
