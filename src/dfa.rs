use bit_set::BitSet;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::nfa::{fresh_name, DFA, NDFA, State, Symbol};

/// Name the sink state added by `complete` starts from.
pub const SINK: &str = "DEAD";

impl Automaton for DFA {
    /// `None` once a symbol had no transition.
    type State = Option<usize>;

    fn start_state(&self) -> Option<usize> {
        Some(self.start)
    }

    #[inline]
    fn next_state(&self, state: &Option<usize>, symbol: usize) -> Option<usize> {
        state.and_then(|state| self.states[state].transitions[symbol].iter().next())
    }

    fn is_stuck(&self, state: &Option<usize>) -> bool {
        state.is_none()
    }

    fn is_accepting(&self, state: &Option<usize>) -> bool {
        state.map_or(false, |state| self.finals[state])
    }

    fn symbol_ref(&self, symbol: &str) -> Option<usize> {
        self.symbol_index(symbol)
    }

    fn symbol_name(&self, symbol: usize) -> &Symbol {
        &self.alphabet[symbol]
    }

    fn describe(&self, state: &Option<usize>) -> Vec<State> {
        state.iter().map(|&state| self.states[state].name.clone()).collect()
    }
}

impl DFA {
    /// Makes the transition function total.
    ///
    /// Every missing (state, symbol) pair is routed to a fresh non-accepting
    /// sink state that loops on every symbol. Returns an unchanged copy if
    /// nothing is missing.
    pub fn complete(&self) -> DFA {
        let missing = self.states.iter().any(|state| state.transitions.iter().any(|to| to.is_empty()));
        if !missing {
            return self.clone();
        }

        let sink = self.states.len();
        let mut sink_set = BitSet::with_capacity(sink + 1);
        sink_set.insert(sink);

        let mut names: Vec<State> = self.states().cloned().collect();
        names.push(fresh_name(SINK, |name| self.has_state(name)));

        let mut table: Vec<Box<[BitSet]>> = self.states
            .iter()
            .map(|state| {
                state.transitions
                    .iter()
                    .map(|to| if to.is_empty() { sink_set.clone() } else { to.clone() })
                    .collect()
            })
            .collect();
        table.push(self.alphabet.iter().map(|_| sink_set.clone()).collect());

        let mut finals = self.finals.clone();
        finals.push(false);

        DFA::from_parts(self.alphabet.clone(), names, table, self.start, finals)
    }

    pub fn into_nondeterministic(self) -> NDFA {
        self.retag()
    }
}

impl NDFA {
    /// Reinterprets the table as a DFA without renaming anything.
    ///
    /// Fails with `Error::Nondeterministic` on the first pair with more than
    /// one destination; use `convert_to_dfa` to determinize instead.
    pub fn into_deterministic(self) -> Result<DFA> {
        for state in &self.states {
            for (sym, to) in state.transitions.iter().enumerate() {
                if to.len() > 1 {
                    return Err(Error::Nondeterministic {
                        state: state.name.clone(),
                        symbol: self.alphabet[sym].clone(),
                        count: to.len(),
                    });
                }
            }
        }
        Ok(self.retag())
    }
}
