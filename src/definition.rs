//! Literal automaton definitions.
//!
//! `AutomatonDef` is the plain, serializable shape an automaton is written
//! down in. It carries no invariants of its own; `FiniteAutomaton::new`
//! checks them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::nfa::{FiniteAutomaton, Kind, State, Symbol};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDef {
    pub states: BTreeSet<State>,
    pub alphabet: BTreeSet<Symbol>,
    /// state -> symbol -> destinations
    #[serde(default)]
    pub transitions: BTreeMap<State, BTreeMap<Symbol, BTreeSet<State>>>,
    pub start: State,
    #[serde(default)]
    pub accepting: BTreeSet<State>,
}

impl AutomatonDef {
    /// A definition with a single state, which is also the start state.
    pub fn new<S: Into<State>>(start: S) -> Self {
        let start = start.into();
        AutomatonDef {
            states: Some(start.clone()).into_iter().collect(),
            start: start,
            ..AutomatonDef::default()
        }
    }

    pub fn state<S: Into<State>>(mut self, state: S) -> Self {
        self.states.insert(state.into());
        self
    }

    pub fn symbol<S: Into<Symbol>>(mut self, symbol: S) -> Self {
        self.alphabet.insert(symbol.into());
        self
    }

    /// Adds `from --on--> to`, declaring both states and the symbol.
    pub fn transition<F, O, T>(mut self, from: F, on: O, to: T) -> Self
        where F: Into<State>,
              O: Into<Symbol>,
              T: Into<State>
    {
        let (from, on, to) = (from.into(), on.into(), to.into());
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.alphabet.insert(on.clone());
        self.transitions
            .entry(from)
            .or_insert_with(BTreeMap::new)
            .entry(on)
            .or_insert_with(BTreeSet::new)
            .insert(to);
        self
    }

    pub fn accept<S: Into<State>>(mut self, state: S) -> Self {
        let state = state.into();
        self.states.insert(state.clone());
        self.accepting.insert(state);
        self
    }

    pub fn build<K: Kind>(self) -> Result<FiniteAutomaton<K>> {
        FiniteAutomaton::new(self)
    }
}

impl<K: Kind> Serialize for FiniteAutomaton<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
        self.definition().serialize(serializer)
    }
}

impl<'de, K: Kind> Deserialize<'de> for FiniteAutomaton<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
        let def = AutomatonDef::deserialize(deserializer)?;
        FiniteAutomaton::new(def).map_err(serde::de::Error::custom)
    }
}
