use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;

use bit_set::BitSet;
use bit_vec::BitVec;
use tracing::{debug, trace};

use crate::automaton::Automaton;
use crate::definition::AutomatonDef;
use crate::error::{Error, Result};

/// Opaque state identifier, unique within one automaton.
pub type State = String;
/// Opaque alphabet symbol.
pub type Symbol = String;

type StateRef = usize;

/// Selects the acceptance strategy of a `FiniteAutomaton`.
pub trait Kind {
    const DETERMINISTIC: bool;
    const NAME: &'static str;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deterministic {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NonDeterministic {}

impl Kind for Deterministic {
    const DETERMINISTIC: bool = true;
    const NAME: &'static str = "DFA";
}

impl Kind for NonDeterministic {
    const DETERMINISTIC: bool = false;
    const NAME: &'static str = "NDFA";
}

pub type DFA = FiniteAutomaton<Deterministic>;
pub type NDFA = FiniteAutomaton<NonDeterministic>;

#[derive(Clone, Debug)]
pub(crate) struct StateData {
    pub(crate) name: State,
    // symbol index -> destinations
    pub(crate) transitions: Box<[BitSet]>,
}

/// States, alphabet, transition relation, start state and accept states.
///
/// Both flavors share this representation and only differ in how input is
/// accepted (see the `Automaton` impls). Values are immutable once built,
/// either from an `AutomatonDef` or by one of the converters.
#[derive(Clone, Debug)]
pub struct FiniteAutomaton<K> {
    pub(crate) alphabet: Vec<Symbol>,
    pub(crate) states: Vec<StateData>,
    pub(crate) start: StateRef,
    pub(crate) finals: BitVec,
    state_refs: HashMap<State, StateRef>,
    symbol_refs: HashMap<Symbol, usize>,
    kind: PhantomData<K>,
}

/// Result of `subset_construction`.
#[derive(Clone, Debug)]
pub struct SubsetConstruction {
    pub dfa: DFA,
    /// For every DFA state, the original states it stands for.
    pub subsets: BTreeMap<State, BTreeSet<State>>,
}

pub(crate) fn empty_row(symbols: usize) -> Box<[BitSet]> {
    (0..symbols).map(|_| BitSet::new()).collect()
}

/// `base`, primed until `taken` no longer claims it.
pub(crate) fn fresh_name<F>(base: &str, taken: F) -> String
    where F: Fn(&str) -> bool
{
    let mut name = base.to_string();
    while taken(&name) {
        name.push('\'');
    }
    name
}

impl<K: Kind> FiniteAutomaton<K> {
    /// Builds an automaton from its literal definition.
    ///
    /// Fails if the start state, an accept state or a transition refers to an
    /// undeclared state or symbol, and, for a DFA, if a pair has more than one
    /// destination.
    pub fn new(def: AutomatonDef) -> Result<Self> {
        let AutomatonDef { states, alphabet, transitions, start, accepting } = def;
        let names: Vec<State> = states.into_iter().collect();
        let alphabet: Vec<Symbol> = alphabet.into_iter().collect();

        let (start, finals, table) = {
            let state_refs: HashMap<&str, StateRef> =
                names.iter().enumerate().map(|(n, name)| (name.as_str(), n)).collect();
            let lookup = |state: &State| {
                state_refs.get(state.as_str())
                    .cloned()
                    .ok_or_else(|| Error::UnknownState { state: state.clone() })
            };

            let start = lookup(&start)?;
            let mut finals = BitVec::from_elem(names.len(), false);
            for state in &accepting {
                finals.set(lookup(state)?, true);
            }

            let mut table: Vec<Box<[BitSet]>> =
                (0..names.len()).map(|_| empty_row(alphabet.len())).collect();
            for (from, row) in &transitions {
                let from_ref = lookup(from)?;
                for (symbol, targets) in row {
                    let symbol_ref = alphabet.binary_search(symbol)
                        .map_err(|_| Error::UnknownSymbol { symbol: symbol.clone() })?;
                    if K::DETERMINISTIC && targets.len() > 1 {
                        return Err(Error::Nondeterministic {
                            state: from.clone(),
                            symbol: symbol.clone(),
                            count: targets.len(),
                        });
                    }
                    for to in targets {
                        table[from_ref][symbol_ref].insert(lookup(to)?);
                    }
                }
            }
            (start, finals, table)
        };

        Ok(Self::from_parts(alphabet, names, table, start, finals))
    }

    /// Assembles an automaton whose invariants already hold.
    pub(crate) fn from_parts(alphabet: Vec<Symbol>,
                             names: Vec<State>,
                             table: Vec<Box<[BitSet]>>,
                             start: StateRef,
                             finals: BitVec)
                             -> Self {
        let state_refs = names.iter().cloned().enumerate().map(|(n, name)| (name, n)).collect();
        let symbol_refs = alphabet.iter().cloned().enumerate().map(|(n, sym)| (sym, n)).collect();
        let states = names.into_iter()
            .zip(table)
            .map(|(name, transitions)| {
                StateData {
                    name: name,
                    transitions: transitions,
                }
            })
            .collect();
        FiniteAutomaton {
            alphabet: alphabet,
            states: states,
            start: start,
            finals: finals,
            state_refs: state_refs,
            symbol_refs: symbol_refs,
            kind: PhantomData,
        }
    }

    /// Same automaton under the other acceptance strategy. Callers check invariants.
    pub(crate) fn retag<L: Kind>(self) -> FiniteAutomaton<L> {
        FiniteAutomaton {
            alphabet: self.alphabet,
            states: self.states,
            start: self.start,
            finals: self.finals,
            state_refs: self.state_refs,
            symbol_refs: self.symbol_refs,
            kind: PhantomData,
        }
    }

    /// Exports the literal definition, e.g. for a renderer.
    pub fn definition(&self) -> AutomatonDef {
        let mut transitions = BTreeMap::new();
        for state in &self.states {
            let row: BTreeMap<Symbol, BTreeSet<State>> = state.transitions
                .iter()
                .enumerate()
                .filter(|&(_, to)| !to.is_empty())
                .map(|(sym, to)| (self.alphabet[sym].clone(), self.names(to).cloned().collect()))
                .collect();
            if !row.is_empty() {
                transitions.insert(state.name.clone(), row);
            }
        }
        AutomatonDef {
            states: self.states().cloned().collect(),
            alphabet: self.alphabet.iter().cloned().collect(),
            transitions: transitions,
            start: self.start().clone(),
            accepting: self.accepting().cloned().collect(),
        }
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter().map(|state| &state.name)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn start(&self) -> &State {
        &self.states[self.start].name
    }

    pub fn accepting(&self) -> impl Iterator<Item = &State> {
        self.states
            .iter()
            .enumerate()
            .filter(move |&(n, _)| self.finals[n])
            .map(|(_, state)| &state.name)
    }

    pub fn is_accepting_state(&self, state: &str) -> bool {
        self.state_refs.get(state).map_or(false, |&n| self.finals[n])
    }

    /// Destinations of `state` on `symbol`; empty for unknown states or symbols.
    pub fn destinations(&self, state: &str, symbol: &str) -> Vec<&State> {
        match (self.state_refs.get(state), self.symbol_refs.get(symbol)) {
            (Some(&from), Some(&sym)) => self.names(&self.states[from].transitions[sym]).collect(),
            _ => Vec::new(),
        }
    }

    /// Every `(from, symbol, to)` triple of the transition relation.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, &Symbol, &State)> {
        self.states.iter().flat_map(move |state| {
            state.transitions
                .iter()
                .enumerate()
                .flat_map(move |(sym, to)| {
                    to.iter().map(move |to| (&state.name, &self.alphabet[sym], &self.states[to].name))
                })
        })
    }

    /// True iff every state with at least one outgoing transition has exactly
    /// one destination for every symbol of the alphabet.
    ///
    /// States without any transitions are skipped, matching the acceptance
    /// rule where a missing transition means rejection.
    pub fn is_deterministic(&self) -> bool {
        self.states
            .iter()
            .filter(|state| state.transitions.iter().any(|to| !to.is_empty()))
            .all(|state| state.transitions.iter().all(|to| to.len() == 1))
    }

    /// True iff no (state, symbol) pair has more than one destination.
    pub fn is_unambiguous(&self) -> bool {
        self.states.iter().all(|state| state.transitions.iter().all(|to| to.len() <= 1))
    }

    /// Equivalent DFA by subset construction.
    pub fn convert_to_dfa(&self) -> DFA {
        self.subset_construction().dfa
    }

    /// Breadth-first powerset construction over the reachable state-sets.
    ///
    /// DFA states are named `q0, q1, ...` in discovery order, `q0` being the
    /// set holding only the start state. Empty sets get no state: the
    /// resulting DFA is partial.
    pub fn subset_construction(&self) -> SubsetConstruction {
        let mut subsets: Vec<BitSet> = Vec::new();
        // Sorted members -> DFA state
        let mut subset_refs: HashMap<Vec<StateRef>, StateRef> = HashMap::new();
        let mut table: Vec<Box<[BitSet]>> = Vec::new();

        let start = self.singleton(self.start);
        subset_refs.insert(start.iter().collect(), 0);
        subsets.push(start);
        table.push(empty_row(self.alphabet.len()));

        let mut worklist = VecDeque::new();
        worklist.push_back(0);
        while let Some(cur) = worklist.pop_front() {
            for symbol in 0..self.alphabet.len() {
                let nxt_states = self.step(&subsets[cur], symbol);

                // Skip the stuck state
                if nxt_states.is_empty() {
                    continue;
                }

                let members: Vec<StateRef> = nxt_states.iter().collect();
                let nxt = match subset_refs.get(&members) {
                    Some(&nxt) => nxt,
                    None => {
                        let nxt = subsets.len();
                        trace!(dfa_state = nxt, subset = ?self.names(&nxt_states).collect::<Vec<_>>(),
                               "discovered state-set");
                        subset_refs.insert(members, nxt);
                        subsets.push(nxt_states);
                        table.push(empty_row(self.alphabet.len()));
                        worklist.push_back(nxt);
                        nxt
                    }
                };
                table[cur][symbol].insert(nxt);
            }
        }

        let finals: BitVec = subsets.iter().map(|set| set.iter().any(|s| self.finals[s])).collect();
        let names: Vec<State> = (0..subsets.len()).map(|n| format!("q{}", n)).collect();
        debug!(source_states = self.states.len(), dfa_states = subsets.len(), "subset construction finished");

        let subsets: BTreeMap<State, BTreeSet<State>> = names.iter()
            .cloned()
            .zip(subsets.iter().map(|set| self.names(set).cloned().collect()))
            .collect();
        SubsetConstruction {
            dfa: FiniteAutomaton::from_parts(self.alphabet.clone(), names, table, 0, finals),
            subsets: subsets,
        }
    }

    #[inline]
    pub(crate) fn step(&self, states: &BitSet, symbol: usize) -> BitSet {
        let mut nxt_states = BitSet::with_capacity(self.states.len());
        for state in states {
            nxt_states.union_with(&self.states[state].transitions[symbol]);
        }
        nxt_states
    }

    pub(crate) fn singleton(&self, state: StateRef) -> BitSet {
        let mut set = BitSet::with_capacity(self.states.len());
        set.insert(state);
        set
    }

    pub(crate) fn names<'a>(&'a self, set: &'a BitSet) -> impl Iterator<Item = &'a State> + 'a {
        set.iter().map(move |n| &self.states[n].name)
    }

    pub(crate) fn has_state(&self, name: &str) -> bool {
        self.state_refs.contains_key(name)
    }

    pub(crate) fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbol_refs.get(symbol).cloned()
    }
}

impl Automaton for NDFA {
    type State = BitSet;

    fn start_state(&self) -> BitSet {
        self.singleton(self.start)
    }

    #[inline]
    fn next_state(&self, states: &BitSet, symbol: usize) -> BitSet {
        self.step(states, symbol)
    }

    fn is_stuck(&self, states: &BitSet) -> bool {
        states.is_empty()
    }

    fn is_accepting(&self, states: &BitSet) -> bool {
        states.iter().any(|state| self.finals[state])
    }

    fn symbol_ref(&self, symbol: &str) -> Option<usize> {
        self.symbol_index(symbol)
    }

    fn symbol_name(&self, symbol: usize) -> &Symbol {
        &self.alphabet[symbol]
    }

    fn describe(&self, states: &BitSet) -> Vec<State> {
        self.names(states).cloned().collect()
    }
}

impl<K: Kind> fmt::Display for FiniteAutomaton<K> {
    /// Transition table, one `from --(symbol)--> to, ...` line per pair.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let accepting: Vec<&str> = self.accepting().map(|s| s.as_str()).collect();
        writeln!(f, "{} (start: {}, accepting: {{{}}})", K::NAME, self.start(), accepting.join(", "))?;
        for state in &self.states {
            for (sym, to) in state.transitions.iter().enumerate() {
                if to.is_empty() {
                    continue;
                }
                let to: Vec<&str> = self.names(to).map(|s| s.as_str()).collect();
                writeln!(f, "  {} --({})--> {}", state.name, self.alphabet[sym], to.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<State> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn variant() -> NDFA {
        AutomatonDef::new("q0")
            .state("q1")
            .state("q2")
            .state("q3")
            .transition("q0", "a", "q0")
            .transition("q0", "a", "q1")
            .transition("q1", "c", "q1")
            .transition("q1", "b", "q2")
            .transition("q2", "b", "q3")
            .transition("q3", "a", "q1")
            .accept("q2")
            .build()
            .unwrap()
    }

    #[test]
    fn accessors_follow_definition() {
        let nfa = variant();
        assert_eq!(nfa.states().collect::<Vec<_>>(), ["q0", "q1", "q2", "q3"]);
        assert_eq!(nfa.alphabet(), ["a", "b", "c"]);
        assert_eq!(nfa.start(), "q0");
        assert_eq!(nfa.accepting().collect::<Vec<_>>(), ["q2"]);
        assert_eq!(nfa.destinations("q0", "a"), ["q0", "q1"]);
        assert!(nfa.destinations("q0", "b").is_empty());
        assert!(nfa.destinations("nope", "a").is_empty());
        assert_eq!(nfa.transitions().count(), 6);
    }

    #[test]
    fn definition_round_trips() {
        let nfa = variant();
        let again = NDFA::new(nfa.definition()).unwrap();
        assert_eq!(again.definition(), nfa.definition());
    }

    #[test]
    fn rejects_undeclared_references() {
        let mut def = AutomatonDef::new("q0");
        def.accepting.insert("q9".to_string());
        assert_eq!(NDFA::new(def).unwrap_err(),
                   Error::UnknownState { state: "q9".to_string() });

        let mut def = AutomatonDef::new("q0");
        def.transitions
            .entry("q0".to_string())
            .or_insert_with(BTreeMap::new)
            .insert("x".to_string(), BTreeSet::new());
        assert_eq!(NDFA::new(def).unwrap_err(),
                   Error::UnknownSymbol { symbol: "x".to_string() });

        let mut def = AutomatonDef::new("q0");
        def.start = "q1".to_string();
        assert!(matches!(NDFA::new(def), Err(Error::UnknownState { .. })));
    }

    #[test]
    fn dfa_definition_must_be_unambiguous() {
        let def = variant().definition();
        assert_eq!(DFA::new(def).unwrap_err(),
                   Error::Nondeterministic {
                       state: "q0".to_string(),
                       symbol: "a".to_string(),
                       count: 2,
                   });
    }

    #[test]
    fn determinism_checks() {
        let nfa = variant();
        assert!(!nfa.is_deterministic());
        assert!(!nfa.is_unambiguous());

        // q1 is left without transitions and does not count against totality.
        let total: DFA = AutomatonDef::new("q0")
            .state("q1")
            .transition("q0", "a", "q1")
            .transition("q0", "b", "q0")
            .build()
            .unwrap();
        assert!(total.is_deterministic());

        let partial: DFA = AutomatonDef::new("q0")
            .symbol("b")
            .transition("q0", "a", "q0")
            .build()
            .unwrap();
        assert!(!partial.is_deterministic());
        assert!(partial.is_unambiguous());
    }

    #[test]
    fn subset_construction_names_sets_in_discovery_order() {
        let SubsetConstruction { dfa, subsets } = variant().subset_construction();
        assert_eq!(dfa.start(), "q0");
        assert_eq!(subsets["q0"], set(&["q0"]));
        assert_eq!(subsets["q1"], set(&["q0", "q1"]));
        assert_eq!(subsets["q2"], set(&["q2"]));
        assert_eq!(subsets["q3"], set(&["q1"]));
        assert_eq!(subsets["q4"], set(&["q3"]));
        assert!(dfa.is_unambiguous());
        // {q2} is the only accepting subset
        let accepting: Vec<_> = dfa.accepting().collect();
        assert_eq!(accepting.len(), 1);
        assert!(subsets[accepting[0]].contains("q2"));
    }

    #[test]
    fn ndfa_acceptance() {
        let nfa = variant();
        assert_eq!(nfa.validate_str("ab"), Ok(true));
        assert_eq!(nfa.validate_str("acccb"), Ok(true));
        assert_eq!(nfa.validate_str("abba"), Ok(false));
        assert_eq!(nfa.validate_str("b"), Ok(false));
        assert_eq!(nfa.validate(vec!["a", "a", "b"]), Ok(true));
    }

    #[test]
    fn display_lists_transitions() {
        let text = variant().to_string();
        assert!(text.starts_with("NDFA (start: q0, accepting: {q2})"));
        assert!(text.contains("  q0 --(a)--> q0, q1\n"));
        assert!(text.contains("  q3 --(a)--> q1\n"));
    }

    #[test]
    fn fresh_names_avoid_collisions() {
        assert_eq!(fresh_name("FINAL", |n| n == "FINAL"), "FINAL'");
        assert_eq!(fresh_name("FINAL", |_| false), "FINAL");
    }
}
