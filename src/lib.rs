//! Finite automata and right-linear grammars.
//!
//! - `NDFA` / `DFA`: one shared representation (`FiniteAutomaton`) with two
//!   acceptance strategies, see `Automaton`.
//! - Subset construction: `FiniteAutomaton::convert_to_dfa`.
//! - `Grammar`: right-linear grammars with random derivation and Chomsky
//!   classification.
//! - `convert`: grammar to DFA and automaton to grammar.
//!
//! Everything is immutable after construction; conversions build new values.

pub mod automaton;
pub mod config;
pub mod convert;
pub mod definition;
pub mod dfa;
pub mod dot;
pub mod error;
pub mod grammar;
pub mod nfa;

pub use automaton::{Automaton, Step, Trace, Verdict};
pub use config::DeriveConfig;
pub use convert::{automaton_to_grammar, grammar_to_dfa, grammar_to_ndfa};
pub use definition::AutomatonDef;
pub use dot::{Dot, DotOptions};
pub use error::{Error, Malformed, Result};
pub use grammar::{ChomskyType, Derivation, Grammar, GrammarDef, Rule};
pub use nfa::{
    Deterministic, FiniteAutomaton, Kind, NonDeterministic, State, SubsetConstruction, Symbol, DFA,
    NDFA,
};
