//! Error types shared by automata and grammars.

use thiserror::Error;

use crate::nfa::{State, Symbol};

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An input symbol is not part of the automaton's alphabet.
    #[error("invalid symbol {symbol:?} at position {position}: not in the alphabet")]
    InvalidSymbol { symbol: Symbol, position: usize },

    #[error("unknown state {state:?}")]
    UnknownState { state: State },

    #[error("symbol {symbol:?} is not part of the alphabet")]
    UnknownSymbol { symbol: Symbol },

    /// A deterministic automaton would need more than one destination.
    #[error("state {state:?} has {count} destinations on {symbol:?}")]
    Nondeterministic {
        state: State,
        symbol: Symbol,
        count: usize,
    },

    #[error("malformed grammar: {0}")]
    MalformedGrammar(#[from] Malformed),

    /// Production of a grammar built with `Grammar::new_unchecked` that has no automaton counterpart.
    #[error("production {lhs} → {rhs:?} is not right-linear")]
    NotRegular { lhs: Symbol, rhs: String },

    #[error("derivation stalled after {steps} steps at {form:?}")]
    DerivationStalled { steps: usize, form: String },
}

/// Ways a grammar definition can violate the right-linear shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Malformed {
    #[error("symbols must not be empty")]
    EmptySymbol,

    #[error("start symbol {start:?} is not a declared non-terminal")]
    StartNotDeclared { start: Symbol },

    #[error("{symbol:?} is declared both as terminal and non-terminal")]
    OverlappingSymbols { symbol: Symbol },

    #[error("left-hand side {lhs:?} is not a declared non-terminal")]
    UnknownLeftHandSide { lhs: Symbol },

    #[error("{lhs} → {rhs:?} does not start with a terminal")]
    MissingTerminal { lhs: Symbol, rhs: String },

    #[error("{lhs} → {rhs:?}: {rest:?} is not a declared non-terminal")]
    UnknownRemainder {
        lhs: Symbol,
        rhs: String,
        rest: String,
    },
}
