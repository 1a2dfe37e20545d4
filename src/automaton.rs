use std::fmt::Debug;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::nfa::{State, Symbol};

/// Acceptance strategy of a finite automaton.
///
/// Implementors decide what an "active state" is (a single state for a DFA,
/// a set of states for an NDFA); string acceptance is written once on top of
/// that in `validate` and `trace`.
pub trait Automaton {
    type State: Debug;

    fn start_state(&self) -> Self::State;

    /// Consumes the symbol with index `symbol` into the alphabet.
    fn next_state(&self, state: &Self::State, symbol: usize) -> Self::State;

    /// No further input can lead to acceptance.
    fn is_stuck(&self, state: &Self::State) -> bool;

    fn is_accepting(&self, state: &Self::State) -> bool;

    fn symbol_ref(&self, symbol: &str) -> Option<usize>;

    fn symbol_name(&self, symbol: usize) -> &Symbol;

    /// Names of the states that are active in `state`.
    fn describe(&self, state: &Self::State) -> Vec<State>;

    /// Runs the automaton over `input`.
    ///
    /// Every symbol is checked against the alphabet before the run starts, so
    /// an unknown symbol anywhere yields `Error::InvalidSymbol`.
    fn validate<I>(&self, input: I) -> Result<bool>
        where I: IntoIterator,
              I::Item: AsRef<str>,
              Self: Sized
    {
        let symbols = resolve(self, input)?;
        let mut state = self.start_state();
        for symbol in symbols {
            state = self.next_state(&state, symbol);
            // No implicit dead state: reject as soon as nothing is active.
            if self.is_stuck(&state) {
                return Ok(false);
            }
        }
        Ok(self.is_accepting(&state))
    }

    /// `validate` with one symbol per `char`.
    fn validate_str(&self, input: &str) -> Result<bool>
        where Self: Sized
    {
        self.validate(input.chars().map(String::from))
    }

    /// Like `validate`, but records the active states after every step.
    fn trace<I>(&self, input: I) -> Result<Trace>
        where I: IntoIterator,
              I::Item: AsRef<str>,
              Self: Sized
    {
        let symbols = resolve(self, input)?;
        let mut state = self.start_state();
        let mut steps = vec![Step {
                                 symbol: None,
                                 active: self.describe(&state),
                             }];
        for (position, symbol) in symbols.into_iter().enumerate() {
            state = self.next_state(&state, symbol);
            steps.push(Step {
                symbol: Some(self.symbol_name(symbol).clone()),
                active: self.describe(&state),
            });
            if self.is_stuck(&state) {
                return Ok(Trace {
                    steps: steps,
                    verdict: Verdict::Stuck { position: position },
                });
            }
        }
        let verdict = if self.is_accepting(&state) {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        };
        Ok(Trace {
            steps: steps,
            verdict: verdict,
        })
    }

    fn trace_str(&self, input: &str) -> Result<Trace>
        where Self: Sized
    {
        self.trace(input.chars().map(String::from))
    }
}

fn resolve<A, I>(automaton: &A, input: I) -> Result<Vec<usize>>
    where A: Automaton,
          I: IntoIterator,
          I::Item: AsRef<str>
{
    input.into_iter()
        .enumerate()
        .map(|(position, symbol)| {
            let symbol = symbol.as_ref();
            automaton.symbol_ref(symbol).ok_or_else(|| {
                Error::InvalidSymbol {
                    symbol: symbol.to_string(),
                    position: position,
                }
            })
        })
        .collect()
}

/// Step-by-step record of a single run, for diagnostic display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// The first step is the start configuration and carries no symbol.
    pub steps: Vec<Step>,
    pub verdict: Verdict,
}

impl Trace {
    pub fn accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    pub symbol: Option<Symbol>,
    pub active: Vec<State>,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Accepted,
    /// All input consumed, but no accepting state is active.
    Rejected,
    /// No transition for the symbol at `position`.
    Stuck { position: usize },
}
