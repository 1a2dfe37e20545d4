//! Right-linear grammars.
//!
//! Every production has the shape `A → a`, `A → aB` or `A → ε`, where `a` is
//! a terminal and `B` a non-terminal. Symbols are opaque strings, so a
//! right-hand side like `"aP"` is split by matching a declared terminal
//! prefix and checking that the whole remainder names a non-terminal.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use crate::config::DeriveConfig;
use crate::error::{Error, Malformed, Result};
use crate::nfa::Symbol;

/// Literal grammar definition. Right-hand sides are plain strings, `""` is ε.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDef {
    pub non_terminals: BTreeSet<Symbol>,
    pub terminals: BTreeSet<Symbol>,
    #[serde(default)]
    pub productions: BTreeMap<Symbol, BTreeSet<String>>,
    pub start: Symbol,
}

impl GrammarDef {
    /// A definition whose only non-terminal is the start symbol.
    pub fn new<S: Into<Symbol>>(start: S) -> Self {
        let start = start.into();
        GrammarDef {
            non_terminals: Some(start.clone()).into_iter().collect(),
            start: start,
            ..GrammarDef::default()
        }
    }

    pub fn non_terminals<I>(mut self, symbols: I) -> Self
        where I: IntoIterator,
              I::Item: Into<Symbol>
    {
        self.non_terminals.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn terminals<I>(mut self, symbols: I) -> Self
        where I: IntoIterator,
              I::Item: Into<Symbol>
    {
        self.terminals.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Adds `lhs → rhs` for every right-hand side given.
    pub fn productions<L, I>(mut self, lhs: L, rhss: I) -> Self
        where L: Into<Symbol>,
              I: IntoIterator,
              I::Item: Into<String>
    {
        self.productions
            .entry(lhs.into())
            .or_insert_with(BTreeSet::new)
            .extend(rhss.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<Grammar> {
        Grammar::new(self)
    }
}

/// One right-linear right-hand side, split into its symbols.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rule<'a> {
    Empty,
    /// `A → a`
    Terminal(&'a str),
    /// `A → aB`
    Continue(&'a str, &'a str),
}

fn parse_rule<'a>(rhs: &'a str,
                  terminals: &BTreeSet<Symbol>,
                  non_terminals: &BTreeSet<Symbol>)
                  -> Option<Rule<'a>> {
    if rhs.is_empty() {
        return Some(Rule::Empty);
    }
    let mut prefixes: Vec<usize> = terminals.iter()
        .filter(|t| !t.is_empty() && rhs.starts_with(t.as_str()))
        .map(|t| t.len())
        .collect();
    prefixes.sort_by(|a, b| b.cmp(a));
    prefixes.into_iter().filter_map(|len| {
        let (terminal, rest) = rhs.split_at(len);
        if rest.is_empty() {
            Some(Rule::Terminal(terminal))
        } else if non_terminals.contains(rest) {
            Some(Rule::Continue(terminal, rest))
        } else {
            None
        }
    }).next()
}

fn check(def: &GrammarDef) -> ::std::result::Result<(), Malformed> {
    if def.non_terminals.iter().chain(&def.terminals).any(|s| s.is_empty()) {
        return Err(Malformed::EmptySymbol);
    }
    if let Some(symbol) = def.terminals.intersection(&def.non_terminals).next() {
        return Err(Malformed::OverlappingSymbols { symbol: symbol.clone() });
    }
    if !def.non_terminals.contains(&def.start) {
        return Err(Malformed::StartNotDeclared { start: def.start.clone() });
    }
    for (lhs, rhss) in &def.productions {
        if !def.non_terminals.contains(lhs) {
            return Err(Malformed::UnknownLeftHandSide { lhs: lhs.clone() });
        }
        for rhs in rhss {
            if parse_rule(rhs, &def.terminals, &def.non_terminals).is_some() {
                continue;
            }
            let terminal = def.terminals
                .iter()
                .filter(|t| rhs.starts_with(t.as_str()))
                .max_by_key(|t| t.len());
            return Err(match terminal {
                None => {
                    Malformed::MissingTerminal {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    }
                }
                Some(t) => {
                    Malformed::UnknownRemainder {
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                        rest: rhs[t.len()..].to_string(),
                    }
                }
            });
        }
    }
    Ok(())
}

/// Position of a grammar in the Chomsky hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChomskyType {
    /// Unrestricted
    Type0,
    /// Context-sensitive; `Grammar::classify` never reports it.
    Type1,
    /// Context-free
    Type2,
    /// Regular
    Type3,
}

impl fmt::Display for ChomskyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match *self {
            ChomskyType::Type0 => "Type 0 (unrestricted)",
            ChomskyType::Type1 => "Type 1 (context-sensitive)",
            ChomskyType::Type2 => "Type 2 (context-free)",
            ChomskyType::Type3 => "Type 3 (regular)",
        };
        f.write_str(text)
    }
}

/// The sentential forms of one derivation, start symbol first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Derivation {
    pub forms: Vec<String>,
    /// The derived word split into terminals, ready for `Automaton::validate`.
    pub symbols: Vec<Symbol>,
}

impl Derivation {
    /// The derived terminal string.
    pub fn word(&self) -> &str {
        self.forms.last().map_or("", |form| form.as_str())
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.forms.join(" → "))
    }
}

/// An immutable grammar. Built through `Grammar::new`, every production is
/// right-linear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    def: GrammarDef,
}

impl Grammar {
    pub fn new(def: GrammarDef) -> Result<Self> {
        if let Err(reason) = check(&def) {
            debug!(%reason, "rejected grammar definition");
            return Err(reason.into());
        }
        Ok(Grammar { def: def })
    }

    /// Takes the definition as is; `classify` tells what it turned out to be.
    pub fn new_unchecked(def: GrammarDef) -> Self {
        Grammar { def: def }
    }

    pub fn definition(&self) -> &GrammarDef {
        &self.def
    }

    pub fn non_terminals(&self) -> &BTreeSet<Symbol> {
        &self.def.non_terminals
    }

    pub fn terminals(&self) -> &BTreeSet<Symbol> {
        &self.def.terminals
    }

    pub fn productions(&self) -> &BTreeMap<Symbol, BTreeSet<String>> {
        &self.def.productions
    }

    pub fn start(&self) -> &Symbol {
        &self.def.start
    }

    /// Splits `rhs` into terminal and continuation, if it is right-linear.
    pub fn rule<'a>(&self, rhs: &'a str) -> Option<Rule<'a>> {
        parse_rule(rhs, &self.def.terminals, &self.def.non_terminals)
    }

    /// Simplified Chomsky classification; the first matching tier wins.
    ///
    /// Type 3 needs single non-terminal left-hand sides and right-linear
    /// right-hand sides, Type 2 only the former. Context-sensitivity is not
    /// tested, so anything else is reported as Type 0 and `Type1` is never
    /// returned.
    pub fn classify(&self) -> ChomskyType {
        let single_lhs = self.def.productions.keys().all(|lhs| self.def.non_terminals.contains(lhs));
        if !single_lhs {
            return ChomskyType::Type0;
        }
        let right_linear = self.def.productions
            .values()
            .flat_map(|rhss| rhss.iter())
            .all(|rhs| self.rule(rhs).is_some());
        if right_linear {
            ChomskyType::Type3
        } else {
            ChomskyType::Type2
        }
    }

    /// Random word from the language, using `DeriveConfig::default()`.
    pub fn derive<R: Rng>(&self, rng: &mut R) -> Result<String> {
        self.derive_with(rng, &DeriveConfig::default())
    }

    pub fn derive_with<R: Rng>(&self, rng: &mut R, config: &DeriveConfig) -> Result<String> {
        self.derivation_with(rng, config).map(|derivation| derivation.word().to_string())
    }

    /// Like `derive`, but keeps the terminals apart. Needed whenever a
    /// terminal is longer than one character.
    pub fn derive_symbols<R: Rng>(&self, rng: &mut R) -> Result<Vec<Symbol>> {
        self.derivation(rng).map(|derivation| derivation.symbols)
    }

    pub fn derivation<R: Rng>(&self, rng: &mut R) -> Result<Derivation> {
        self.derivation_with(rng, &DeriveConfig::default())
    }

    /// Leftmost derivation from the start symbol.
    ///
    /// The leftmost non-terminal is replaced by one of its right-hand sides,
    /// picked uniformly with `rng`, until only terminals remain. Fails with
    /// `Error::DerivationStalled` if that non-terminal has no productions or
    /// after `config.max_steps` rewrites.
    pub fn derivation_with<R: Rng>(&self, rng: &mut R, config: &DeriveConfig) -> Result<Derivation> {
        let mut form: Vec<&str> = vec![self.def.start.as_str()];
        let mut forms = vec![self.def.start.clone()];

        while let Some(pos) = form.iter().position(|sym| self.def.non_terminals.contains(*sym)) {
            let steps = forms.len() - 1;
            let choices: Vec<&String> = match self.def.productions.get(form[pos]) {
                Some(rhss) if steps < config.max_steps => rhss.iter().collect(),
                _ => Vec::new(),
            };
            if choices.is_empty() {
                let form = form.concat();
                debug!(steps, form = %form, "derivation stalled");
                return Err(Error::DerivationStalled {
                    steps: steps,
                    form: form,
                });
            }

            let rhs = choices[rng.random_range(0..choices.len())];
            form.splice(pos..pos + 1, self.expand(rhs));
            let current = form.concat();
            trace!(step = steps + 1, form = %current, "derivation step");
            forms.push(current);
        }

        Ok(Derivation {
            forms: forms,
            symbols: form.into_iter().map(String::from).collect(),
        })
    }

    /// Symbols of a right-hand side.
    fn expand<'a>(&'a self, rhs: &'a str) -> Vec<&'a str> {
        match self.rule(rhs) {
            Some(Rule::Empty) => Vec::new(),
            Some(Rule::Terminal(a)) => vec![a],
            Some(Rule::Continue(a, b)) => vec![a, b],
            None => self.tokenize(rhs),
        }
    }

    /// Greedy longest-match split into declared symbols; unknown characters
    /// become symbols of their own.
    fn tokenize<'a>(&'a self, mut rest: &'a str) -> Vec<&'a str> {
        let mut symbols = Vec::new();
        while let Some(c) = rest.chars().next() {
            let len = self.def
                .non_terminals
                .iter()
                .chain(&self.def.terminals)
                .filter(|sym| !sym.is_empty() && rest.starts_with(sym.as_str()))
                .map(|sym| sym.len())
                .max()
                .unwrap_or_else(|| c.len_utf8());
            let (symbol, tail) = rest.split_at(len);
            symbols.push(symbol);
            rest = tail;
        }
        symbols
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |set: &BTreeSet<Symbol>| set.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
        writeln!(f, "Non-terminals = {{{}}}", join(&self.def.non_terminals))?;
        writeln!(f, "Terminals = {{{}}}", join(&self.def.terminals))?;
        writeln!(f, "Productions = {{")?;
        for (lhs, rhss) in &self.def.productions {
            let rhss: Vec<&str> = rhss.iter().map(|rhs| if rhs.is_empty() { "ε" } else { rhs.as_str() }).collect();
            writeln!(f, "    {} → {}", lhs, rhss.join(" | "))?;
        }
        writeln!(f, "}}")?;
        write!(f, "Start = {}", self.def.start)
    }
}

impl Serialize for Grammar {
    fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
        self.def.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grammar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
        let def = GrammarDef::deserialize(deserializer)?;
        Grammar::new(def).map_err(serde::de::Error::custom)
    }
}
