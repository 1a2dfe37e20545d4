use std::env;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use formlang::{Automaton, AutomatonDef, DotOptions, Grammar, GrammarDef, DFA, NDFA};

fn lab_grammar() -> Result<Grammar> {
    GrammarDef::new("S")
        .non_terminals(vec!["P", "Q"])
        .terminals(vec!["a", "b", "c", "d", "e", "f"])
        .productions("S", vec!["aP", "bQ"])
        .productions("P", vec!["bP", "cP", "dQ", "e"])
        .productions("Q", vec!["eQ", "fQ", "a"])
        .build()
        .context("laboratory grammar")
}

fn variant_ndfa() -> Result<NDFA> {
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
        .context("variant automaton")
}

#[derive(Serialize)]
struct Export<'a> {
    grammar: &'a Grammar,
    grammar_dfa: &'a DFA,
    variant_ndfa: &'a NDFA,
    variant_dfa: &'a DFA,
}

fn report<A: Automaton>(automaton: &A, word: &str) {
    match automaton.trace_str(word) {
        Ok(trace) => {
            for step in &trace.steps {
                let symbol = step.symbol.as_ref().map_or("", |s| s.as_str());
                println!("    {:>3} {{{}}}", symbol, step.active.join(", "));
            }
            println!("  {:?}: {:?}", word, trace.verdict);
        }
        Err(err) => println!("  {:?}: {}", word, err),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut dot = false;
    let mut json = false;
    let mut words = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dot" => dot = true,
            "--json" => json = true,
            _ => words.push(arg),
        }
    }

    let grammar = lab_grammar()?;
    let grammar_dfa = grammar.convert_to_dfa()?;
    let variant = variant_ndfa()?;
    let variant_dfa = variant.convert_to_dfa();

    if dot {
        let options = DotOptions {
            left_to_right: true,
            merge_edges: true,
        };
        println!("{}", grammar_dfa.dot(options));
        println!("{}", variant.dot(options));
        println!("{}", variant_dfa.dot(options));
        return Ok(());
    }
    if json {
        let export = Export {
            grammar: &grammar,
            grammar_dfa: &grammar_dfa,
            variant_ndfa: &variant,
            variant_dfa: &variant_dfa,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!("{}\n", grammar);
    println!("Classification: {}\n", grammar.classify());
    println!("{}", grammar_dfa);

    if words.is_empty() {
        let mut rng = rand::rng();
        for n in 1..6 {
            let derivation = grammar.derivation(&mut rng)?;
            println!("{}. {}", n, derivation);
            report(&grammar_dfa, derivation.word());
        }
    } else {
        for word in &words {
            report(&grammar_dfa, word);
        }
    }

    println!("\n{}", variant);
    info!(deterministic = variant.is_deterministic(), "variant automaton");
    println!("{}", variant_dfa);
    Ok(())
}
