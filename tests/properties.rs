//! Language-level properties of the conversions, checked on the laboratory
//! grammar and automaton and on a few extra automata.

use formlang::{Automaton, AutomatonDef, ChomskyType, Error, Grammar, GrammarDef, DFA, NDFA};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn lab_grammar() -> Grammar {
    GrammarDef::new("S")
        .non_terminals(vec!["P", "Q"])
        .terminals(vec!["a", "b", "c", "d", "e", "f"])
        .productions("S", vec!["aP", "bQ"])
        .productions("P", vec!["bP", "cP", "dQ", "e"])
        .productions("Q", vec!["eQ", "fQ", "a"])
        .build()
        .unwrap()
}

fn variant_ndfa() -> NDFA {
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

/// Accepts words over {0, 1} whose third symbol from the end is 1.
fn third_from_end() -> NDFA {
    AutomatonDef::new("s")
        .transition("s", "0", "s")
        .transition("s", "1", "s")
        .transition("s", "1", "x")
        .transition("x", "0", "y")
        .transition("x", "1", "y")
        .transition("y", "0", "z")
        .transition("y", "1", "z")
        .accept("z")
        .build()
        .unwrap()
}

/// Every word over `alphabet` up to `max_len` symbols.
fn words(alphabet: &[String], max_len: usize) -> Vec<Vec<String>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for word in &frontier {
            for symbol in alphabet {
                let mut longer: Vec<String> = word.clone();
                longer.push(symbol.clone());
                next.push(longer);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

#[test]
fn grammar_dfa_scenario() {
    let dfa = lab_grammar().convert_to_dfa().unwrap();
    assert_eq!(dfa.validate_str("ae"), Ok(true));
    let trace = dfa.trace_str("ae").unwrap();
    let path: Vec<String> = trace.steps.iter().map(|step| step.active.concat()).collect();
    assert_eq!(path, ["S", "P", "FINAL"]);

    assert_eq!(dfa.validate_str("az"),
               Err(Error::InvalidSymbol {
                   symbol: "z".to_string(),
                   position: 1,
               }));
    assert_eq!(dfa.validate_str("a"), Ok(false));
    assert_eq!(dfa.validate_str("bfea"), Ok(true));
    assert_eq!(dfa.validate_str("abcbcdfa"), Ok(true));
    assert_eq!(dfa.validate_str(""), Ok(false));
}

#[test]
fn ndfa_scenario() {
    let nfa = variant_ndfa();
    assert!(!nfa.is_deterministic());

    let dfa = nfa.convert_to_dfa();
    assert_eq!(dfa.validate_str("ab"), Ok(true));
    assert_eq!(dfa.validate_str("aab"), Ok(true));
    assert_eq!(dfa.validate_str(""), Ok(false));
    assert_eq!(dfa.validate_str("ac"), Ok(false));
}

#[test]
fn subset_construction_is_unambiguous_and_completes_to_deterministic() {
    for nfa in &[variant_ndfa(), third_from_end()] {
        let dfa = nfa.convert_to_dfa();
        assert!(dfa.is_unambiguous());
        assert!(dfa.complete().is_deterministic());
        // the DFA typing itself re-validates the table
        assert!(DFA::new(dfa.definition()).is_ok());
    }
}

#[test]
fn subset_construction_preserves_the_language() {
    for nfa in &[variant_ndfa(), third_from_end()] {
        let dfa = nfa.convert_to_dfa();
        for word in words(nfa.alphabet(), 6) {
            assert_eq!(nfa.validate(&word), dfa.validate(&word), "{:?}", word);
        }
    }
}

#[test]
fn third_from_end_needs_eight_states() {
    let dfa = third_from_end().convert_to_dfa();
    assert_eq!(dfa.state_count(), 8);
    assert_eq!(dfa.accepting().count(), 4);
}

#[test]
fn derived_words_are_accepted() {
    let grammar = lab_grammar();
    let dfa = grammar.convert_to_dfa().unwrap();
    let mut rng = StdRng::seed_from_u64(0x1a6);
    for _ in 0..200 {
        let word = grammar.derive(&mut rng).unwrap();
        assert_eq!(dfa.validate_str(&word), Ok(true), "{:?}", word);
    }
}

#[test]
fn derived_symbols_are_accepted_with_long_terminals() {
    let grammar = GrammarDef::new("S")
        .terminals(vec!["ab", "c"])
        .productions("S", vec!["abS", "c"])
        .build()
        .unwrap();
    let dfa = grammar.convert_to_dfa().unwrap();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let derivation = grammar.derivation(&mut rng).unwrap();
        assert_eq!(derivation.symbols.concat(), derivation.word());
        assert_eq!(dfa.validate(&derivation.symbols), Ok(true), "{}", derivation);

        let symbols = grammar.derive_symbols(&mut rng).unwrap();
        assert_eq!(symbols.last().map(|s| s.as_str()), Some("c"));
        assert_eq!(dfa.validate(&symbols), Ok(true), "{:?}", symbols);
    }
}

#[test]
fn automaton_to_grammar_round_trip() {
    for nfa in &[variant_ndfa(), third_from_end()] {
        let grammar = nfa.convert_to_regular_grammar().unwrap();
        assert_eq!(grammar.classify(), ChomskyType::Type3);

        let dfa = grammar.convert_to_dfa().unwrap();
        for word in words(nfa.alphabet(), 6) {
            assert_eq!(dfa.validate(&word), nfa.validate(&word), "{:?}", word);
        }
    }
}

#[test]
fn accepting_start_survives_the_round_trip() {
    let dfa: DFA = AutomatonDef::new("even")
        .transition("even", "a", "odd")
        .transition("odd", "a", "even")
        .accept("even")
        .build()
        .unwrap();
    let back = dfa.convert_to_regular_grammar().unwrap().convert_to_dfa().unwrap();
    for (word, accepted) in &[("", true), ("a", false), ("aa", true), ("aaa", false)] {
        assert_eq!(back.validate_str(word), Ok(*accepted), "{:?}", word);
    }
}

#[test]
fn right_linear_grammars_classify_as_regular() {
    let grammars = vec![
        lab_grammar(),
        GrammarDef::new("S").terminals(vec!["x"]).productions("S", vec!["x", "xS", ""]).build().unwrap(),
        variant_ndfa().convert_to_regular_grammar().unwrap(),
    ];
    for grammar in &grammars {
        assert_eq!(grammar.classify(), ChomskyType::Type3);
    }
}

#[test]
fn json_hand_off_round_trips() {
    let nfa = variant_ndfa();
    let json = serde_json::to_string(&nfa).unwrap();
    let back: NDFA = serde_json::from_str(&json).unwrap();
    assert_eq!(back.definition(), nfa.definition());

    let grammar = lab_grammar();
    let json = serde_json::to_string_pretty(&grammar).unwrap();
    let back: Grammar = serde_json::from_str(&json).unwrap();
    assert_eq!(back, grammar);
}
