//! End-to-end checks through the public API.

use regdfa::{
    compile, compile_postfix, java_class, Alphabet, Error, Outcome, PosSet, Rejection,
};

const IDENTIFIER: &str = "L . ( L | D )* . #";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn all_strings(symbols: &[char], max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for s in &frontier {
            for &c in symbols {
                let mut t = s.clone();
                t.push(c);
                next.push(t);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

#[test]
fn identifier_start_state_is_first_leaf() {
    init();
    let compiled = compile(IDENTIFIER, &Alphabet::identifier()).unwrap();
    assert_eq!(compiled.postfix, "LLD|*.#.");
    let table = compiled.dfa.table();
    let start: PosSet = [1].iter().cloned().collect();
    assert_eq!(compiled.dfa.state_set(table.start()), &start);
    assert!(!table.is_accepting(table.start()));
}

#[test]
fn identifier_language() {
    init();
    let compiled = compile(IDENTIFIER, &Alphabet::identifier()).unwrap();
    for s in all_strings(&['L', 'D'], 6) {
        let expected = s.starts_with('L');
        assert_eq!(compiled.dfa.table().accept(&s), expected, "{:?}", s);
        assert_eq!(compiled.minimized.table().accept(&s), expected, "{:?}", s);
    }
}

#[test]
fn potion_brewer_is_an_identifier() {
    init();
    let compiled = compile(IDENTIFIER, &Alphabet::identifier()).unwrap();
    let run = compiled.simulate("PotionBrewer", java_class);
    assert_eq!(run.outcome(), Outcome::Accepted);
    assert_eq!(run.steps().len(), 12);
    assert!(run.steps().iter().all(|step| step.symbol == 'L'));
    assert!(compiled.matches("potionsBrewed"));
    assert!(compiled.matches("HERB_PRICE"));
}

#[test]
fn leading_digit_is_rejected_immediately() {
    init();
    let compiled = compile(IDENTIFIER, &Alphabet::identifier()).unwrap();
    let run = compiled.simulate("3x", java_class);
    assert!(run.steps().is_empty());
    match run.outcome() {
        Outcome::Rejected(Rejection::UndefinedTransition { index, .. }) => assert_eq!(index, 0),
        other => panic!("unexpected {:?}", other),
    }
    assert!(!compiled.matches("5.50"));
}

#[test]
fn number_pattern() {
    init();
    let compiled = compile("D . D* . #", &Alphabet::identifier()).unwrap();
    assert!(compiled.matches("100"));
    assert!(!compiled.matches("x1"));
    assert!(!compiled.matches(""));
}

#[test]
fn minimization_never_grows_and_keeps_language() {
    init();
    let alphabet = Alphabet::new("ab".chars());
    let patterns = [
        "(a|b)* . a . b . b . #",
        "(a . b*) | (b . b*) . #",
        "((a . b*) | (b . b*)) . #",
        "a . (b | a . a)* . #",
        "(a* . b*)* . #",
    ];
    for pattern in &patterns {
        let compiled = compile(pattern, &alphabet).unwrap();
        let dfa = compiled.dfa.table();
        let min = compiled.minimized.table();
        assert!(min.len() <= dfa.len(), "{}", pattern);
        for s in all_strings(alphabet.symbols(), 8) {
            assert_eq!(dfa.accept(&s), min.accept(&s), "{} on {:?}", pattern, s);
        }
    }
}

#[test]
fn custom_alphabet_needs_its_own_classifier() {
    let compiled = compile("(a . b)* . #", &Alphabet::new("ab".chars())).unwrap();
    assert!(!compiled.matches("abab"));
    assert!(compiled.matches(""));
    let run = compiled.simulate("abab", |c| if c == 'a' || c == 'b' { Some(c) } else { None });
    assert!(run.is_accepted());
    assert_eq!(run.steps().len(), 4);
}

#[test]
fn misplaced_closure_is_not_moved() {
    let compiled = compile("L . * D . #", &Alphabet::identifier());
    match compiled {
        Err(Error::MissingOperand { op, offset }) => assert_eq!((op, offset), ('*', 4)),
        other => panic!("unexpected {:?}", other.map(|c| c.postfix)),
    }
}

#[test]
fn compiling_twice_is_identical() {
    let alphabet = Alphabet::new("ab".chars());
    let first = compile("(a|b)* . a . b . b . #", &alphabet).unwrap();
    let second = compile("(a|b)* . a . b . b . #", &alphabet).unwrap();
    assert_eq!(first.dfa.table(), second.dfa.table());
    assert_eq!(first.minimized.table(), second.minimized.table());
    assert_eq!(first.followpos, second.followpos);
}

#[test]
fn malformed_patterns_fail_whole() {
    let alphabet = Alphabet::identifier();
    let cases = [
        "(L . D",
        "L . D)",
        "L . | D . #",
        "L . D",
        "L D . #",
        "",
        "L ? #",
        "* L . #",
        "L . * D . #",
        "L . D | . #",
    ];
    for pattern in &cases {
        match compile(pattern, &alphabet) {
            Err(e) => assert!(e.is_malformed_pattern(), "{}: {}", pattern, e),
            Ok(_) => panic!("{:?} compiled", pattern),
        }
    }
    match compile_postfix("LD", &alphabet) {
        Err(Error::DanglingOperands { count: 2 }) => {}
        other => panic!("unexpected {:?}", other.map(|c| c.postfix)),
    }
}

#[test]
fn graphs_export_to_dot_files() {
    let compiled = compile(IDENTIFIER, &Alphabet::identifier()).unwrap();
    let dir = std::env::temp_dir().join(format!("regdfa-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dfa.dot");
    compiled.dfa.to_graph().write_dot(&path).unwrap();
    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.contains("S1 [label = \"S1\\n{2, 3, 4}\" shape = doublecircle];"));
    assert!(dot.contains("S0 -> S1 [label = \"L\"];"));
    std::fs::remove_dir_all(&dir).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&compiled.tree.to_graph().to_json().unwrap()).unwrap();
    assert_eq!(json["nodes"].as_array().map(|n| n.len()), Some(8));
    assert_eq!(json["edges"].as_array().map(|e| e.len()), Some(7));
}
