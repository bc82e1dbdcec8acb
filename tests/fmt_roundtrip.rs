//! Parse-print-parse fixed point, checked generatively rather than against a
//! handful of fixed examples: for a corpus of small generated programs,
//! `parse . pretty_print . parse == parse` modulo span annotations.

use betlang::parser::parse;
use betlang::prettyprint::pretty_print;
use proptest::prelude::*;

fn assert_round_trips(source: &str) {
    let (program, diags) = parse(source);
    assert!(
        diags.is_empty(),
        "generated source failed to parse: {:?}\nsource: {}",
        diags.into_vec(),
        source
    );
    let printed = pretty_print(&program);
    let (reparsed, diags2) = parse(&printed);
    assert!(
        diags2.is_empty(),
        "pretty-printed source failed to reparse: {:?}\nprinted: {}",
        diags2.into_vec(),
        printed
    );
    assert_eq!(
        program, reparsed,
        "round trip changed the parsed tree\nsource: {}\nprinted: {}",
        source, printed
    );
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}".prop_filter("not a reserved word", |s| {
        !matches!(
            s.as_str(),
            "bet" | "end" | "if" | "then" | "else" | "let" | "in" | "do" | "return" | "match"
                | "with" | "fn" | "true" | "false" | "sample" | "parallel" | "define" | "lambda"
        )
    })
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        ident().prop_map(|s| format!("'{}", s)),
        any::<bool>().prop_map(|b| b.to_string()),
    ]
}

proptest! {
    /// A ternary bet over three generated literals round-trips.
    #[test]
    fn ternary_bet_over_generated_literals_round_trips(
        a in literal(), b in literal(), c in literal()
    ) {
        let source = format!("bet {} {} {} end", a, b, c);
        assert_round_trips(&source);
    }

    /// A `let` binding a generated identifier to a generated literal, used
    /// in an `if` over a generated condition, round-trips.
    #[test]
    fn let_and_if_over_generated_names_round_trip(
        name in ident(), value in literal(), cond in any::<bool>()
    ) {
        let source = format!(
            "let {} = {} in if {} then 1 else 2 end end",
            name, value, cond
        );
        assert_round_trips(&source);
    }

    /// A bracketed list literal of generated literals round-trips.
    #[test]
    fn list_literal_of_generated_items_round_trips(
        items in proptest::collection::vec(literal(), 1..5)
    ) {
        let source = format!("[{}]", items.join(", "));
        assert_round_trips(&source);
    }

    /// A `do` block binding a generated name to a generated literal and
    /// returning it round-trips.
    #[test]
    fn do_block_over_generated_bind_round_trips(
        name in ident(), value in literal()
    ) {
        let source = format!("do {} <- {}; return {} end", name, value, name);
        assert_round_trips(&source);
    }

    /// A weighted bet over generated labels with fixed, Dutch-book-safe
    /// weights round-trips.
    #[test]
    fn weighted_bet_over_generated_labels_round_trips(
        a in ident(), b in ident(), c in ident()
    ) {
        prop_assume!(a != b && b != c && a != c);
        let source = format!(
            "bet-weighted ('{}, 0.2) ('{}, 0.3) ('{}, 0.5) end",
            a, b, c
        );
        assert_round_trips(&source);
    }
}

#[test]
fn empty_do_return_round_trips() {
    assert_round_trips("do return 1 end");
}

#[test]
fn nested_if_round_trips() {
    assert_round_trips("if true then if false then 1 else 2 end else 3 end");
}
