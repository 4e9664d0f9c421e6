use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazy_static::lazy_static;
use regex::Regex as LibRegex;
use toklr::dfa::Dfa;
use toklr::grammar::{Grammar, Production, Symbol, GOAL};
use toklr::lr1;
use toklr::regex;

const WORD_PATTERN: &[u8] = b"[a-zA-Z_][a-zA-Z0-9_]*";

lazy_static! {
    static ref WORD_DFA: Dfa = regex::compile_to_dfa(WORD_PATTERN, 1).unwrap();
    static ref DIGITS_DFA: Dfa = regex::compile_to_dfa(b"[0-9]+(\\.[0-9]+)?", 2).unwrap();
}

pub fn union(c: &mut Criterion) {
    c.bench_function("dfa union", |b| {
        b.iter(|| WORD_DFA.union(black_box(&DIGITS_DFA)))
    });
}

pub fn minimize(c: &mut Criterion) {
    let unioned = WORD_DFA.union(&DIGITS_DFA);
    c.bench_function("dfa minimize", |b| b.iter(|| unioned.minimize()));
}

pub fn regex_compile(c: &mut Criterion) {
    c.bench_function("toklr regex compile", |b| {
        b.iter(|| regex::compile_to_dfa(black_box(WORD_PATTERN), 1).unwrap())
    });

    c.bench_function("library regex compile", |b| {
        b.iter(|| LibRegex::new(black_box("^[a-zA-Z_][a-zA-Z0-9_]*$")).unwrap())
    });
}

pub fn regex_check(c: &mut Criterion) {
    let sample = b"an_identifier_of_middling_length_42";
    c.bench_function("toklr regex check", |b| {
        b.iter(|| WORD_DFA.accepts(black_box(sample)))
    });

    let library_regex = LibRegex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
    let sample_str = std::str::from_utf8(sample).unwrap();
    c.bench_function("library regex check", |b| {
        b.iter(|| library_regex.is_match(black_box(sample_str)))
    });
}

// S' -> S, S -> C C, C -> c C, C -> d  (the canonical textbook LR(1) grammar)
fn expression_grammar() -> Grammar {
    let s = Symbol::NonTerminal(0);
    let c = Symbol::NonTerminal(1);
    let lower_c = Symbol::Terminal(0);
    let d = Symbol::Terminal(1);
    let productions = vec![
        Production::new(0, GOAL, vec![s]),
        Production::new(1, s, vec![c, c]),
        Production::new(2, c, vec![lower_c, c]),
        Production::new(3, c, vec![d]),
    ];
    Grammar::new(productions).unwrap()
}

pub fn lr1_generate(c: &mut Criterion) {
    let grammar = expression_grammar();
    c.bench_function("lr1 table generation", |b| {
        b.iter(|| lr1::generate(black_box(&grammar)))
    });
}

criterion_group!(benches, union, minimize, regex_compile, regex_check, lr1_generate);
criterion_main!(benches);
