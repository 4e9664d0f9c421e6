//! # toklr
//!
//! `toklr` is the core of a lexer-and-parser generator toolkit: given a list of
//! `(terminal, regex)` token specifications and a context-free grammar with production
//! callbacks, it produces the static tables needed to tokenize a byte stream and
//! LR(1)-parse the resulting token stream.
//!
//! The crate is organized leaf-first:
//!
//! * [`nfa`] / [`dfa`] — byte-alphabet finite automata: ε-elimination, subset
//!   construction, DFA union by product construction, optional minimization.
//! * [`regex`] — a small regex surface (concatenation, alternation, `*`, `+`, `?`,
//!   grouping, byte classes with range and set-difference) compiled to an ε-NFA by
//!   Thompson's construction.
//! * [`lexergen`] — unions the per-token DFAs produced by [`regex`] into a single
//!   combined lexer DFA, tagging accepting states with the owning terminal(s).
//! * [`grammar`] — productions, terminal/non-terminal id allocation, FIRST-set
//!   computation.
//! * [`lr1`] — LR(1) item closure, canonical collection, ACTION/GOTO table
//!   generation, state-id compaction, and conflict reporting.
//!
//! Deliberately out of scope: the runtime lexer driver (longest-match DFA simulator)
//! and the runtime LR shift/reduce driver, any source-text pretty-printer for the
//! generated tables, and host-language binding of reduction callbacks — the generator
//! records only an opaque callback index and never invokes it.
//!
//! ## Example
//!
//! ```rust
//! use toklr::lexergen::LexerGenerator;
//!
//! let gen = LexerGenerator::new(vec![(1, "[a-z]+".to_string()), (2, "[0-9]+".to_string())]);
//! let lexer = gen.compute().unwrap();
//! assert!(lexer.conflicts.is_empty());
//! assert!(lexer.dfa.accepts(b"hello"));
//! assert!(lexer.dfa.accepts(b"123"));
//! ```

pub mod dfa;
pub mod grammar;
pub mod lexergen;
pub mod lr1;
pub mod nfa;
pub mod regex;
