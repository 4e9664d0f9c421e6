//! Lexer generator (C3): unions per-token DFAs, produced by [`crate::regex`], with a
//! whitespace-recognising DFA into a single combined DFA, then compacts it into the
//! table shape described for the (out-of-scope) runtime lexer driver.

use crate::dfa::Dfa;
use crate::regex::{self, RegexParseError};
use std::collections::HashMap;
use thiserror::Error;

/// Reserved terminal tag for the built-in whitespace token.
pub const WHITESPACE: i32 = 0;

#[derive(Debug, Error)]
pub enum LexerGenError {
    #[error("regex for terminal {terminal} is invalid: {source}")]
    InvalidRegex {
        terminal: i32,
        #[source]
        source: RegexParseError,
    },
}

/// A DFA accepting state reachable under more than one terminal tag. Non-fatal:
/// generation still completes and all tags are retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerConflict {
    pub state: usize,
    pub tags: Vec<i32>,
}

/// The compacted output described for the external lexer-table interface: sink states
/// are omitted both as sources and as targets of emitted transitions.
#[derive(Debug, Clone)]
pub struct LexerTable {
    pub initial_state: usize,
    pub transitions: HashMap<(usize, u8), usize>,
    pub outputs: HashMap<usize, Vec<i32>>,
}

/// The combined lexer DFA plus any OUTPUT CONFLICTs detected among its accepting
/// states.
#[derive(Debug, Clone)]
pub struct GeneratedLexer {
    pub dfa: Dfa,
    pub conflicts: Vec<LexerConflict>,
}

impl GeneratedLexer {
    pub fn to_table(&self) -> LexerTable {
        let initial_state = self
            .dfa
            .initial_state()
            .expect("a generated lexer always has an initial state");
        let mut transitions = HashMap::new();
        let mut outputs = HashMap::new();

        for (idx, state) in self.dfa.states().iter().enumerate() {
            if self.dfa.is_sink_state(idx) {
                continue;
            }
            if state.is_accepting() {
                outputs.insert(idx, state.tags().to_vec());
            }
            for byte in 0u16..256 {
                let byte = byte as u8;
                if let Some(target) = state.transition(byte) {
                    if !self.dfa.is_sink_state(target) {
                        transitions.insert((idx, byte), target);
                    }
                }
            }
        }

        LexerTable {
            initial_state,
            transitions,
            outputs,
        }
    }
}

/// Builds the combined lexer DFA for a list of `(terminal, regex)` token
/// specifications.
pub struct LexerGenerator {
    tokens: Vec<(i32, String)>,
}

impl LexerGenerator {
    pub fn new(tokens: Vec<(i32, String)>) -> Self {
        Self { tokens }
    }

    /// 1. Builds the whitespace DFA from `[ \n\t]+` tagged [`WHITESPACE`].
    /// 2. Compiles and unions every token's DFA in turn.
    /// 3. Minimizes the result (tag-preserving).
    /// 4. Detects OUTPUT CONFLICTs among accepting states.
    pub fn compute(&self) -> Result<GeneratedLexer, LexerGenError> {
        let mut dfa = regex::compile_to_dfa(b"[ \n\t]+", WHITESPACE)
            .expect("the built-in whitespace regex always compiles");

        for (terminal, pattern) in &self.tokens {
            let token_dfa = regex::compile_to_dfa(pattern.as_bytes(), *terminal).map_err(|e| {
                LexerGenError::InvalidRegex {
                    terminal: *terminal,
                    source: e,
                }
            })?;
            dfa = dfa.union(&token_dfa);
        }

        let dfa = dfa.minimize();
        let conflicts = dfa
            .states()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tags().len() > 1)
            .map(|(state, s)| LexerConflict {
                state,
                tags: s.tags().to_vec(),
            })
            .collect();

        Ok(GeneratedLexer { dfa, conflicts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whitespace_and_tokens() {
        let gen = LexerGenerator::new(vec![(1, "[a-z]+".to_string()), (2, "[0-9]+".to_string())]);
        let lexer = gen.compute().unwrap();
        assert!(lexer.conflicts.is_empty());
        assert!(lexer.dfa.accepts(b"hello"));
        assert!(lexer.dfa.accepts(b"123"));
        assert!(lexer.dfa.accepts(b" \n\t"));
    }

    #[test]
    fn overlapping_tokens_report_exactly_one_conflict() {
        let gen = LexerGenerator::new(vec![
            (1, "if".to_string()),
            (2, "[a-z]+".to_string()),
        ]);
        let lexer = gen.compute().unwrap();
        assert_eq!(lexer.conflicts.len(), 1);
        let mut tags = lexer.conflicts[0].tags.clone();
        tags.sort_unstable();
        assert_eq!(tags, vec![1, 2]);
    }

    #[test]
    fn compacted_table_omits_sink_transitions() {
        let gen = LexerGenerator::new(vec![(1, "ab".to_string())]);
        let lexer = gen.compute().unwrap();
        let table = lexer.to_table();
        for (&(from, _), &to) in &table.transitions {
            assert!(!lexer.dfa.is_sink_state(from));
            assert!(!lexer.dfa.is_sink_state(to));
        }
    }
}
