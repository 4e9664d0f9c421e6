//! Recursive-descent parser for the regex grammar, applying Thompson's construction on
//! reduction. Each production returns the `(entry, exit)` pair of states threaded
//! through a shared [`Nfa`] builder, mirroring the source's reduction callbacks that
//! build fragments into a single mutable context rather than an intermediate AST.

use crate::nfa::{Nfa, EPSILON};
use crate::regex::lexer::{lex, LexError, Token};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegexParseError {
    #[error("regex lexer error: {0}")]
    Lex(#[from] LexError),
    #[error("unexpected end of pattern, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected token at position {position}, expected {expected}")]
    Unexpected {
        position: usize,
        expected: &'static str,
    },
    #[error("trailing input after a complete pattern, starting at position {position}")]
    TrailingInput { position: usize },
}

type Fragment = (usize, usize);

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    builder: Nfa,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn fresh_fragment(&mut self) -> Fragment {
        (self.builder.add_state(), self.builder.add_state())
    }

    fn is_factor_start(tok: Token) -> bool {
        matches!(tok, Token::Char(_) | Token::LParen | Token::LSquare)
    }

    /// `Disjunction := Concatenation ('|' Concatenation)*`
    fn disjunction(&mut self) -> Result<Fragment, RegexParseError> {
        let mut first = self.concatenation()?;
        if self.peek() != Some(Token::Bar) {
            return Ok(first);
        }

        let (entry, exit) = self.fresh_fragment();
        self.builder.add_transition(entry, first.0, EPSILON);
        self.builder.add_transition(first.1, exit, EPSILON);
        first = (entry, exit);

        while self.peek() == Some(Token::Bar) {
            self.advance();
            let branch = self.concatenation()?;
            self.builder.add_transition(entry, branch.0, EPSILON);
            self.builder.add_transition(branch.1, exit, EPSILON);
        }
        Ok(first)
    }

    /// `Concatenation := Quantifier+`
    fn concatenation(&mut self) -> Result<Fragment, RegexParseError> {
        let mut frag = self.quantifier()?;
        while self.peek().is_some_and(Self::is_factor_start) {
            let next = self.quantifier()?;
            self.builder.add_transition(frag.1, next.0, EPSILON);
            frag = (frag.0, next.1);
        }
        Ok(frag)
    }

    /// `Quantifier := Factor ('*' | '+' | '?')?`
    fn quantifier(&mut self) -> Result<Fragment, RegexParseError> {
        let inner = self.factor()?;
        match self.peek() {
            Some(Token::Asterisk) => {
                self.advance();
                Ok(self.star(inner))
            }
            Some(Token::Plus) => {
                self.advance();
                Ok(self.plus(inner))
            }
            Some(Token::Question) => {
                self.advance();
                Ok(self.optional(inner))
            }
            _ => Ok(inner),
        }
    }

    /// `A*` -> fresh `q0, q1`; ε edges `q0→q1`, `q0→A.entry`, `A.exit→A.entry`, `A.exit→q1`
    fn star(&mut self, a: Fragment) -> Fragment {
        let (q0, q1) = self.fresh_fragment();
        self.builder.add_transition(q0, q1, EPSILON);
        self.builder.add_transition(q0, a.0, EPSILON);
        self.builder.add_transition(a.1, a.0, EPSILON);
        self.builder.add_transition(a.1, q1, EPSILON);
        (q0, q1)
    }

    /// `A+` -> fresh `q0, q1`; ε edges `q0→A.entry`, `A.exit→q1`, `A.exit→A.entry`
    fn plus(&mut self, a: Fragment) -> Fragment {
        let (q0, q1) = self.fresh_fragment();
        self.builder.add_transition(q0, a.0, EPSILON);
        self.builder.add_transition(a.1, q1, EPSILON);
        self.builder.add_transition(a.1, a.0, EPSILON);
        (q0, q1)
    }

    /// `A?` -> fresh `q0, q1`; ε edges `q0→A.entry`, `A.exit→q1`, `q0→q1`
    fn optional(&mut self, a: Fragment) -> Fragment {
        let (q0, q1) = self.fresh_fragment();
        self.builder.add_transition(q0, a.0, EPSILON);
        self.builder.add_transition(a.1, q1, EPSILON);
        self.builder.add_transition(q0, q1, EPSILON);
        (q0, q1)
    }

    /// `Factor := CHAR | '(' Disjunction ')' | '[' Class ']'`
    fn factor(&mut self) -> Result<Fragment, RegexParseError> {
        match self.advance() {
            Some(Token::Char(b)) => {
                let (entry, exit) = self.fresh_fragment();
                self.builder.add_transition(entry, exit, b as usize);
                Ok((entry, exit))
            }
            Some(Token::LParen) => {
                let inner = self.disjunction()?;
                self.expect(Token::RParen, ")")?;
                Ok(inner)
            }
            Some(Token::LSquare) => {
                let bytes = self.class()?;
                self.expect(Token::RSquare, "]")?;
                let (entry, exit) = self.fresh_fragment();
                for b in bytes {
                    self.builder.add_transition(entry, exit, b as usize);
                }
                Ok((entry, exit))
            }
            Some(_) => Err(RegexParseError::Unexpected {
                position: self.pos - 1,
                expected: "CHAR, '(' or '['",
            }),
            None => Err(RegexParseError::UnexpectedEnd {
                expected: "CHAR, '(' or '['",
            }),
        }
    }

    /// `Class := HalfClass ('^' HalfClass)?`. Class difference `A^B` is the set
    /// difference `A \ B`, not negation.
    fn class(&mut self) -> Result<HashSet<u8>, RegexParseError> {
        let mut set = self.half_class()?;
        if self.peek() == Some(Token::Caret) {
            self.advance();
            let subtrahend = self.half_class()?;
            set.retain(|b| !subtrahend.contains(b));
        }
        Ok(set)
    }

    /// `HalfClass := CharacterRange+`
    fn half_class(&mut self) -> Result<HashSet<u8>, RegexParseError> {
        let mut set = self.character_range()?;
        while self.peek_is_range_start() {
            set.extend(self.character_range()?);
        }
        Ok(set)
    }

    fn peek_is_range_start(&self) -> bool {
        matches!(self.peek(), Some(Token::Char(_)))
    }

    /// `CharacterRange := CHAR ('-' CHAR)?`. A reversed range (`lo > hi`) matches
    /// nothing, same as `range(high, low + 1)` in the source grammar: no swap.
    fn character_range(&mut self) -> Result<HashSet<u8>, RegexParseError> {
        let lo = self.expect_char()?;
        if self.peek() == Some(Token::Hyphen) {
            self.advance();
            let hi = self.expect_char()?;
            Ok((lo..=hi).collect())
        } else {
            Ok(HashSet::from([lo]))
        }
    }

    fn expect_char(&mut self) -> Result<u8, RegexParseError> {
        match self.advance() {
            Some(Token::Char(b)) => Ok(b),
            Some(_) => Err(RegexParseError::Unexpected {
                position: self.pos - 1,
                expected: "CHAR",
            }),
            None => Err(RegexParseError::UnexpectedEnd { expected: "CHAR" }),
        }
    }

    fn expect(&mut self, token: Token, name: &'static str) -> Result<(), RegexParseError> {
        match self.advance() {
            Some(t) if t == token => Ok(()),
            Some(_) => Err(RegexParseError::Unexpected {
                position: self.pos - 1,
                expected: name,
            }),
            None => Err(RegexParseError::UnexpectedEnd { expected: name }),
        }
    }
}

/// Parses `pattern` and compiles it via Thompson's construction into a fresh NFA whose
/// initial state is the root fragment's entry and whose exit is accepting, tagged `tag`.
pub fn compile(pattern: &[u8], tag: i32) -> Result<Nfa, RegexParseError> {
    let tokens = lex(pattern)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        builder: Nfa::new(),
    };
    let (entry, exit) = parser.disjunction()?;
    if parser.pos != parser.tokens.len() {
        return Err(RegexParseError::TrailingInput { position: parser.pos });
    }
    let mut nfa = parser.builder;
    nfa.set_initial(entry);
    nfa.mark_accepting(exit, tag);
    Ok(nfa)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dfa_accepts(pattern: &[u8], input: &[u8]) -> bool {
        let nfa = compile(pattern, 1).unwrap();
        nfa.remove_epsilons().to_dfa().accepts(input)
    }

    #[test]
    fn alternation() {
        assert!(dfa_accepts(b"a|b", b"a"));
        assert!(dfa_accepts(b"a|b", b"b"));
        assert!(!dfa_accepts(b"a|b", b"c"));
        assert!(!dfa_accepts(b"a|b", b""));
    }

    #[test]
    fn digit_plus() {
        assert!(dfa_accepts(b"[0-9]+", b"5"));
        assert!(dfa_accepts(b"[0-9]+", b"42"));
        assert!(dfa_accepts(b"[0-9]+", b"007"));
        assert!(!dfa_accepts(b"[0-9]+", b""));
    }

    #[test]
    fn class_difference() {
        assert!(dfa_accepts(b"[a-z^aeiou]", b"b"));
        assert!(dfa_accepts(b"[a-z^aeiou]", b"z"));
        for vowel in b"aeiou" {
            assert!(!dfa_accepts(b"[a-z^aeiou]", &[*vowel]));
        }
    }

    #[test]
    fn reversed_range_matches_nothing() {
        for byte in 0u16..256 {
            assert!(!dfa_accepts(b"[z-a]", &[byte as u8]));
        }
    }

    #[test]
    fn hex_escape() {
        let nfa = compile(br"\xFF", 4).unwrap();
        let dfa = nfa.remove_epsilons().to_dfa();
        assert!(dfa.accepts(&[255]));
        assert!(!dfa.accepts(&[254]));
        assert_eq!(dfa.states().len(), 2);
    }

    #[test]
    fn grouping_and_optional() {
        assert!(dfa_accepts(b"(ab)?c", b"c"));
        assert!(dfa_accepts(b"(ab)?c", b"abc"));
        assert!(!dfa_accepts(b"(ab)?c", b"ac"));
    }

    #[test]
    fn unclosed_group_is_a_parse_error() {
        assert!(compile(b"(a", 1).is_err());
    }
}
