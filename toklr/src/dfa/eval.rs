//! Step-by-step DFA simulation. Used by the test suite and, conceptually, mirrors the
//! longest-match driver described for the (out-of-scope) runtime lexer: the generator
//! itself only needs to check acceptance, not commit-on-miss longest-match behavior.

use crate::dfa::{Dfa, DfaState, NUM_SYMBOLS};

#[derive(Debug, Clone)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    current_state: Option<usize>,
    stuck: bool,
}

impl<'a> DfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current_state().is_some_and(DfaState::is_accepting)
    }

    pub fn current_state(&self) -> Option<&DfaState> {
        if self.stuck {
            None
        } else {
            self.current_state.map(|s| &self.dfa.states[s])
        }
    }

    pub fn step(&mut self, byte: u8) -> Option<&DfaState> {
        if self.stuck {
            return None;
        }
        let idx = byte as usize;
        assert!(idx < NUM_SYMBOLS);
        match self.current_state.and_then(|s| self.dfa.states[s].transitions[idx]) {
            None => {
                self.stuck = true;
                None
            }
            Some(next) => {
                self.current_state = Some(next);
                Some(&self.dfa.states[next])
            }
        }
    }

    pub fn step_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.step(b).is_none() {
                break;
            }
        }
    }
}

impl<'a> From<&'a Dfa> for DfaEvaluator<'a> {
    fn from(value: &'a Dfa) -> Self {
        Self {
            dfa: value,
            current_state: value.initial_state(),
            stuck: value.initial_state().is_none(),
        }
    }
}
