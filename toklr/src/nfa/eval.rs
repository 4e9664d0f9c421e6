//! Step-by-step NFA simulation, used by the test suite to check language equivalence
//! against the DFAs produced by epsilon-removal and subset construction.

use crate::nfa::{Nfa, NfaState, NUM_SYMBOLS};
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct NfaEvaluator<'a> {
    nfa: &'a Nfa,
    current_states: HashSet<usize>,
}

impl<'a> NfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current_states().iter().any(|s| s.accepting)
    }

    pub fn current_states(&self) -> Vec<&NfaState> {
        self.current_states
            .iter()
            .map(|&s| &self.nfa.states[s])
            .collect()
    }

    pub fn current_state_indices(&self) -> &HashSet<usize> {
        &self.current_states
    }

    pub fn step(&mut self, byte: u8) {
        let idx = byte as usize;
        assert!(idx < NUM_SYMBOLS);
        self.current_states = self
            .current_states
            .iter()
            .flat_map(|&state| self.nfa.states[state].transitions[idx].iter().copied())
            .collect();
        self.include_closure();
    }

    pub fn step_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.step(b);
        }
    }

    fn include_closure(&mut self) {
        let mut updated = true;
        let mut to_push = HashSet::new();
        while updated {
            updated = false;
            for state in self.current_states.iter() {
                for epsilon_state in self.nfa.states[*state].epsilon_transitions.iter() {
                    if self.current_states.contains(epsilon_state) {
                        continue;
                    }
                    updated = true;
                    to_push.insert(*epsilon_state);
                }
            }
            self.current_states.extend(to_push.drain());
        }
    }
}

impl<'a> From<&'a Nfa> for NfaEvaluator<'a> {
    fn from(value: &'a Nfa) -> Self {
        let mut evaluator = Self {
            nfa: value,
            current_states: HashSet::new(),
        };
        if let Some(initial) = value.initial_state() {
            evaluator.current_states.insert(initial);
        }
        evaluator.include_closure();
        evaluator
    }
}
