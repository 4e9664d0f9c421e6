//! Byte-alphabet deterministic finite automata.
//!
//! A [`Dfa`] is produced by [`crate::nfa::EpsilonFreeNfa::to_dfa`] (subset construction)
//! or by [`Dfa::union`] (product construction). States carry a set of terminal tags;
//! presence of at least one tag means the state is accepting.

pub mod eval;

use std::collections::{HashMap, HashSet, VecDeque};

/// Number of byte symbols a DFA can transition on (`0..=255`).
pub const NUM_SYMBOLS: usize = 256;

/// A single state of a [`Dfa`]. `transitions[b]` is `None` when there is no transition
/// on byte `b` (the source's `-1` sentinel, modeled idiomatically as an `Option`).
#[derive(Debug, Clone)]
pub struct DfaState {
    tags: Vec<i32>,
    transitions: Vec<Option<usize>>,
}

impl DfaState {
    fn new() -> Self {
        Self {
            tags: Vec::new(),
            transitions: vec![None; NUM_SYMBOLS],
        }
    }

    pub fn is_accepting(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn tags(&self) -> &[i32] {
        &self.tags
    }

    pub fn transition(&self, byte: u8) -> Option<usize> {
        self.transitions[byte as usize]
    }
}

/// A deterministic finite automaton over the byte alphabet.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    states: Vec<DfaState>,
    initial_state: Option<usize>,
}

impl Dfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the transition table by one row of 256 `None`s and returns the new id.
    pub fn add_state(&mut self) -> usize {
        self.states.push(DfaState::new());
        self.states.len() - 1
    }

    pub fn set_initial(&mut self, state: usize) {
        assert!(state < self.states.len(), "unknown state {state}");
        self.initial_state = Some(state);
    }

    pub fn add_transition(&mut self, from: usize, to: usize, byte: usize) {
        self.states[from].transitions[byte] = Some(to);
    }

    /// Unions `tags` into `state`'s terminal tag set, marking it accepting.
    pub fn mark_accepting(&mut self, state: usize, tags: &[i32]) {
        let s = &mut self.states[state];
        for &tag in tags {
            if !s.tags.contains(&tag) {
                s.tags.push(tag);
            }
        }
    }

    pub fn initial_state(&self) -> Option<usize> {
        self.initial_state
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True iff no accepting state is forward-reachable from `s`, including `s` itself.
    /// Visits at most `|Q|` states.
    pub fn is_sink_state(&self, s: usize) -> bool {
        let mut seen = HashSet::new();
        let mut frontier = VecDeque::new();
        seen.insert(s);
        frontier.push_back(s);
        while let Some(state) = frontier.pop_front() {
            if self.states[state].is_accepting() {
                return false;
            }
            for symbol in 0..NUM_SYMBOLS {
                if let Some(next) = self.states[state].transitions[symbol] {
                    if seen.insert(next) {
                        frontier.push_back(next);
                    }
                }
            }
        }
        true
    }

    /// Product construction. The result's states are pairs `(p, q)` with `p` from
    /// `self` and `q` from `other`; either component may be absent (no transition on
    /// the path so far). A product state is accepting iff either present component is
    /// accepting, with the union of their tag sets. Pairs where both components are
    /// absent are never materialized as states: such a transition is simply omitted,
    /// which observes identically after sink-state filtering.
    ///
    /// ```
    /// use toklr::dfa::Dfa;
    ///
    /// // accepts "a"
    /// let mut a = Dfa::new();
    /// let (s0, s1) = (a.add_state(), a.add_state());
    /// a.set_initial(s0);
    /// a.add_transition(s0, s1, b'a' as usize);
    /// a.mark_accepting(s1, &[1]);
    ///
    /// // accepts "b"
    /// let mut b = Dfa::new();
    /// let (t0, t1) = (b.add_state(), b.add_state());
    /// b.set_initial(t0);
    /// b.add_transition(t0, t1, b'b' as usize);
    /// b.mark_accepting(t1, &[2]);
    ///
    /// let any = a.union(&b);
    /// assert!(any.accepts(b"a"));
    /// assert!(any.accepts(b"b"));
    /// assert!(!any.accepts(b"c"));
    /// ```
    pub fn union(&self, other: &Dfa) -> Dfa {
        let mut result = Dfa::new();
        let (Some(p0), Some(q0)) = (self.initial_state, other.initial_state) else {
            return result;
        };

        let mut state_map: HashMap<(Option<usize>, Option<usize>), usize> = HashMap::new();
        let mut frontier = VecDeque::new();

        let start_pair = (Some(p0), Some(q0));
        let start_id = result.add_state();
        result.set_initial(start_id);
        state_map.insert(start_pair, start_id);
        frontier.push_back(start_pair);

        while let Some(pair) = frontier.pop_front() {
            let this_id = state_map[&pair];
            let (p, q) = pair;
            let mut tags = Vec::new();
            if let Some(p) = p {
                tags.extend(self.states[p].tags.iter().copied());
            }
            if let Some(q) = q {
                for &tag in &other.states[q].tags {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
            if !tags.is_empty() {
                result.mark_accepting(this_id, &tags);
            }

            for symbol in 0..NUM_SYMBOLS {
                let next_p = p.and_then(|p| self.states[p].transitions[symbol]);
                let next_q = q.and_then(|q| other.states[q].transitions[symbol]);
                if next_p.is_none() && next_q.is_none() {
                    continue;
                }
                let next_pair = (next_p, next_q);
                let target_id = *state_map.entry(next_pair).or_insert_with(|| {
                    let id = result.add_state();
                    frontier.push_back(next_pair);
                    id
                });
                result.add_transition(this_id, target_id, symbol);
            }
        }

        result
    }

    /// Removes states from which no accepting state is reachable (other than the
    /// states kept to preserve a well-defined `initial_state`), compacting the
    /// remaining states to dense ids in their original relative order.
    pub fn remove_sink_states(&self) -> Dfa {
        let Some(initial) = self.initial_state else {
            return self.clone();
        };
        let keep: Vec<usize> = (0..self.states.len())
            .filter(|&s| s == initial || !self.is_sink_state(s))
            .collect();
        let mut id_map = HashMap::new();
        let mut result = Dfa::new();
        for &old in &keep {
            id_map.insert(old, result.add_state());
        }
        for &old in &keep {
            let new_id = id_map[&old];
            result.states[new_id].tags = self.states[old].tags.clone();
            for symbol in 0..NUM_SYMBOLS {
                if let Some(target) = self.states[old].transitions[symbol] {
                    if let Some(&new_target) = id_map.get(&target) {
                        result.states[new_id].transitions[symbol] = Some(new_target);
                    }
                }
            }
        }
        result.initial_state = Some(id_map[&initial]);
        result
    }

    /// Hopcroft-style partition refinement. Tag-preserving: two states only merge
    /// when their terminal tag sets are equal, never merely when both are accepting.
    /// A no-op (returns an equivalent DFA unchanged in language) is also a conforming
    /// implementation; this one performs the refinement.
    ///
    /// ```
    /// use toklr::dfa::Dfa;
    ///
    /// // two DFAs, one per suffix, unioned into a single redundant machine
    /// let mut a = Dfa::new();
    /// let (s0, s1) = (a.add_state(), a.add_state());
    /// a.set_initial(s0);
    /// a.add_transition(s0, s1, b'a' as usize);
    /// a.mark_accepting(s1, &[1]);
    ///
    /// let mut b = Dfa::new();
    /// let (t0, t1) = (b.add_state(), b.add_state());
    /// b.set_initial(t0);
    /// b.add_transition(t0, t1, b'a' as usize);
    /// b.mark_accepting(t1, &[1]);
    ///
    /// let redundant = a.union(&b);
    /// let minimized = redundant.minimize();
    /// assert!(minimized.states().len() <= redundant.states().len());
    /// assert!(minimized.accepts(b"a"));
    /// assert!(!minimized.accepts(b"b"));
    /// ```
    pub fn minimize(&self) -> Dfa {
        let Some(initial) = self.initial_state else {
            return self.clone();
        };

        let mut partition: Vec<Vec<usize>> = {
            let mut groups: HashMap<Vec<i32>, Vec<usize>> = HashMap::new();
            for (idx, state) in self.states.iter().enumerate() {
                let mut key = state.tags.clone();
                key.sort_unstable();
                groups.entry(key).or_default().push(idx);
            }
            groups.into_values().collect()
        };

        loop {
            let class_of: HashMap<usize, usize> = partition
                .iter()
                .enumerate()
                .flat_map(|(ci, members)| members.iter().map(move |&s| (s, ci)))
                .collect();

            let mut next_partition: Vec<Vec<usize>> = Vec::new();
            let mut changed = false;
            for group in &partition {
                let mut buckets: HashMap<Vec<Option<usize>>, Vec<usize>> = HashMap::new();
                for &s in group {
                    let signature: Vec<Option<usize>> = (0..NUM_SYMBOLS)
                        .map(|sym| {
                            self.states[s].transitions[sym].map(|t| class_of[&t])
                        })
                        .collect();
                    buckets.entry(signature).or_default().push(s);
                }
                if buckets.len() > 1 {
                    changed = true;
                }
                next_partition.extend(buckets.into_values());
            }
            partition = next_partition;
            if !changed {
                break;
            }
        }

        let mut result = Dfa::new();
        let mut rep_of_class: Vec<usize> = Vec::with_capacity(partition.len());
        for group in &partition {
            let id = result.add_state();
            rep_of_class.push(id);
            let rep = group[0];
            result.states[id].tags = self.states[rep].tags.clone();
        }
        let class_of: HashMap<usize, usize> = partition
            .iter()
            .enumerate()
            .flat_map(|(ci, members)| members.iter().map(move |&s| (s, ci)))
            .collect();
        for (ci, group) in partition.iter().enumerate() {
            let rep = group[0];
            for symbol in 0..NUM_SYMBOLS {
                if let Some(target) = self.states[rep].transitions[symbol] {
                    let target_class = class_of[&target];
                    result.states[rep_of_class[ci]].transitions[symbol] =
                        Some(rep_of_class[target_class]);
                }
            }
        }
        result.initial_state = Some(rep_of_class[class_of[&initial]]);
        result
    }

    pub fn accepts(&self, input: &[u8]) -> bool {
        let mut ev = eval::DfaEvaluator::from(self);
        ev.step_all(input);
        ev.is_accepting()
    }
}
