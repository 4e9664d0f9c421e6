//! LR(1) generator (C5): item closure, canonical collection construction, ACTION/GOTO
//! table generation, state-id compaction and conflict reporting.

use crate::grammar::{Grammar, Symbol, END, GOAL};
use std::collections::{HashMap, HashSet, VecDeque};

/// An immutable `(production, cursor, lookahead)` record. Value-equal and hashable, as
/// required to intern [`State`]s by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: usize,
    pub cursor: usize,
    pub lookahead: Symbol,
}

impl Item {
    pub fn has_successor(&self, grammar: &Grammar) -> bool {
        self.cursor < grammar.production(self.production).rhs.len()
    }

    /// `rhs[cursor]`, or `None` if the cursor is at the end of the production.
    pub fn locus(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar
            .production(self.production)
            .rhs
            .get(self.cursor)
            .copied()
    }

    pub fn successor(&self) -> Item {
        Item {
            production: self.production,
            cursor: self.cursor + 1,
            lookahead: self.lookahead,
        }
    }
}

/// A canonical, sorted-and-deduplicated set of items: two closures producing the same
/// set of items compare equal and collapse under [`HashMap`] lookup.
pub type State = Vec<Item>;

fn canonicalize(items: HashSet<Item>) -> State {
    let mut v: Vec<Item> = items.into_iter().collect();
    v.sort();
    v
}

/// Extends `kernel` to its closure by repeatedly adding, for every item
/// `[A -> α . B β, a]` with `B` a non-terminal, every item `[B -> . γ, b]` for each
/// `B -> γ` and each `b ∈ FIRST(β a)`. Takes `kernel` by value and returns a new,
/// canonical state; the caller's data is never mutated in place.
pub fn closure(kernel: Vec<Item>, grammar: &Grammar) -> State {
    let mut items: HashSet<Item> = kernel.into_iter().collect();
    let mut frontier: VecDeque<Item> = items.iter().copied().collect();

    while let Some(item) = frontier.pop_front() {
        let Some(Symbol::NonTerminal(_)) = item.locus(grammar) else {
            continue;
        };
        let locus = item.locus(grammar).unwrap();
        let beta = &grammar.production(item.production).rhs[item.cursor + 1..];
        let lookaheads = grammar.first_of_sequence(beta, item.lookahead);

        for (index, production) in grammar.productions().iter().enumerate() {
            if production.lhs != locus {
                continue;
            }
            for &lookahead in &lookaheads {
                let new_item = Item {
                    production: index,
                    cursor: 0,
                    lookahead,
                };
                if items.insert(new_item) {
                    frontier.push_back(new_item);
                }
            }
        }
    }

    canonicalize(items)
}

/// One parsing-table action. `Shift`/`Goto` carry the successor state id; `Reduce`/
/// `Accept` carry the production index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Shift(usize),
    Goto(usize),
    Reduce(usize),
    Accept(usize),
}

/// A `(state, symbol)` cell that ended up with more than one action: a shift/reduce or
/// reduce/reduce conflict. Non-fatal — callers decide whether to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarConflict {
    pub state: usize,
    pub symbol: Symbol,
    pub actions: Vec<Action>,
}

/// One entry of the reduction buffer: `(lhs, |rhs|, callback_identity)`. The
/// `callback` field is an opaque index the generator never invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionEntry {
    pub lhs: Symbol,
    pub rhs_len: usize,
    pub callback: usize,
}

/// The frozen output of LR(1) generation: a conflict-free-or-not ACTION/GOTO table
/// with compact integer state ids (initial state is always 0, per [`Grammar::new`]'s
/// augmented-start requirement), plus any conflicts found along the way.
#[derive(Debug, Clone)]
pub struct ParsingTable {
    pub initial_state: usize,
    pub table: HashMap<(usize, Symbol), Action>,
    pub conflicts: Vec<GrammarConflict>,
}

impl ParsingTable {
    pub fn action(&self, state: usize, symbol: Symbol) -> Option<Action> {
        self.table.get(&(state, symbol)).copied()
    }
}

/// Builds the canonical collection and ACTION/GOTO table for `grammar`.
///
/// States are interned by value in a work-list (`frontier`) over unexplored states;
/// state ids are assigned at first discovery, so the initial state is 0 and every
/// other state gets the next free id in discovery order — this folds the generator's
/// compaction pass directly into construction instead of a second renumbering pass.
pub fn generate(grammar: &Grammar) -> ParsingTable {
    let mut cells: HashMap<(usize, Symbol), HashSet<Action>> = HashMap::new();
    let mut state_id: HashMap<State, usize> = HashMap::new();
    let mut states: Vec<State> = Vec::new();
    let mut frontier: VecDeque<usize> = VecDeque::new();

    let initial_kernel = vec![Item {
        production: 0,
        cursor: 0,
        lookahead: END,
    }];
    let initial_state = closure(initial_kernel, grammar);
    state_id.insert(initial_state.clone(), 0);
    states.push(initial_state);
    frontier.push_back(0);

    while let Some(state_idx) = frontier.pop_front() {
        let items = states[state_idx].clone();
        let mut successors_by_locus: HashMap<Symbol, Vec<Item>> = HashMap::new();

        for item in &items {
            match item.locus(grammar) {
                Some(locus) => {
                    successors_by_locus
                        .entry(locus)
                        .or_default()
                        .push(item.successor());
                }
                None => {
                    let production = grammar.production(item.production);
                    let action = if production.lhs == GOAL {
                        Action::Accept(item.production)
                    } else {
                        Action::Reduce(item.production)
                    };
                    cells
                        .entry((state_idx, item.lookahead))
                        .or_default()
                        .insert(action);
                }
            }
        }

        for (symbol, kernel) in successors_by_locus {
            let target_set = closure(kernel, grammar);
            let target_id = *state_id.entry(target_set.clone()).or_insert_with(|| {
                states.push(target_set);
                let id = states.len() - 1;
                frontier.push_back(id);
                id
            });
            let action = if symbol.is_terminal() {
                Action::Shift(target_id)
            } else {
                Action::Goto(target_id)
            };
            cells.entry((state_idx, symbol)).or_default().insert(action);
        }
    }

    let mut table = HashMap::with_capacity(cells.len());
    let mut conflicts = Vec::new();
    for ((state_idx, symbol), actions) in cells {
        let mut actions: Vec<Action> = actions.into_iter().collect();
        actions.sort();
        if actions.len() > 1 {
            conflicts.push(GrammarConflict {
                state: state_idx,
                symbol,
                actions: actions.clone(),
            });
        }
        table.insert((state_idx, symbol), actions[0]);
    }
    conflicts.sort_by(|a, b| (a.state, a.symbol).cmp(&(b.state, b.symbol)));

    ParsingTable {
        initial_state: 0,
        table,
        conflicts,
    }
}

/// Builds the reduction buffer for `grammar`, zipping each production with the
/// caller-supplied opaque `callback` identity at the same index.
pub fn reduction_buffer(grammar: &Grammar, callbacks: &[usize]) -> Vec<ReductionEntry> {
    grammar
        .productions()
        .iter()
        .zip(callbacks)
        .map(|(p, &callback)| ReductionEntry {
            lhs: p.lhs,
            rhs_len: p.rhs.len(),
            callback,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, Production, GOAL};

    // S' -> S, S -> C C, C -> c C, C -> d
    fn c_grammar() -> (Grammar, Symbol, Symbol) {
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
        (Grammar::new(productions).unwrap(), lower_c, d)
    }

    #[test]
    fn canonical_collection_has_ten_states() {
        let (grammar, _lower_c, _d) = c_grammar();
        let table = generate(&grammar);
        let mut seen_states = HashSet::new();
        for &(state, _) in table.table.keys() {
            seen_states.insert(state);
        }
        for conflict in &table.conflicts {
            seen_states.insert(conflict.state);
        }
        assert_eq!(seen_states.len(), 10);
        assert!(table.conflicts.is_empty());
    }

    #[test]
    fn drives_cdd_to_accept_with_the_expected_action_sequence() {
        let (grammar, lower_c, d) = c_grammar();
        let table = generate(&grammar);

        // Simulate a shift/reduce parser over "cdd" + END, recording the kind of
        // action taken at each step, to check against the documented trace. Exact
        // numeric state ids depend on HashMap iteration order during discovery, so
        // only the symbolic action kinds and their order are asserted.
        let input = [lower_c, d, d, END];
        let mut pos = 0;
        let mut state_stack = vec![table.initial_state];
        let mut kinds = Vec::new();

        loop {
            let state = *state_stack.last().unwrap();
            let lookahead = input[pos];
            let action = table.action(state, lookahead).expect("no action for cell");
            match action {
                Action::Shift(next) => {
                    kinds.push("shift");
                    state_stack.push(next);
                    pos += 1;
                }
                Action::Reduce(production_idx) => {
                    kinds.push("reduce");
                    let production = grammar.production(production_idx);
                    for _ in 0..production.rhs.len() {
                        state_stack.pop();
                    }
                    let goto_state = *state_stack.last().unwrap();
                    let Action::Goto(next) = table.action(goto_state, production.lhs).unwrap()
                    else {
                        panic!("expected a GOTO action");
                    };
                    state_stack.push(next);
                }
                Action::Accept(_) => {
                    kinds.push("accept");
                    break;
                }
                Action::Goto(_) => unreachable!("GOTO is never looked up on a terminal"),
            }
        }

        assert_eq!(
            kinds,
            vec![
                "shift", "shift", "reduce", "reduce", "shift", "reduce", "reduce", "accept",
            ]
        );
    }

    // E -> E + T | T, T -> T * F | F, F -> ( E ) | id: the textbook unambiguous
    // arithmetic-expression grammar, used here as a second, independently-checkable
    // fixture for the generator (distinct from the c/d grammar above).
    fn arithmetic_grammar() -> (Grammar, [Symbol; 5]) {
        let e = Symbol::NonTerminal(0);
        let t = Symbol::NonTerminal(1);
        let f = Symbol::NonTerminal(2);
        let plus = Symbol::Terminal(0);
        let star = Symbol::Terminal(1);
        let lparen = Symbol::Terminal(2);
        let rparen = Symbol::Terminal(3);
        let id = Symbol::Terminal(4);
        let productions = vec![
            Production::new(0, GOAL, vec![e]),
            Production::new(1, e, vec![e, plus, t]),
            Production::new(2, e, vec![t]),
            Production::new(3, t, vec![t, star, f]),
            Production::new(4, t, vec![f]),
            Production::new(5, f, vec![lparen, e, rparen]),
            Production::new(6, f, vec![id]),
        ];
        (
            Grammar::new(productions).unwrap(),
            [plus, star, lparen, rparen, id],
        )
    }

    #[test]
    fn arithmetic_grammar_is_conflict_free() {
        let (grammar, _terminals) = arithmetic_grammar();
        let table = generate(&grammar);
        assert!(table.conflicts.is_empty());
    }

    #[test]
    fn arithmetic_grammar_accepts_id_plus_id_times_id() {
        let (grammar, terminals) = arithmetic_grammar();
        let [plus, star, _lparen, _rparen, id] = terminals;
        let table = generate(&grammar);

        let input = [id, plus, id, star, id, END];
        let mut pos = 0;
        let mut state_stack = vec![table.initial_state];
        let mut accepted = false;

        while pos < input.len() {
            let state = *state_stack.last().unwrap();
            let lookahead = input[pos];
            let action = table.action(state, lookahead).expect("no action for cell");
            match action {
                Action::Shift(next) => {
                    state_stack.push(next);
                    pos += 1;
                }
                Action::Reduce(production_idx) => {
                    let production = grammar.production(production_idx);
                    for _ in 0..production.rhs.len() {
                        state_stack.pop();
                    }
                    let goto_state = *state_stack.last().unwrap();
                    let Action::Goto(next) = table.action(goto_state, production.lhs).unwrap()
                    else {
                        panic!("expected a GOTO action");
                    };
                    state_stack.push(next);
                }
                Action::Accept(_) => {
                    accepted = true;
                    break;
                }
                Action::Goto(_) => unreachable!("GOTO is never looked up on a terminal"),
            }
        }

        assert!(accepted, "id + id * id should reduce cleanly to ACCEPT");
    }
}
