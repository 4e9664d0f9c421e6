//! Grammar model & FIRST (C4): productions, terminal/non-terminal id allocation and
//! the FIRST-set fixpoint, shared by the LR(1) generator in [`crate::lr1`].

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A terminal or non-terminal symbol. Reserved sentinels ([`END`], [`NIL`], [`GOAL`])
/// use negative ids, disjoint from the non-negative ids handed out by
/// [`TerminalAllocator`] and [`NonTerminalAllocator`], so `matches!(sym, Symbol::Terminal(_))`
/// decides terminal-ness in O(1) without a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(i32),
    NonTerminal(i32),
}

impl Symbol {
    pub fn is_terminal(self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

/// Reserved end-of-input terminal.
pub const END: Symbol = Symbol::Terminal(-1);
/// Reserved empty-string marker, internal to FIRST computation. Never surfaces in a
/// final lookahead set.
pub const NIL: Symbol = Symbol::Terminal(-2);
/// Reserved augmented start non-terminal.
pub const GOAL: Symbol = Symbol::NonTerminal(-1);

/// Hands out fresh, dense, non-negative terminal ids.
#[derive(Debug, Clone, Default)]
pub struct TerminalAllocator {
    next: i32,
}

impl TerminalAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Symbol {
        let s = Symbol::Terminal(self.next);
        self.next += 1;
        s
    }
}

/// Hands out fresh, dense, non-negative non-terminal ids.
#[derive(Debug, Clone, Default)]
pub struct NonTerminalAllocator {
    next: i32,
}

impl NonTerminalAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Symbol {
        let s = Symbol::NonTerminal(self.next);
        self.next += 1;
        s
    }
}

/// An immutable `(index, lhs, rhs)` record. `index` is this production's position in
/// the grammar's production list and its id everywhere else (REDUCE/ACCEPT actions,
/// the reduction buffer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub index: usize,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(index: usize, lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        Self { index, lhs, rhs }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar must have at least one production")]
    Empty,
    #[error("production 0 must be the augmented start production GOAL -> S, found lhs {0:?}")]
    MissingAugmentedStart(Symbol),
    #[error("the augmented start production's right-hand side must be a single non-terminal, found {0:?}")]
    MalformedAugmentedStart(Vec<Symbol>),
    #[error("production at position {position} declares index {declared}, expected {position}")]
    NonDenseIndex { position: usize, declared: usize },
}

/// A context-free grammar plus its fixpoint-computed FIRST sets.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    first: HashMap<Symbol, HashSet<Symbol>>,
}

impl Grammar {
    /// Validates `productions` (dense indices, a well-shaped augmented start rule) and
    /// computes FIRST sets for every non-terminal by fixpoint iteration.
    pub fn new(productions: Vec<Production>) -> Result<Self, GrammarError> {
        let first_production = productions.first().ok_or(GrammarError::Empty)?;
        if first_production.lhs != GOAL {
            return Err(GrammarError::MissingAugmentedStart(first_production.lhs));
        }
        if first_production.rhs.len() != 1 || first_production.rhs[0].is_terminal() {
            return Err(GrammarError::MalformedAugmentedStart(
                first_production.rhs.clone(),
            ));
        }
        for (position, production) in productions.iter().enumerate() {
            if production.index != position {
                return Err(GrammarError::NonDenseIndex {
                    position,
                    declared: production.index,
                });
            }
        }

        let first = Self::compute_first(&productions);
        Ok(Self { productions, first })
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// `FIRST(N)` for non-terminal `N`; empty for an unknown non-terminal.
    pub fn first_of_nonterminal(&self, n: Symbol) -> HashSet<Symbol> {
        self.first.get(&n).cloned().unwrap_or_default()
    }

    /// `FIRST(sym)`: `{sym}` for a terminal, `FIRST(N)` for a non-terminal.
    pub fn first_of_symbol(&self, sym: Symbol) -> HashSet<Symbol> {
        match sym {
            Symbol::Terminal(_) => HashSet::from([sym]),
            Symbol::NonTerminal(_) => self.first_of_nonterminal(sym),
        }
    }

    /// `FIRST(β a)`: scan `beta` left to right using FIRST and nullability; if every
    /// symbol in `beta` is nullable, the result also contains `lookahead`. NIL itself
    /// is never inserted into the result: it is purely an internal nullability marker.
    pub fn first_of_sequence(&self, beta: &[Symbol], lookahead: Symbol) -> HashSet<Symbol> {
        let mut result = HashSet::new();
        let mut all_nullable = true;
        for &sym in beta {
            let f = self.first_of_symbol(sym);
            result.extend(f.iter().copied().filter(|&t| t != NIL));
            if !f.contains(&NIL) {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.insert(lookahead);
        }
        result
    }

    fn compute_first(productions: &[Production]) -> HashMap<Symbol, HashSet<Symbol>> {
        let mut first: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();
        for p in productions {
            first.entry(p.lhs).or_default();
        }

        loop {
            let mut changed = false;
            for p in productions {
                let mut all_nullable_so_far = true;
                for &sym in &p.rhs {
                    match sym {
                        Symbol::Terminal(_) => {
                            changed |= first.entry(p.lhs).or_default().insert(sym);
                            all_nullable_so_far = false;
                            break;
                        }
                        Symbol::NonTerminal(_) => {
                            let sym_first = first.entry(sym).or_default().clone();
                            for &t in sym_first.iter().filter(|&&t| t != NIL) {
                                changed |= first.entry(p.lhs).or_default().insert(t);
                            }
                            if !sym_first.contains(&NIL) {
                                all_nullable_so_far = false;
                                break;
                            }
                        }
                    }
                }
                if all_nullable_so_far {
                    changed |= first.entry(p.lhs).or_default().insert(NIL);
                }
            }
            if !changed {
                break;
            }
        }

        first
    }
}
