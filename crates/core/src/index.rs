//! Clause indexing -- intern the fact universe and build the
//! antecedent/consequent lookup tables the solver walks.
//!
//! Tuples and clauses live in two arenas addressed by `usize`; every
//! per-run table downstream is a plain vector over those indices.

use crate::clause::Clause;
use crate::tuple::Tuple;
use std::collections::HashMap;

/// Position of a tuple in `ClauseIndex::universe`.
pub type TupleIx = usize;
/// Position of a clause in `ClauseIndex::clauses`.
pub type ClauseIx = usize;

/// Lookup tables over one evaluation run, built once and read-only after.
#[derive(Debug, Clone, Default)]
pub struct ClauseIndex {
    universe: Vec<Tuple>,
    tuple_ix: HashMap<Tuple, TupleIx>,
    clauses: Vec<Clause>,
    /// Head tuple of each clause.
    heads: Vec<TupleIx>,
    /// Distinct body tuples of each clause, in body order.
    bodies: Vec<Vec<TupleIx>>,
    /// tuple -> clauses whose body contains it
    antecedents: Vec<Vec<ClauseIx>>,
    /// tuple -> clauses whose head it is
    consequents: Vec<Vec<ClauseIx>>,
}

/// Build the indices for a clause collection.
///
/// Duplicates are collapsed and clauses are stored in sorted order, so
/// two runs over the same clauses produce identical indices whatever
/// order the evaluator reported them in.
pub fn build_indices<I>(clauses: I) -> ClauseIndex
where
    I: IntoIterator<Item = Clause>,
{
    let mut clauses: Vec<Clause> = clauses.into_iter().collect();
    clauses.sort();
    clauses.dedup();

    let mut idx = ClauseIndex {
        clauses: Vec::with_capacity(clauses.len()),
        ..ClauseIndex::default()
    };

    for clause in clauses {
        let cix = idx.clauses.len();
        let head = idx.intern(clause.head_tuple());
        let mut body: Vec<TupleIx> = Vec::with_capacity(clause.body().len());
        for tuple in clause.body_tuples() {
            let tix = idx.intern(tuple);
            // A tuple may appear under both signs.
            if !body.contains(&tix) {
                body.push(tix);
                idx.antecedents[tix].push(cix);
            }
        }
        idx.consequents[head].push(cix);
        idx.heads.push(head);
        idx.bodies.push(body);
        idx.clauses.push(clause);
    }

    idx
}

impl ClauseIndex {
    fn intern(&mut self, tuple: &Tuple) -> TupleIx {
        if let Some(&tix) = self.tuple_ix.get(tuple) {
            return tix;
        }
        let tix = self.universe.len();
        self.universe.push(tuple.clone());
        self.tuple_ix.insert(tuple.clone(), tix);
        self.antecedents.push(Vec::new());
        self.consequents.push(Vec::new());
        tix
    }

    /// Every distinct tuple seen as a head or body element.
    pub fn universe(&self) -> &[Tuple] {
        &self.universe
    }

    pub fn tuple_count(&self) -> usize {
        self.universe.len()
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn tuple(&self, tix: TupleIx) -> &Tuple {
        &self.universe[tix]
    }

    pub fn lookup(&self, tuple: &Tuple) -> Option<TupleIx> {
        self.tuple_ix.get(tuple).copied()
    }

    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.tuple_ix.contains_key(tuple)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn clause(&self, cix: ClauseIx) -> &Clause {
        &self.clauses[cix]
    }

    pub fn head(&self, cix: ClauseIx) -> TupleIx {
        self.heads[cix]
    }

    pub fn body(&self, cix: ClauseIx) -> &[TupleIx] {
        &self.bodies[cix]
    }

    /// Clauses that consume `tix` in their body.
    pub fn antecedents(&self, tix: TupleIx) -> &[ClauseIx] {
        &self.antecedents[tix]
    }

    /// Clauses that produce `tix` as their head.
    pub fn consequents(&self, tix: TupleIx) -> &[ClauseIx] {
        &self.consequents[tix]
    }

    /// Clauses consuming `tuple`; empty for tuples outside the universe.
    pub fn antecedents_of(&self, tuple: &Tuple) -> impl Iterator<Item = &Clause> {
        let ixs = self.lookup(tuple).map(|t| self.antecedents(t)).unwrap_or(&[]);
        ixs.iter().map(move |&c| &self.clauses[c])
    }

    /// Clauses producing `tuple`; empty for tuples outside the universe.
    pub fn consequents_of(&self, tuple: &Tuple) -> impl Iterator<Item = &Clause> {
        let ixs = self.lookup(tuple).map(|t| self.consequents(t)).unwrap_or(&[]);
        ixs.iter().map(move |&c| &self.clauses[c])
    }
}
