//! Coreachability -- which tuples can be explained through a clause set.
//!
//! Starting from the observed tuples, BFS walks from each head back to
//! the body tuples of the selected clauses that produce it. Only clauses
//! whose head lands in that closure stay active.

use provex_core::{ClauseIndex, ClauseIx, Tuple, TupleIx};
use std::collections::{BTreeSet, VecDeque};

/// Membership bitmap over the clauses of one `ClauseIndex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseSet {
    members: Vec<bool>,
    len: usize,
}

impl ClauseSet {
    pub fn empty(capacity: usize) -> Self {
        ClauseSet {
            members: vec![false; capacity],
            len: 0,
        }
    }

    pub fn full(capacity: usize) -> Self {
        ClauseSet {
            members: vec![true; capacity],
            len: capacity,
        }
    }

    pub fn contains(&self, cix: ClauseIx) -> bool {
        self.members.get(cix).copied().unwrap_or(false)
    }

    /// Returns true if `cix` was not yet a member.
    pub fn insert(&mut self, cix: ClauseIx) -> bool {
        if self.members[cix] {
            return false;
        }
        self.members[cix] = true;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending clause order.
    pub fn iter(&self) -> impl Iterator<Item = ClauseIx> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(cix, &member)| member.then_some(cix))
    }

    pub fn is_subset(&self, other: &ClauseSet) -> bool {
        self.iter().all(|cix| other.contains(cix))
    }
}

/// Map tuples onto the index, dropping those outside the universe.
pub fn resolve_tuples<'t, I>(index: &ClauseIndex, tuples: I) -> Vec<TupleIx>
where
    I: IntoIterator<Item = &'t Tuple>,
{
    tuples.into_iter().filter_map(|t| index.lookup(t)).collect()
}

/// Every tuple reachable backwards from `observe` through `selected`,
/// the observed tuples included.
pub fn coreachable_tuples(
    index: &ClauseIndex,
    observe: &[TupleIx],
    selected: &ClauseSet,
) -> BTreeSet<TupleIx> {
    let mut visited: BTreeSet<TupleIx> = observe.iter().copied().collect();
    let mut queue: VecDeque<TupleIx> = visited.iter().copied().collect();

    while let Some(head) = queue.pop_front() {
        for &cix in index.consequents(head) {
            if !selected.contains(cix) {
                continue;
            }
            for &sub in index.body(cix) {
                if visited.insert(sub) {
                    queue.push_back(sub);
                }
            }
        }
    }

    visited
}

/// Selected clauses whose head is coreachable.
pub fn active_clauses(
    index: &ClauseIndex,
    selected: &ClauseSet,
    coreachable: &BTreeSet<TupleIx>,
) -> ClauseSet {
    let mut active = ClauseSet::empty(index.clause_count());
    for cix in selected.iter() {
        if coreachable.contains(&index.head(cix)) {
            active.insert(cix);
        }
    }
    active
}
