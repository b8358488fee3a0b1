//! Date-of-birth labeling -- cycle breaking for circular derivations.
//!
//! Every tuple gets the depth of its shallowest derivation from the input
//! tuples (its "date of birth"). A clause whose head is strictly younger
//! than all of its body tuples is a forward clause; the forward clauses
//! form an acyclic subset because dates strictly increase along them.
//! Augmentation then re-admits removed clauses in batches, halving a batch
//! whenever it would close a cycle.
//!
//! A `DobSolver` is one solving session over one `ClauseIndex`: it owns
//! the labeling and nothing survives across sessions.

use crate::reach::{active_clauses, coreachable_tuples, ClauseSet};
use provex_core::{ClauseIndex, ClauseIx, Tuple, TupleIx};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Labeling of one clause index, solved to fixpoint on construction.
#[derive(Debug, Clone)]
pub struct DobSolver<'a> {
    index: &'a ClauseIndex,
    dob: Vec<usize>,
    max_dob: usize,
    is_input: Vec<bool>,
    passes: usize,
}

impl<'a> DobSolver<'a> {
    /// Label `index`, fixing `inputs` at date 0. Input tuples that never
    /// occur in a clause are irrelevant and ignored.
    pub fn new<'t, I>(index: &'a ClauseIndex, inputs: I) -> Self
    where
        I: IntoIterator<Item = &'t Tuple>,
    {
        let max_dob = index.tuple_count();
        let mut is_input = vec![false; max_dob];
        for tix in inputs.into_iter().filter_map(|t| index.lookup(t)) {
            is_input[tix] = true;
        }
        let dob = is_input
            .iter()
            .map(|&input| if input { 0 } else { max_dob })
            .collect();

        let mut solver = DobSolver {
            index,
            dob,
            max_dob,
            is_input,
            passes: 0,
        };
        solver.solve();
        solver
    }

    /// Relax every clause until a full pass changes nothing. Dates only
    /// decrease and are bounded below, so this stops after at most
    /// `max_dob + 1` passes.
    fn solve(&mut self) {
        loop {
            self.passes += 1;
            let mut changed = 0usize;
            for head in 0..self.index.tuple_count() {
                for &cix in self.index.consequents(head) {
                    let candidate = (self.max_body_dob(cix) + 1).min(self.max_dob);
                    if candidate < self.dob[head] {
                        self.dob[head] = candidate;
                        changed += 1;
                    }
                }
            }
            if changed == 0 {
                break;
            }
        }
        debug!(
            tuples = self.index.tuple_count(),
            passes = self.passes,
            "date-of-birth labeling solved"
        );
    }

    fn max_body_dob(&self, cix: ClauseIx) -> usize {
        self.index
            .body(cix)
            .iter()
            .map(|&sub| self.dob[sub])
            .max()
            .unwrap_or(0)
    }

    pub fn index(&self) -> &'a ClauseIndex {
        self.index
    }

    /// Sentinel date of tuples with no non-circular derivation.
    pub fn max_dob(&self) -> usize {
        self.max_dob
    }

    /// Full passes the fixpoint took, the final quiet pass included.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn dob_of(&self, tix: TupleIx) -> usize {
        self.dob[tix]
    }

    pub fn dob(&self, tuple: &Tuple) -> Option<usize> {
        self.index.lookup(tuple).map(|tix| self.dob[tix])
    }

    /// True for tuples still at the sentinel: only circular derivations.
    pub fn is_underivable(&self, tix: TupleIx) -> bool {
        !self.is_input[tix] && self.dob[tix] == self.max_dob
    }

    /// Clauses whose head is older than each of its body tuples.
    pub fn forward_clauses(&self) -> ClauseSet {
        let mut forward = ClauseSet::empty(self.index.clause_count());
        for cix in 0..self.index.clause_count() {
            if self.dob[self.index.head(cix)] > self.max_body_dob(cix) {
                forward.insert(cix);
            }
        }
        debug!(forward = forward.len(), "forward clauses selected");
        forward
    }

    /// Grow `forward` with every removed clause that keeps the set
    /// acyclic. Clauses deriving an input tuple are never candidates.
    pub fn augment(&self, forward: &ClauseSet) -> ClauseSet {
        let mut augmented = forward.clone();
        let candidates: Vec<ClauseIx> = (0..self.index.clause_count())
            .filter(|&cix| !forward.contains(cix) && !self.is_input[self.index.head(cix)])
            .collect();
        debug!(candidates = candidates.len(), "augmenting forward clauses");

        self.try_add(&candidates, &mut augmented);

        debug!(
            added = augmented.len() - forward.len(),
            discarded = candidates.len() + forward.len() - augmented.len(),
            "forward clauses augmented"
        );
        augmented
    }

    /// Admit `batch` whole if it cannot close a cycle, otherwise split it.
    /// A single clause that fails the check is a back-edge and is dropped.
    fn try_add(&self, batch: &[ClauseIx], augmented: &mut ClauseSet) {
        if batch.is_empty() {
            warn!("no candidates to augment forward clauses");
        } else if self.is_ancestor_descendant_disjoint(batch, augmented) {
            for &cix in batch {
                augmented.insert(cix);
            }
        } else if batch.len() == 1 {
            debug!(clause = %self.index.clause(batch[0]), "back-edge discarded");
        } else {
            let (lower, upper) = batch.split_at(batch.len() / 2);
            self.try_add(lower, augmented);
            self.try_add(upper, augmented);
        }
    }

    /// Bidirectional search through `augmented`: the ancestors of the
    /// batch's body tuples and the descendants of its heads must never
    /// meet. Always expands the smaller side.
    pub fn is_ancestor_descendant_disjoint(
        &self,
        batch: &[ClauseIx],
        augmented: &ClauseSet,
    ) -> bool {
        let mut ancestors: HashSet<TupleIx> = HashSet::new();
        let mut descendants: HashSet<TupleIx> = HashSet::new();
        for &cix in batch {
            ancestors.extend(self.index.body(cix).iter().copied());
            descendants.insert(self.index.head(cix));
        }
        // Self-loops and cycles made purely of batch clauses meet here.
        if ancestors.iter().any(|t| descendants.contains(t)) {
            return false;
        }

        let mut new_ancestors: VecDeque<TupleIx> = ancestors.iter().copied().collect();
        let mut new_descendants: VecDeque<TupleIx> = descendants.iter().copied().collect();

        loop {
            let expand_ancestors = if new_descendants.is_empty() {
                true
            } else {
                !new_ancestors.is_empty() && ancestors.len() < descendants.len()
            };

            if expand_ancestors {
                let Some(anc) = new_ancestors.pop_front() else {
                    return true;
                };
                for &cix in self.index.consequents(anc) {
                    if !augmented.contains(cix) {
                        continue;
                    }
                    for &sub in self.index.body(cix) {
                        if descendants.contains(&sub) {
                            return false;
                        }
                        if ancestors.insert(sub) {
                            new_ancestors.push_back(sub);
                        }
                    }
                }
            } else {
                let Some(desc) = new_descendants.pop_front() else {
                    return true;
                };
                for &cix in self.index.antecedents(desc) {
                    if !augmented.contains(cix) {
                        continue;
                    }
                    let head = self.index.head(cix);
                    if ancestors.contains(&head) {
                        return false;
                    }
                    if descendants.insert(head) {
                        new_descendants.push_back(head);
                    }
                }
            }
        }
    }

    /// Forward clauses (augmented if asked) that lie on a path to one of
    /// the observed tuples.
    pub fn active_clauses(&self, observe: &[TupleIx], augment: bool) -> ClauseSet {
        let forward = self.forward_clauses();
        let selected = if augment {
            self.augment(&forward)
        } else {
            forward
        };
        let coreachable = coreachable_tuples(self.index, observe, &selected);
        let active = active_clauses(self.index, &selected, &coreachable);
        debug!(
            observed = observe.len(),
            coreachable = coreachable.len(),
            active = active.len(),
            "active clauses computed"
        );
        active
    }
}
