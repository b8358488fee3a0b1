//! Provenance construction -- the front door analyses feed clauses into.
//!
//! A builder accumulates rule descriptions, clauses and the input/output
//! tuple sets of one analysis, then runs index -> solve -> assemble on
//! demand. Each computation builds a fresh index and solver session, so
//! two builders never share working state.

use crate::assemble::{assemble, Provenance};
use crate::config::ProvenanceOptions;
use crate::dob::DobSolver;
use crate::dump::{dump_all_clauses, dump_provenance};
use crate::error::ProvenanceError;
use crate::reach::{active_clauses, coreachable_tuples, resolve_tuples, ClauseSet};
use provex_core::{build_indices, Clause, RuleId, Tuple};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Compute the provenance of `observe` in one call.
///
/// `observe` only drives coreachability; the result's outputs are the
/// members of `output_tuples` that some active clause mentions. Input
/// tuples that some clause derives are kept as inputs; use
/// [`ProvenanceBuilder`] to have them demoted.
pub fn compute_provenance(
    name: &str,
    clauses: &[Clause],
    input_tuples: &[Tuple],
    output_tuples: &[Tuple],
    observe: &[Tuple],
    rule_infos: BTreeMap<RuleId, String>,
    options: ProvenanceOptions,
) -> Provenance {
    let started = Instant::now();
    let index = build_indices(clauses.iter().cloned());
    let observed = resolve_tuples(&index, observe);

    let active = if options.prune {
        let solver = DobSolver::new(&index, input_tuples);
        info!(
            provenance = name,
            tuples = index.tuple_count(),
            clauses = index.clause_count(),
            passes = solver.passes(),
            "date-of-birth labeling solved"
        );
        solver.active_clauses(&observed, options.augment)
    } else {
        let all = ClauseSet::full(index.clause_count());
        let coreachable = coreachable_tuples(&index, &observed, &all);
        active_clauses(&index, &all, &coreachable)
    };

    let provenance = assemble(
        name,
        active.iter().map(|cix| index.clause(cix).clone()),
        input_tuples,
        output_tuples,
        rule_infos,
    );
    info!(
        provenance = name,
        kept = provenance.clauses().len(),
        total = index.clause_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "provenance computed"
    );
    provenance
}

/// Insertion-ordered tuple set with hashed membership.
#[derive(Debug, Clone, Default)]
struct TupleSet {
    items: Vec<Tuple>,
    members: HashSet<Tuple>,
}

impl TupleSet {
    fn insert(&mut self, tuple: Tuple) {
        if self.members.insert(tuple.clone()) {
            self.items.push(tuple);
        }
    }

    /// Order of the remaining members is kept.
    fn remove(&mut self, tuple: &Tuple) -> bool {
        if !self.members.remove(tuple) {
            return false;
        }
        self.items.retain(|t| t != tuple);
        true
    }

    fn as_slice(&self) -> &[Tuple] {
        &self.items
    }
}

/// Accumulates one analysis run and computes its provenance.
#[derive(Debug, Clone)]
pub struct ProvenanceBuilder {
    name: String,
    options: ProvenanceOptions,
    rule_infos: BTreeMap<RuleId, String>,
    clauses: Vec<Clause>,
    seen_clauses: HashSet<Clause>,
    input_tuples: TupleSet,
    output_tuples: TupleSet,
    provenance: Option<Provenance>,
}

impl ProvenanceBuilder {
    pub fn new(name: impl Into<String>, options: ProvenanceOptions) -> Self {
        ProvenanceBuilder {
            name: name.into(),
            options,
            rule_infos: BTreeMap::new(),
            clauses: Vec::new(),
            seen_clauses: HashSet::new(),
            input_tuples: TupleSet::default(),
            output_tuples: TupleSet::default(),
            provenance: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> ProvenanceOptions {
        self.options
    }

    /// Every clause received so far, in insertion order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn input_tuples(&self) -> &[Tuple] {
        self.input_tuples.as_slice()
    }

    pub fn output_tuples(&self) -> &[Tuple] {
        self.output_tuples.as_slice()
    }

    /// Register rule descriptions; later entries replace earlier ones.
    pub fn add_rule_infos<I, S>(&mut self, infos: I)
    where
        I: IntoIterator<Item = (RuleId, S)>,
        S: Into<String>,
    {
        for (rule_id, description) in infos {
            self.rule_infos.insert(rule_id, description.into());
        }
    }

    /// Add clauses, skipping ones already known. A clause deriving a
    /// current input tuple demotes that tuple to a derived one.
    pub fn add_clauses<I>(&mut self, clauses: I)
    where
        I: IntoIterator<Item = Clause>,
    {
        for clause in clauses {
            if self.seen_clauses.contains(&clause) {
                continue;
            }
            if self.input_tuples.remove(clause.head_tuple()) {
                warn!(
                    provenance = %self.name,
                    tuple = %clause.head_tuple(),
                    rule_id = clause.rule_id(),
                    "proof expanded: input tuple is derived by a clause"
                );
            }
            self.seen_clauses.insert(clause.clone());
            self.clauses.push(clause);
        }
    }

    pub fn add_input_tuples<I>(&mut self, tuples: I)
    where
        I: IntoIterator<Item = Tuple>,
    {
        for tuple in tuples {
            self.input_tuples.insert(tuple);
        }
    }

    pub fn add_output_tuples<I>(&mut self, tuples: I)
    where
        I: IntoIterator<Item = Tuple>,
    {
        for tuple in tuples {
            self.output_tuples.insert(tuple);
        }
    }

    /// Explain the output tuples. Replaces any earlier result.
    pub fn compute_provenance(&mut self) -> &Provenance {
        let computed = self.run(self.output_tuples.as_slice());
        self.provenance.insert(computed)
    }

    /// Explain an arbitrary tuple set. Observed tuples that are not
    /// output tuples end up hidden. Replaces any earlier result.
    pub fn compute_provenance_for(&mut self, observe: &[Tuple]) -> &Provenance {
        let computed = self.run(observe);
        self.provenance.insert(computed)
    }

    /// The last computed provenance, computing it from the output tuples
    /// on first use.
    pub fn provenance(&mut self) -> &Provenance {
        let computed = match self.provenance.take() {
            Some(existing) => existing,
            None => self.run(self.output_tuples.as_slice()),
        };
        self.provenance.insert(computed)
    }

    /// The last computed provenance, if any.
    pub fn computed(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// Write all five artifacts to `dir`.
    pub fn dump(&self, dir: &Path) -> Result<(), ProvenanceError> {
        let provenance = self
            .provenance
            .as_ref()
            .ok_or_else(|| ProvenanceError::NotComputed {
                name: self.name.clone(),
            })?;
        dump_provenance(provenance, dir)?;
        dump_all_clauses(&self.clauses, provenance, dir)
    }

    fn run(&self, observe: &[Tuple]) -> Provenance {
        compute_provenance(
            &self.name,
            &self.clauses,
            self.input_tuples.as_slice(),
            self.output_tuples.as_slice(),
            observe,
            self.rule_infos.clone(),
            self.options,
        )
    }
}
