//! Provenance assembly -- filter the fact universe down to what the
//! active clauses mention and give every retained item a stable id.
//!
//! Tuple ids (`T0`, `T1`, ...) run over inputs, then hidden tuples, then
//! outputs, each group in tuple order. Rule ids (`R0`, ...) follow
//! ascending rule id; clause ids (`D0`, ...) follow clause order.

use crate::error::ProvenanceError;
use provex_core::{Clause, Literal, RuleId, Tuple};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::warn;

/// The pruned, acyclic explanation of a set of observed tuples.
///
/// Built once by [`assemble`] and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    name: String,
    /// Every retained tuple, indexed by tuple id.
    tuples: Vec<Tuple>,
    input_tuples: Vec<Tuple>,
    output_tuples: Vec<Tuple>,
    hidden_tuples: Vec<Tuple>,
    /// Retained clauses, indexed by clause id.
    clauses: Vec<Clause>,
    rule_infos: BTreeMap<RuleId, String>,
    #[serde(skip)]
    tuple_ids: HashMap<Tuple, usize>,
    #[serde(skip)]
    clause_ids: HashMap<Clause, usize>,
    #[serde(skip)]
    rule_ids: BTreeMap<RuleId, usize>,
}

/// Assemble a provenance from the clauses that survived pruning.
///
/// `input_tuples` and `output_tuples` are the caller's full sets; only
/// members mentioned by some active clause are retained. Rules without a
/// registered description fall back to the description their clauses
/// carry.
pub fn assemble<I>(
    name: &str,
    active_clauses: I,
    input_tuples: &[Tuple],
    output_tuples: &[Tuple],
    mut rule_infos: BTreeMap<RuleId, String>,
) -> Provenance
where
    I: IntoIterator<Item = Clause>,
{
    let mut clauses: Vec<Clause> = active_clauses.into_iter().collect();
    clauses.sort();
    clauses.dedup();

    if clauses.is_empty() && !output_tuples.is_empty() {
        warn!(
            provenance = name,
            outputs = output_tuples.len(),
            "no active clauses; output tuples are left unexplained"
        );
    }

    let mut active: HashSet<&Tuple> = HashSet::new();
    for clause in &clauses {
        active.insert(clause.head_tuple());
        active.extend(clause.body_tuples());
        if !clause.description().is_empty() {
            rule_infos
                .entry(clause.rule_id())
                .or_insert_with(|| clause.description().to_string());
        }
    }

    let retain = |group: &[Tuple]| -> Vec<Tuple> {
        let kept: BTreeSet<&Tuple> = group.iter().filter(|t| active.contains(t)).collect();
        kept.into_iter().cloned().collect()
    };
    let inputs = retain(input_tuples);
    let outputs = retain(output_tuples);

    let visible: HashSet<&Tuple> = inputs.iter().chain(outputs.iter()).collect();
    let hidden: Vec<Tuple> = active
        .iter()
        .filter(|t| !visible.contains(*t))
        .copied()
        .collect::<BTreeSet<&Tuple>>()
        .into_iter()
        .cloned()
        .collect();

    let mut tuples: Vec<Tuple> = Vec::with_capacity(active.len());
    let mut tuple_ids: HashMap<Tuple, usize> = HashMap::with_capacity(active.len());
    for t in inputs.iter().chain(hidden.iter()).chain(outputs.iter()) {
        if !tuple_ids.contains_key(t) {
            tuple_ids.insert(t.clone(), tuples.len());
            tuples.push(t.clone());
        }
    }

    let clause_ids = clauses
        .iter()
        .enumerate()
        .map(|(id, c)| (c.clone(), id))
        .collect();
    let rule_ids = clauses
        .iter()
        .map(Clause::rule_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(id, rule)| (rule, id))
        .collect();

    Provenance {
        name: name.to_string(),
        tuples,
        input_tuples: inputs,
        output_tuples: outputs,
        hidden_tuples: hidden,
        clauses,
        rule_infos,
        tuple_ids,
        clause_ids,
        rule_ids,
    }
}

fn parse_id(id: &str, tag: char) -> Option<usize> {
    id.strip_prefix(tag)?.parse().ok()
}

impl Provenance {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All retained tuples in id order.
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn input_tuples(&self) -> &[Tuple] {
        &self.input_tuples
    }

    pub fn output_tuples(&self) -> &[Tuple] {
        &self.output_tuples
    }

    pub fn hidden_tuples(&self) -> &[Tuple] {
        &self.hidden_tuples
    }

    /// Retained clauses in id order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Every rule description known to the run, retained or not.
    pub fn rule_infos(&self) -> &BTreeMap<RuleId, String> {
        &self.rule_infos
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn encode_tuple(&self, tuple: &Tuple) -> Option<String> {
        self.tuple_ids.get(tuple).map(|id| format!("T{}", id))
    }

    pub fn decode_tuple(&self, id: &str) -> Result<&Tuple, ProvenanceError> {
        parse_id(id, 'T')
            .and_then(|ix| self.tuples.get(ix))
            .ok_or_else(|| ProvenanceError::UnknownId(id.to_string()))
    }

    pub fn encode_clause(&self, clause: &Clause) -> Option<String> {
        self.clause_ids.get(clause).map(|id| format!("D{}", id))
    }

    pub fn decode_clause(&self, id: &str) -> Result<&Clause, ProvenanceError> {
        parse_id(id, 'D')
            .and_then(|ix| self.clauses.get(ix))
            .ok_or_else(|| ProvenanceError::UnknownId(id.to_string()))
    }

    /// `R<n>` for a rule with at least one retained clause.
    pub fn rule_label(&self, rule_id: RuleId) -> Option<String> {
        self.rule_ids.get(&rule_id).map(|id| format!("R{}", id))
    }

    /// Retained rule ids in label order.
    pub fn retained_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rule_ids.keys().copied()
    }

    pub fn rule_description(&self, rule_id: RuleId) -> String {
        self.rule_infos
            .get(&rule_id)
            .cloned()
            .unwrap_or_else(|| format!("rule {}", rule_id))
    }

    fn encode_literal(&self, lit: &Literal) -> String {
        let id = self
            .encode_tuple(&lit.tuple)
            .unwrap_or_else(|| lit.tuple.to_string());
        if lit.sign.is_negative() {
            format!("NOT {}", id)
        } else {
            id
        }
    }

    /// One clause in dump notation: `R<n>: <body>, ..., <head>`, the head
    /// always last.
    pub fn clause_detail(&self, clause: &Clause) -> String {
        let rule = self
            .rule_label(clause.rule_id())
            .unwrap_or_else(|| format!("#{}", clause.rule_id()));
        let literals: Vec<String> = clause
            .body()
            .iter()
            .chain(std::iter::once(clause.head()))
            .map(|l| self.encode_literal(l))
            .collect();
        format!("{}: {}", rule, literals.join(", "))
    }

    /// Expand any id this provenance assigned into readable text.
    pub fn unfold_id(&self, id: &str) -> Result<String, ProvenanceError> {
        match id.chars().next() {
            Some('T') => Ok(format!("{}: {}", id, self.decode_tuple(id)?)),
            Some('D') => Ok(format!("{}: {}", id, self.clause_detail(self.decode_clause(id)?))),
            Some('R') => {
                let ix = parse_id(id, 'R').ok_or_else(|| ProvenanceError::UnknownId(id.to_string()))?;
                let rule = self
                    .rule_ids
                    .iter()
                    .find(|(_, n)| **n == ix)
                    .map(|(&rule, _)| rule)
                    .ok_or_else(|| ProvenanceError::UnknownId(id.to_string()))?;
                Ok(format!("{}: {}", id, self.rule_description(rule)))
            }
            _ => Err(ProvenanceError::UnknownId(id.to_string())),
        }
    }

    /// Tuple id -> ids of the clauses deriving it.
    pub fn head_to_clauses(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (cid, clause) in self.clauses.iter().enumerate() {
            let head = format!("T{}", self.tuple_ids[clause.head_tuple()]);
            map.entry(head).or_default().push(format!("D{}", cid));
        }
        map
    }

    /// Clause id -> ids of its body tuples, in body order.
    pub fn clause_to_body(&self) -> BTreeMap<String, Vec<String>> {
        self.clauses
            .iter()
            .enumerate()
            .map(|(cid, clause)| {
                let body = clause
                    .body_tuples()
                    .map(|t| format!("T{}", self.tuple_ids[t]))
                    .collect();
                (format!("D{}", cid), body)
            })
            .collect()
    }

    /// Retained tuples whose relation is listed; an empty list selects all.
    pub fn filter_tuples(&self, relations: &[&str]) -> Vec<&Tuple> {
        self.tuples
            .iter()
            .filter(|t| relations.is_empty() || relations.contains(&t.relation()))
            .collect()
    }

    /// JSON view for the inference layer: ids, tuple text and clause
    /// encodings.
    pub fn to_json_value(&self) -> serde_json::Value {
        let ids = |group: &[Tuple]| -> Vec<String> {
            group.iter().filter_map(|t| self.encode_tuple(t)).collect()
        };
        let tuples: serde_json::Map<String, serde_json::Value> = self
            .tuples
            .iter()
            .enumerate()
            .map(|(id, t)| (format!("T{}", id), serde_json::Value::String(t.to_string())))
            .collect();
        let rules: serde_json::Map<String, serde_json::Value> = self
            .rule_ids
            .iter()
            .map(|(&rule, &id)| {
                (
                    format!("R{}", id),
                    serde_json::Value::String(self.rule_description(rule)),
                )
            })
            .collect();
        let clauses: Vec<String> = self.clauses.iter().map(|c| self.clause_detail(c)).collect();

        serde_json::json!({
            "name":    self.name,
            "tuples":  tuples,
            "rules":   rules,
            "inputs":  ids(&self.input_tuples),
            "hidden":  ids(&self.hidden_tuples),
            "outputs": ids(&self.output_tuples),
            "clauses": clauses,
        })
    }
}
