//! Ground rule instances: a signed head derived from signed body facts.
//!
//! The sign of a literal only matters when a clause is written out; the
//! pruning engine treats every clause as a hyperedge from body to head.

use crate::error::ModelError;
use crate::tuple::Tuple;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies the source rule a clause was instantiated from.
pub type RuleId = u32;

/// Polarity of a literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    #[default]
    Pos,
    Neg,
}

impl Sign {
    pub fn is_negative(self) -> bool {
        self == Sign::Neg
    }
}

/// A tuple together with its polarity inside a clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub tuple: Tuple,
    #[serde(default)]
    pub sign: Sign,
}

impl Literal {
    pub fn pos(tuple: Tuple) -> Self {
        Literal {
            tuple,
            sign: Sign::Pos,
        }
    }

    pub fn neg(tuple: Tuple) -> Self {
        Literal {
            tuple,
            sign: Sign::Neg,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign.is_negative() {
            f.write_str("!")?;
        }
        write!(f, "{}", self.tuple)
    }
}

/// One ground instance of a rule.
///
/// Equality, hashing and ordering cover `rule_id`, head and body; the
/// description is carried for display only. Clauses order by head, then
/// body, then rule id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ClauseRepr")]
pub struct Clause {
    rule_id: RuleId,
    head: Literal,
    body: Vec<Literal>,
    description: String,
}

/// Unchecked wire shape; deserialization goes through the same
/// validation as `Clause::from_literals`.
#[derive(Deserialize)]
struct ClauseRepr {
    rule_id: RuleId,
    head: Literal,
    body: Vec<Literal>,
    #[serde(default)]
    description: String,
}

impl TryFrom<ClauseRepr> for Clause {
    type Error = ModelError;

    fn try_from(repr: ClauseRepr) -> Result<Self, Self::Error> {
        Clause::from_literals(repr.rule_id, repr.head, repr.body, repr.description)
    }
}

impl Clause {
    /// Build a clause from parallel tuple and sign lists, as evaluators
    /// report them.
    pub fn new(
        rule_id: RuleId,
        head: Tuple,
        head_sign: Sign,
        body: Vec<Tuple>,
        signs: Vec<Sign>,
        description: impl Into<String>,
    ) -> Result<Self, ModelError> {
        if body.len() != signs.len() {
            return Err(ModelError::SignArity {
                rule_id,
                body: body.len(),
                signs: signs.len(),
            });
        }
        let literals = body
            .into_iter()
            .zip(signs)
            .map(|(tuple, sign)| Literal { tuple, sign })
            .collect();
        Clause::from_literals(rule_id, Literal { tuple: head, sign: head_sign }, literals, description)
    }

    /// All-positive shorthand.
    pub fn positive(rule_id: RuleId, head: Tuple, body: Vec<Tuple>) -> Result<Self, ModelError> {
        let signs = vec![Sign::Pos; body.len()];
        Clause::new(rule_id, head, Sign::Pos, body, signs, String::new())
    }

    /// Drops placeholder entries, deduplicates the body keeping first
    /// occurrences, and rejects clauses left without a body.
    pub fn from_literals(
        rule_id: RuleId,
        head: Literal,
        body: Vec<Literal>,
        description: impl Into<String>,
    ) -> Result<Self, ModelError> {
        if head.tuple.is_placeholder() {
            return Err(ModelError::PlaceholderHead { rule_id });
        }

        let mut kept: Vec<Literal> = Vec::with_capacity(body.len());
        for lit in body {
            if lit.tuple.is_placeholder() || kept.contains(&lit) {
                continue;
            }
            kept.push(lit);
        }
        if kept.is_empty() {
            return Err(ModelError::EmptyBody { rule_id });
        }

        Ok(Clause {
            rule_id,
            head,
            body: kept,
            description: description.into(),
        })
    }

    pub fn rule_id(&self) -> RuleId {
        self.rule_id
    }

    pub fn head(&self) -> &Literal {
        &self.head
    }

    pub fn head_tuple(&self) -> &Tuple {
        &self.head.tuple
    }

    pub fn body(&self) -> &[Literal] {
        &self.body
    }

    pub fn body_tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.body.iter().map(|lit| &lit.tuple)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn key(&self) -> (&Literal, &[Literal], RuleId) {
        (&self.head, &self.body, self.rule_id)
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Clause {}

impl Hash for Clause {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Clause {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Clause {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for (i, lit) in self.body.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", lit)?;
        }
        f.write_str(".")
    }
}

/// Keep the well-formed clauses of an evaluator batch.
///
/// Malformed entries are logged and skipped; one bad ground instance
/// never aborts the run.
pub fn collect_clauses<I>(raw: I) -> Vec<Clause>
where
    I: IntoIterator<Item = Result<Clause, ModelError>>,
{
    let mut clauses = Vec::new();
    for item in raw {
        match item {
            Ok(clause) => clauses.push(clause),
            Err(err) => tracing::warn!(error = %err, "rejected malformed clause"),
        }
    }
    clauses
}
