//! provex-core: the fact/clause model and clause indexing.
//!
//! Rule evaluators report one run as a flat collection of ground clauses
//! plus designated input and output relations. This crate holds those
//! values and the lookup tables built over them.
//!
//! # Public API
//!
//! - [`Tuple`], [`Value`] -- facts and their attribute tokens
//! - [`Clause`], [`Literal`], [`Sign`] -- ground rule instances
//! - [`build_indices()`] / [`ClauseIndex`] -- antecedent and consequent maps
//! - [`ModelError`] -- clause construction failures

pub mod clause;
pub mod error;
pub mod index;
pub mod tuple;

// ── Convenience re-exports ───────────────────────────────────────────

pub use clause::{collect_clauses, Clause, Literal, RuleId, Sign};
pub use error::ModelError;
pub use index::{build_indices, ClauseIndex, ClauseIx, TupleIx};
pub use tuple::{Tuple, Value};
