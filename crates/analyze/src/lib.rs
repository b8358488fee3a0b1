//! Provenance construction -- explain derived facts with an acyclic
//! subset of the ground clauses that produced them.
//!
//! The pipeline runs once per analysis: index the clauses
//! (`provex_core::build_indices`), label every tuple with its date of
//! birth and keep the forward clauses (`dob`), optionally re-admit
//! removed clauses that close no cycle, keep what is coreachable from the
//! observed tuples (`reach`), and assemble the result (`assemble`). The
//! `dump` module writes it out as flat text files.

pub mod assemble;
pub mod builder;
pub mod config;
pub mod dob;
pub mod dump;
pub mod error;
pub mod reach;

pub use assemble::{assemble, Provenance};
pub use builder::{compute_provenance, ProvenanceBuilder};
pub use config::{read_options, ProvenanceOptions, AUGMENT_KEY, PRUNE_KEY};
pub use dob::DobSolver;
pub use dump::{dump_all_clauses, dump_provenance};
pub use error::ProvenanceError;
pub use reach::{active_clauses, coreachable_tuples, resolve_tuples, ClauseSet};
