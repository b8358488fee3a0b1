//! Flat text export of a provenance.
//!
//! Each artifact is rendered to a string first and then written whole, so
//! the same provenance always produces byte-identical files and a failed
//! write can simply be retried.

use crate::assemble::Provenance;
use crate::error::ProvenanceError;
use provex_core::{Clause, Literal};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const TUPLE_DICT_FILE: &str = "tuple_dict.txt";
pub const RULE_DICT_FILE: &str = "rule_dict.txt";
pub const CONS_PRUNED_FILE: &str = "cons_pruned.txt";
pub const CONS_ALL_FILE: &str = "cons_all.txt";
pub const BASE_QUERIES_FILE: &str = "base_queries.txt";

// ──────────────────────────────────────────────
// Rendering
// ──────────────────────────────────────────────

/// `T<n>: rel(v1,v2)` per retained tuple.
pub fn render_tuple_dict(provenance: &Provenance) -> String {
    let mut out = String::new();
    for (id, tuple) in provenance.tuples().iter().enumerate() {
        let _ = writeln!(out, "T{}: {}", id, tuple);
    }
    out
}

/// `R<n>: <description>` per retained rule.
pub fn render_rule_dict(provenance: &Provenance) -> String {
    let mut out = String::new();
    for rule_id in provenance.retained_rules() {
        if let Some(label) = provenance.rule_label(rule_id) {
            let _ = writeln!(out, "{}: {}", label, provenance.rule_description(rule_id));
        }
    }
    out
}

/// Retained clauses in id notation.
pub fn render_cons_pruned(provenance: &Provenance) -> String {
    let mut out = String::new();
    for clause in provenance.clauses() {
        let _ = writeln!(out, "{}", provenance.clause_detail(clause));
    }
    out
}

fn literal_text(lit: &Literal) -> String {
    if lit.sign.is_negative() {
        format!("NOT {}", lit.tuple)
    } else {
        lit.tuple.to_string()
    }
}

/// Every clause in tuple text. Rules without a label are written as
/// `#<rule_id>`.
pub fn render_cons_all(clauses: &[Clause], provenance: &Provenance) -> String {
    let mut sorted: Vec<&Clause> = clauses.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut out = String::new();
    for clause in sorted {
        let rule = provenance
            .rule_label(clause.rule_id())
            .unwrap_or_else(|| format!("#{}", clause.rule_id()));
        let literals: Vec<String> = clause
            .body()
            .iter()
            .chain(std::iter::once(clause.head()))
            .map(literal_text)
            .collect();
        let _ = writeln!(out, "{}: {}", rule, literals.join(", "));
    }
    out
}

/// `T<n>` per retained output tuple, in id order.
pub fn render_base_queries(provenance: &Provenance) -> String {
    let outputs: HashSet<_> = provenance.output_tuples().iter().collect();
    let mut out = String::new();
    for (id, tuple) in provenance.tuples().iter().enumerate() {
        if outputs.contains(tuple) {
            let _ = writeln!(out, "T{}", id);
        }
    }
    out
}

// ──────────────────────────────────────────────
// Writing
// ──────────────────────────────────────────────

fn write_artifact(dir: &Path, file: &str, content: &str) -> Result<(), ProvenanceError> {
    let path = dir.join(file);
    fs::write(&path, content).map_err(|source| ProvenanceError::Io { path, source })
}

fn ensure_dir(dir: &Path) -> Result<(), ProvenanceError> {
    fs::create_dir_all(dir).map_err(|source| ProvenanceError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write the tuple and rule dictionaries, the pruned clauses and the
/// base queries into `dir`, creating it if needed. Existing files are
/// overwritten.
pub fn dump_provenance(provenance: &Provenance, dir: &Path) -> Result<(), ProvenanceError> {
    ensure_dir(dir)?;
    write_artifact(dir, TUPLE_DICT_FILE, &render_tuple_dict(provenance))?;
    write_artifact(dir, RULE_DICT_FILE, &render_rule_dict(provenance))?;
    write_artifact(dir, CONS_PRUNED_FILE, &render_cons_pruned(provenance))?;
    write_artifact(dir, BASE_QUERIES_FILE, &render_base_queries(provenance))?;
    debug!(
        provenance = provenance.name(),
        dir = %dir.display(),
        "provenance dumped"
    );
    Ok(())
}

/// Write the unpruned clause listing next to a dumped provenance.
pub fn dump_all_clauses(
    clauses: &[Clause],
    provenance: &Provenance,
    dir: &Path,
) -> Result<(), ProvenanceError> {
    ensure_dir(dir)?;
    write_artifact(dir, CONS_ALL_FILE, &render_cons_all(clauses, provenance))
}

impl Provenance {
    /// SHA-256 over the four provenance artifacts, hex encoded. Equal
    /// digests mean byte-identical dumps.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (file, content) in [
            (TUPLE_DICT_FILE, render_tuple_dict(self)),
            (RULE_DICT_FILE, render_rule_dict(self)),
            (CONS_PRUNED_FILE, render_cons_pruned(self)),
            (BASE_QUERIES_FILE, render_base_queries(self)),
        ] {
            hasher.update(file.as_bytes());
            hasher.update([0u8]);
            hasher.update(content.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use provex_core::{Sign, Tuple, Value};
    use std::collections::BTreeMap;

    fn t(rel: &str, n: i64) -> Tuple {
        Tuple::new(rel, vec![Value::Int(n)])
    }

    fn sample() -> (Vec<Clause>, Provenance) {
        let kept = Clause::new(4, t("O", 0), Sign::Pos, vec![t("I", 1), t("H", 2)], vec![Sign::Pos, Sign::Neg], "").unwrap();
        let dropped = Clause::positive(9, t("O", 0), vec![t("X", 3)]).unwrap();
        let mut infos = BTreeMap::new();
        infos.insert(4, "o unless h".to_string());
        let p = assemble("sample", vec![kept.clone()], &[t("I", 1)], &[t("O", 0)], infos);
        (vec![kept, dropped], p)
    }

    #[test]
    fn test_render_dicts() {
        let (_, p) = sample();
        assert_eq!(render_tuple_dict(&p), "T0: I(1)\nT1: H(2)\nT2: O(0)\n");
        assert_eq!(render_rule_dict(&p), "R0: o unless h\n");
        assert_eq!(render_base_queries(&p), "T2\n");
    }

    #[test]
    fn test_render_cons_pruned() {
        let (_, p) = sample();
        assert_eq!(render_cons_pruned(&p), "R0: T0, NOT T1, T2\n");
    }

    #[test]
    fn test_render_cons_all_marks_unretained_rules() {
        let (clauses, p) = sample();
        assert_eq!(
            render_cons_all(&clauses, &p),
            "R0: I(1), NOT H(2), O(0)\n#9: X(3), O(0)\n"
        );
    }

    #[test]
    fn test_empty_provenance_renders_empty_files() {
        let p = assemble("empty", Vec::new(), &[], &[], BTreeMap::new());
        assert!(render_tuple_dict(&p).is_empty());
        assert!(render_cons_pruned(&p).is_empty());
        assert!(render_base_queries(&p).is_empty());
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let (_, p) = sample();
        let again = sample().1;
        assert_eq!(p.digest(), again.digest());
        assert_eq!(p.digest().len(), 64);

        let other = assemble("sample", Vec::new(), &[], &[], BTreeMap::new());
        assert_ne!(p.digest(), other.digest());
    }
}
