//! Pruning switches.
//!
//! Options can be built in code, read from a TOML document with a
//! `[provenance]` table, or taken from the flat property map a host
//! scheduler hands each analysis.
//!
//! # Example
//!
//! ```toml
//! [provenance]
//! prune = true
//! augment = false
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProvenanceError;

/// Property key for [`ProvenanceOptions::prune`].
pub const PRUNE_KEY: &str = "provenance.prune";
/// Property key for [`ProvenanceOptions::augment`].
pub const AUGMENT_KEY: &str = "provenance.augment";

/// How much of the clause set a provenance keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceOptions {
    /// Break cycles with the date-of-birth labeling. When off, the result
    /// is the plain backward closure over every clause and may be cyclic.
    pub prune: bool,
    /// After pruning, re-admit every removed clause that does not close a
    /// cycle. Ignored when `prune` is off.
    pub augment: bool,
}

impl Default for ProvenanceOptions {
    fn default() -> Self {
        ProvenanceOptions {
            prune: true,
            augment: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OptionsDocument {
    #[serde(default)]
    provenance: ProvenanceOptions,
}

impl ProvenanceOptions {
    /// Parse a TOML document. A missing `[provenance]` table yields the
    /// defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ProvenanceError> {
        let doc: OptionsDocument = toml::from_str(content).map_err(|e| ProvenanceError::Config {
            origin: "toml document".to_string(),
            message: e.to_string(),
        })?;
        Ok(doc.provenance)
    }

    /// Read options from the flat property map. Keys other than
    /// [`PRUNE_KEY`] and [`AUGMENT_KEY`] are ignored.
    pub fn from_properties(props: &BTreeMap<String, String>) -> Result<Self, ProvenanceError> {
        let mut options = ProvenanceOptions::default();
        if let Some(raw) = props.get(PRUNE_KEY) {
            options.prune = parse_flag(PRUNE_KEY, raw)?;
        }
        if let Some(raw) = props.get(AUGMENT_KEY) {
            options.augment = parse_flag(AUGMENT_KEY, raw)?;
        }
        Ok(options)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ProvenanceError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ProvenanceError::Config {
            origin: format!("property '{}'", key),
            message: format!("expected \"true\" or \"false\", found \"{}\"", other),
        }),
    }
}

/// Read and parse an options TOML file from `path`.
pub fn read_options(path: &Path) -> Result<ProvenanceOptions, ProvenanceError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProvenanceError::Config {
        origin: path.display().to_string(),
        message: e.to_string(),
    })?;
    ProvenanceOptions::from_toml_str(&content).map_err(|e| match e {
        ProvenanceError::Config { message, .. } => ProvenanceError::Config {
            origin: path.display().to_string(),
            message,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_prune_and_augment() {
        let o = ProvenanceOptions::default();
        assert!(o.prune);
        assert!(o.augment);
    }

    #[test]
    fn test_toml_partial_table() {
        let o = ProvenanceOptions::from_toml_str("[provenance]\naugment = false\n").unwrap();
        assert!(o.prune);
        assert!(!o.augment);
    }

    #[test]
    fn test_toml_missing_table_is_default() {
        let o = ProvenanceOptions::from_toml_str("[other]\nkey = 1\n").unwrap();
        assert_eq!(o, ProvenanceOptions::default());
    }

    #[test]
    fn test_toml_wrong_type() {
        let err = ProvenanceOptions::from_toml_str("[provenance]\nprune = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ProvenanceError::Config { .. }));
    }

    #[test]
    fn test_properties() {
        let mut props = BTreeMap::new();
        props.insert(PRUNE_KEY.to_string(), "true".to_string());
        props.insert(AUGMENT_KEY.to_string(), "false".to_string());
        props.insert("unrelated".to_string(), "whatever".to_string());
        let o = ProvenanceOptions::from_properties(&props).unwrap();
        assert!(o.prune);
        assert!(!o.augment);
    }

    #[test]
    fn test_properties_bad_flag() {
        let mut props = BTreeMap::new();
        props.insert(PRUNE_KEY.to_string(), "maybe".to_string());
        let err = ProvenanceOptions::from_properties(&props).unwrap_err();
        assert!(err.to_string().contains("provenance.prune"));
    }

    #[test]
    fn test_read_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provenance.toml");
        std::fs::write(&path, "[provenance]\nprune = false\n").unwrap();
        let o = read_options(&path).unwrap();
        assert!(!o.prune);

        let missing = read_options(&dir.path().join("absent.toml")).unwrap_err();
        assert!(missing.to_string().contains("absent.toml"));
    }
}
