//! Error type for provenance construction and export.

use std::path::PathBuf;

/// All errors surfaced by the builder, the configuration loader and the
/// dumper. The pruning algorithm itself has no failure modes.
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// Writing a dump artifact failed. The in-memory provenance is
    /// untouched and the whole dump can be retried.
    #[error("could not write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration source could not be read or parsed.
    #[error("invalid provenance configuration in {origin}: {message}")]
    Config { origin: String, message: String },

    /// A dump was requested before any provenance was computed.
    #[error("provenance '{name}' has not been computed yet")]
    NotComputed { name: String },

    /// An identifier that this provenance never assigned.
    #[error("unknown provenance id '{0}'")]
    UnknownId(String),
}
