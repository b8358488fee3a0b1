/// Errors raised while constructing model values from evaluator output.
///
/// A `ModelError` rejects one clause only; callers building a whole run
/// log the offending clause and keep going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Body and sign lists disagree in length.
    #[error("clause of rule {rule_id}: {body} body tuples but {signs} signs")]
    SignArity {
        rule_id: u32,
        body: usize,
        signs: usize,
    },

    /// Nothing is left in the body once placeholder entries are dropped.
    /// Axiomatic facts belong in the input set, not in a clause.
    #[error("clause of rule {rule_id} has an empty body; axioms must be supplied as input tuples")]
    EmptyBody { rule_id: u32 },

    /// The head itself is the placeholder tuple.
    #[error("clause of rule {rule_id} has a placeholder head")]
    PlaceholderHead { rule_id: u32 },

    /// Text could not be read back as `rel(v1,v2,...)`.
    #[error("malformed tuple text '{0}'")]
    TupleSyntax(String),
}
