//! Facts: a relation name plus an ordered list of attribute values.
//!
//! Tuples are produced by the rule evaluator and only ever referenced by
//! this crate. Equality, hashing and ordering are structural, which keeps
//! every downstream artifact deterministic.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque attribute token.
///
/// Evaluators hand out domain indices (`Int`) or interned names (`Sym`);
/// the engine never interprets either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Sym(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Sym(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Sym(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Sym(s)
    }
}

/// A ground fact such as `VH(2,3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    relation: String,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(relation: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Tuple {
            relation: relation.into(),
            values: values.into_iter().collect(),
        }
    }

    /// The no-op entry evaluators emit for erased body literals.
    /// Clause construction strips it.
    pub fn placeholder() -> Self {
        Tuple {
            relation: String::new(),
            values: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.relation.is_empty()
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            return f.write_str("_");
        }
        write!(f, "{}(", self.relation)?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str(")")
    }
}

/// Parses the `rel(v1,v2)` text written by `Display`.
///
/// Attributes that read as integers become `Value::Int`, everything else
/// `Value::Sym`, trimmed. The text form has no quoting, so a symbol only
/// round-trips when it is not spelled like a number, has no surrounding
/// whitespace and contains none of `,`, `(` or `)`.
impl FromStr for Tuple {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let malformed = || ModelError::TupleSyntax(s.to_string());

        let (relation, rest) = text.split_once('(').ok_or_else(malformed)?;
        let inner = rest.strip_suffix(')').ok_or_else(malformed)?;
        let relation = relation.trim();
        if relation.is_empty() || inner.contains('(') || inner.contains(')') {
            return Err(malformed());
        }

        let values = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|raw| {
                    let raw = raw.trim();
                    raw.parse::<i64>()
                        .map(Value::Int)
                        .unwrap_or_else(|_| Value::Sym(raw.to_string()))
                })
                .collect()
        };

        Ok(Tuple::new(relation, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mixed_values() {
        let t = Tuple::new("VH", vec![Value::Int(2), Value::from("heap")]);
        assert_eq!(t.to_string(), "VH(2,heap)");
    }

    #[test]
    fn test_parse_display_text() {
        let t: Tuple = "VH(2, 3)".parse().unwrap();
        assert_eq!(t.relation(), "VH");
        assert_eq!(t.values(), &[Value::Int(2), Value::Int(3)]);
        assert_eq!(t.to_string(), "VH(2,3)");
    }

    #[test]
    fn test_parse_nullary() {
        let t: Tuple = "reachable()".parse().unwrap();
        assert_eq!(t.arity(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("VH".parse::<Tuple>().is_err());
        assert!("(1,2)".parse::<Tuple>().is_err());
        assert!("VH(1,2".parse::<Tuple>().is_err());
        assert!("VH(f(1))".parse::<Tuple>().is_err());
    }

    #[test]
    fn test_unquoted_symbols_do_not_round_trip() {
        let comma = Tuple::new("R", vec![Value::from("a,b")]);
        let back: Tuple = comma.to_string().parse().unwrap();
        assert_eq!(back.values(), &[Value::from("a"), Value::from("b")]);

        let paren = Tuple::new("R", vec![Value::from("f(x)")]);
        assert!(paren.to_string().parse::<Tuple>().is_err());

        let numeric = Tuple::new("R", vec![Value::from("7")]);
        let back: Tuple = numeric.to_string().parse().unwrap();
        assert_eq!(back.values(), &[Value::Int(7)]);
    }

    #[test]
    fn test_structural_equality() {
        let a = Tuple::new("R", vec![Value::Int(1)]);
        let b: Tuple = "R(1)".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Tuple::new("S", vec![Value::Int(1)]));
    }

    #[test]
    fn test_placeholder() {
        assert!(Tuple::placeholder().is_placeholder());
        assert!(!Tuple::new("R", vec![]).is_placeholder());
        assert_eq!(Tuple::placeholder().to_string(), "_");
    }
}
