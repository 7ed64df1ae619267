use super::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A terminal argument value.
///
/// Numbers compare and hash by value with `-0.0 == 0.0` and every NaN equal to
/// every other NaN. Nodes never hold a non-finite number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A reference to a named variable, e.g. `parent`.
    Ident(String),
}

impl Scalar {
    pub fn ident(label: impl Into<String>) -> Self {
        Scalar::Ident(label.into())
    }

    pub fn is_ident(&self) -> bool {
        matches!(self, Scalar::Ident(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this is a text, boolean or identifier, or a finite number.
    pub fn is_finite(&self) -> bool {
        match self {
            Scalar::Number(n) => n.is_finite(),
            _ => true,
        }
    }
}

/// Bit pattern under which equal numbers hash alike.
fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

// Manual implementation to handle f64
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) | (Scalar::Ident(a), Scalar::Ident(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

// Manual implementation to handle f64 by hashing its canonical bits
impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Scalar::Text(s) | Scalar::Ident(s) => s.hash(state),
            Scalar::Number(n) => canonical_bits(*n).hash(state),
            Scalar::Bool(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{:?}", s),
            Scalar::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Ident(label) => write!(f, "${}", label),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// The content of an argument slot: a scalar or a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Scalar(Scalar),
    Node(Arc<Node>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Value::Node(n) => Some(n),
            Value::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        Value::Node(Arc::new(n))
    }
}

impl From<Arc<Node>> for Value {
    fn from(n: Arc<Node>) -> Self {
        Value::Node(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(b.into())
    }
}
