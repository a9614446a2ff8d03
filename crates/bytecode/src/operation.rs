use crate::Op;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The literal argument attached to an [Operation]
///
/// Branch offsets and local-variable indices travel as [Literal::Int];
/// variable, field, and method names as [Literal::Str]. The `literal` op
/// accepts any variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// The op takes no argument
    #[default]
    None,
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    Uint(u64),
    /// A floating-point number
    Float(f64),
    /// A boolean
    Bool(bool),
    /// A string
    Str(String),
}

impl Literal {
    /// A view of the argument as a signed integer, when it holds one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// A view of the argument as a string, when it holds one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => Ok(()),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Uint(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A single VM operation: an opcode plus its literal argument
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// The opcode
    pub op: Op,
    /// The opcode's argument, [Literal::None] for ops that take none
    pub arg: Literal,
}

impl Operation {
    /// Makes an argument-less operation
    pub fn new(op: Op) -> Self {
        Self {
            op,
            arg: Literal::None,
        }
    }

    /// Makes an operation with the given argument
    pub fn with_arg(op: Op, arg: impl Into<Literal>) -> Self {
        Self {
            op,
            arg: arg.into(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            Literal::None => write!(f, "{}", self.op),
            _ => write!(f, "{} {}", self.op, self.arg),
        }
    }
}
