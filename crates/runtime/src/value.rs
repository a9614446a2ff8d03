use crate::record::TemplateRecord;
use std::{fmt, rc::Rc};
use washi_bytecode::Literal;

/// The dynamically typed value passed through the template VM
///
/// Scalars compare structurally, and only within the same variant:
/// `Int(1)` is not equal to `Float(1.0)`, and a [Raw](Value::Raw) string is
/// never equal to a plain [Str](Value::Str). Sequences and records compare
/// by identity.
#[derive(Clone, Default)]
pub enum Value {
    /// The absence of a value
    #[default]
    Nil,
    /// A signed integer
    Int(i64),
    /// An unsigned integer
    Uint(u64),
    /// A floating-point number
    Float(f64),
    /// A boolean
    Bool(bool),
    /// A string, HTML-escaped when printed
    Str(Rc<str>),
    /// A string marked safe for HTML embedding, printed without escaping
    ///
    /// The mark is a distinct variant rather than a flag so that string
    /// operations can't accidentally preserve it.
    Raw(Rc<str>),
    /// An ordered sequence of values
    Seq(Rc<Vec<Value>>),
    /// A structured host value with named fields and methods
    Record(Rc<dyn TemplateRecord>),
}

impl Value {
    /// Wraps a host record in a value
    pub fn record(record: impl TemplateRecord + 'static) -> Self {
        Self::Record(Rc::new(record))
    }

    /// Makes a raw string from anything stringifiable
    pub fn raw(value: impl fmt::Display) -> Self {
        Self::Raw(value.to_string().into())
    }

    /// The value's type name, used in diagnostics
    pub fn type_name(&self) -> &str {
        use Value::*;
        match self {
            Nil => "nil",
            Int(_) => "int",
            Uint(_) => "uint",
            Float(_) => "float",
            Bool(_) => "bool",
            Str(_) => "string",
            Raw(_) => "raw string",
            Seq(_) => "sequence",
            Record(r) => r.type_name(),
        }
    }

    /// The value's string form
    ///
    /// Nil stringifies to the empty string, floats to their shortest
    /// round-tripping representation, sequences to a bracketed element list,
    /// and records to their display capability when they provide one.
    pub fn to_display_string(&self) -> String {
        use Value::*;
        match self {
            Nil => String::new(),
            Int(n) => n.to_string(),
            Uint(n) => n.to_string(),
            Float(n) => n.to_string(),
            Bool(b) => b.to_string(),
            Str(s) | Raw(s) => s.to_string(),
            Seq(items) => {
                let mut result = String::from("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        result.push_str(", ");
                    }
                    result.push_str(&item.to_display_string());
                }
                result.push(']');
                result
            }
            Record(r) => r
                .display_string()
                .unwrap_or_else(|| format!("<{}>", r.type_name())),
        }
    }

    /// The value's truthiness
    ///
    /// Nil is false, numbers are true when non-zero, strings and sequences
    /// when non-empty, and records are always true.
    pub fn to_bool(&self) -> bool {
        use Value::*;
        match self {
            Nil => false,
            Int(n) => *n != 0,
            Uint(n) => *n != 0,
            Float(n) => *n != 0.0,
            Bool(b) => *b,
            Str(s) | Raw(s) => !s.is_empty(),
            Seq(items) => !items.is_empty(),
            Record(_) => true,
        }
    }

    /// True when the value carries the raw-string mark
    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Int(a), Int(b)) => a == b,
            (Uint(a), Uint(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Raw(a), Raw(b)) => a == b,
            (Seq(a), Seq(b)) => Rc::ptr_eq(a, b),
            (Record(a), Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Value::*;
        match self {
            Nil => write!(f, "Nil"),
            Int(n) => write!(f, "Int({n})"),
            Uint(n) => write!(f, "Uint({n})"),
            Float(n) => write!(f, "Float({n})"),
            Bool(b) => write!(f, "Bool({b})"),
            Str(s) => write!(f, "Str({s:?})"),
            Raw(s) => write!(f, "Raw({s:?})"),
            Seq(items) => f.debug_list().entries(items.iter()).finish(),
            Record(r) => write!(f, "Record(<{}>)", r.type_name()),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Nil
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Seq(Rc::new(value))
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::None => Self::Nil,
            Literal::Int(n) => Self::Int(*n),
            Literal::Uint(n) => Self::Uint(*n),
            Literal::Float(n) => Self::Float(*n),
            Literal::Bool(b) => Self::Bool(*b),
            Literal::Str(s) => Self::Str(s.as_str().into()),
        }
    }
}
