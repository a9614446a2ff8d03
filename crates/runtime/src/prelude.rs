//! A convenient re-export of the runtime's commonly used types
//!
//! ```
//! use washi_runtime::prelude::*;
//! ```

pub use crate::{MethodOutcome, Stash, TemplateRecord, Value, Vm, VmSettings};
pub use washi_bytecode::{ByteCode, Literal, Op, Operation};
