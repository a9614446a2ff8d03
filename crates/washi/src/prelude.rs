//! A convenient re-export of the engine's commonly used types
//!
//! ```
//! use washi::prelude::*;
//! ```

pub use crate::{Washi, WashiSettings};
pub use washi_bytecode::{ByteCode, Literal, Op, Operation};
pub use washi_loader::{CacheStrategy, TemplateCompiler};
pub use washi_runtime::{MethodOutcome, Stash, TemplateRecord, Value, Vm, VmSettings};
