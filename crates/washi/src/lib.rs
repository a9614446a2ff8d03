//! # washi
//!
//! A server-side HTML templating engine built around a small bytecode VM.
//!
//! Templates are compiled (by an embedder-supplied [TemplateCompiler]) into
//! [ByteCode], cached in memory and optionally on disk, and rendered against
//! a [Stash] of variables with HTML-aware escaping of interpolated values.
//!
//! ```
//! use washi::prelude::*;
//!
//! // A stand-in for a real template compiler: prints the source verbatim.
//! struct EchoCompiler;
//!
//! impl TemplateCompiler for EchoCompiler {
//!     fn compile(&self, _key: &str, source: &str) -> washi::loader::Result<ByteCode> {
//!         let mut bc = ByteCode::new();
//!         bc.append_with_arg(Op::Literal, source);
//!         bc.append(Op::Print);
//!         bc.append(Op::End);
//!         Ok(bc)
//!     }
//! }
//!
//! fn main() -> washi::Result<()> {
//!     let mut washi = Washi::new(EchoCompiler)?;
//!     let output = washi.render_string("a < b", &Stash::new())?;
//!     assert_eq!(output, "a &lt; b");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod washi;

pub mod prelude;

pub use crate::{
    error::{Error, Result},
    washi::{Washi, WashiSettings},
};

pub use washi_bytecode as bytecode;
pub use washi_loader as loader;
pub use washi_runtime as runtime;

pub use washi_bytecode::{ByteCode, Literal, Op, Operation};
pub use washi_loader::{CacheStrategy, TemplateCompiler};
pub use washi_runtime::{MethodOutcome, Stash, TemplateRecord, Value};
