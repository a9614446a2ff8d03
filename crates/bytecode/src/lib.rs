//! Contains the bytecode data model for the washi template engine
//!
//! A compiled template is a [ByteCode]: an ordered list of [Operation]s,
//! each pairing an [Op] with a [Literal] argument, plus the timestamp the
//! compiler produced it on. The bytecode can be persisted in a portable
//! self-describing encoding for on-disk caching.

#![warn(missing_docs)]

mod bytecode;
mod op;
mod operation;

pub use crate::{
    bytecode::{ByteCode, CodecError},
    op::Op,
    operation::{Literal, Operation},
};
