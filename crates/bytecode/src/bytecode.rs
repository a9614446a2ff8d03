use crate::{Literal, Op, Operation};
use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};
use thiserror::Error;

/// Magic bytes at the start of a persisted bytecode file
const MAGIC: [u8; 4] = *b"WSHB";

/// The persisted format version, bumped whenever the layout changes
///
/// Readers reject other versions; the cache layer treats the rejection as a
/// miss and recompiles.
const FORMAT_VERSION: u8 = 1;

/// Errors produced when encoding or decoding persisted bytecode
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input doesn't start with the bytecode magic
    #[error("not a washi bytecode file")]
    BadMagic,
    /// The input was written by an incompatible format version
    #[error("unsupported bytecode format version {0}")]
    UnsupportedVersion(u8),
    /// The input ends before the header does
    #[error("truncated bytecode header")]
    TruncatedHeader,
    /// The payload failed to encode
    #[error(transparent)]
    Encode(#[from] rmp_serde::encode::Error),
    /// The payload failed to decode
    #[error(transparent)]
    Decode(#[from] rmp_serde::decode::Error),
}

/// A compiled template: the operation list plus its compilation timestamp
///
/// `ByteCode` is plain data. It's produced once by the compiler, optionally
/// persisted via [to_bytes](ByteCode::to_bytes), and shared read-only between
/// any number of renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ByteCode {
    /// The operations, executed in order starting at index 0
    pub ops: Vec<Operation>,
    /// When the compiler produced this bytecode
    ///
    /// Only the cache layer consults this, comparing it against the template
    /// source's last-modified time.
    pub generated_on: SystemTime,
}

impl ByteCode {
    /// Makes an empty bytecode stamped with the current time
    pub fn new() -> Self {
        Self::with_ops(Vec::new())
    }

    /// Makes a bytecode from the given operations, stamped with the current
    /// time
    pub fn with_ops(ops: Vec<Operation>) -> Self {
        Self {
            ops,
            generated_on: SystemTime::now(),
        }
    }

    /// Appends an argument-less operation
    pub fn append(&mut self, op: Op) {
        self.ops.push(Operation::new(op));
    }

    /// Appends an operation with an argument
    pub fn append_with_arg(&mut self, op: Op, arg: impl Into<Literal>) {
        self.ops.push(Operation::with_arg(op, arg));
    }

    /// The number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when the bytecode contains no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The operation at the given index, if it exists
    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.ops.get(index)
    }

    /// Encodes the bytecode in its portable persisted form
    ///
    /// The layout is the 4-byte magic, one format-version byte, then a
    /// self-describing MessagePack encoding of the bytecode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let payload = rmp_serde::to_vec_named(self)?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decodes a bytecode previously written by [to_bytes](Self::to_bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < MAGIC.len() + 1 {
            return Err(CodecError::TruncatedHeader);
        }
        let (header, payload) = bytes.split_at(MAGIC.len() + 1);
        if header[..MAGIC.len()] != MAGIC {
            return Err(CodecError::BadMagic);
        }
        let version = header[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        Ok(rmp_serde::from_slice(payload)?)
    }
}

impl Default for ByteCode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ByteCode {
    /// Renders the annotated operation list, one `index opname arg` line per
    /// operation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, operation) in self.ops.iter().enumerate() {
            writeln!(f, "{index:03} {operation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytecode() -> ByteCode {
        let mut bc = ByteCode::new();
        bc.append_with_arg(Op::Literal, "hello & <goodbye>");
        bc.append(Op::Print);
        bc.append_with_arg(Op::Literal, 42i64);
        bc.append(Op::MoveToSb);
        bc.append_with_arg(Op::Literal, 2.5);
        bc.append(Op::Add);
        bc.append_with_arg(Op::And, -3i64);
        bc.append(Op::End);
        bc
    }

    #[test]
    fn persisted_form_round_trips() {
        let bc = sample_bytecode();
        let bytes = bc.to_bytes().unwrap();
        let decoded = ByteCode::from_bytes(&bytes).unwrap();
        assert_eq!(bc, decoded);
    }

    #[test]
    fn argument_type_tags_survive_the_round_trip() {
        let mut bc = ByteCode::new();
        bc.append_with_arg(Op::Literal, 1i64);
        bc.append_with_arg(Op::Literal, 1u64);
        bc.append_with_arg(Op::Literal, 1.0);
        bc.append_with_arg(Op::Literal, "1");
        bc.append_with_arg(Op::Literal, true);

        let decoded = ByteCode::from_bytes(&bc.to_bytes().unwrap()).unwrap();
        let args: Vec<_> = decoded.ops.iter().map(|op| op.arg.clone()).collect();
        assert_eq!(
            args,
            vec![
                Literal::Int(1),
                Literal::Uint(1),
                Literal::Float(1.0),
                Literal::Str("1".into()),
                Literal::Bool(true),
            ]
        );
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample_bytecode().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            ByteCode::from_bytes(&bytes),
            Err(CodecError::BadMagic)
        ));
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut bytes = sample_bytecode().to_bytes().unwrap();
        bytes[4] = FORMAT_VERSION + 1;
        assert!(matches!(
            ByteCode::from_bytes(&bytes),
            Err(CodecError::UnsupportedVersion(v)) if v == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert!(matches!(
            ByteCode::from_bytes(b"WSH"),
            Err(CodecError::TruncatedHeader)
        ));
    }

    #[test]
    fn disassembly_lists_one_operation_per_line() {
        let mut bc = ByteCode::new();
        bc.append_with_arg(Op::FetchS, "user");
        bc.append_with_arg(Op::Goto, -5i64);
        bc.append(Op::End);

        let listing = bc.to_string();
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], "000 fetch_s \"user\"");
        assert_eq!(lines[1], "001 goto -5");
        assert_eq!(lines[2], "002 end");
    }
}
