use thiserror::Error;

/// Errors that abort a render
///
/// Template authoring hazards never reach here; those become warnings on the
/// render state. These errors indicate structurally broken bytecode, which
/// means a mismatch between the VM and the compiler that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A branch op jumped outside the program
    #[error("jump from pc {pc} to {target} is outside the program ({len} ops)")]
    PcOutOfRange {
        /// The pc of the branching op
        pc: usize,
        /// Where it tried to land
        target: i64,
        /// The program length
        len: usize,
    },

    /// An op's argument holds the wrong literal variant
    #[error("{op} at pc {pc} expects {expected} argument")]
    BadArgument {
        /// The op's display name
        op: &'static str,
        /// The pc of the op
        pc: usize,
        /// The variant the op needs
        expected: &'static str,
    },

    /// `popmark` or a mark read ran against an empty mark stack
    #[error("mark stack underflow at pc {pc}")]
    MarkStackUnderflow {
        /// The pc of the offending op
        pc: usize,
    },

    /// The frame stack is empty
    #[error("no current frame at pc {pc}")]
    EmptyFrameStack {
        /// The pc of the offending op
        pc: usize,
    },

    /// A foreach slot no longer holds what the loop protocol put there
    #[error("loop {slot} slot for id {id} holds {found} at pc {pc}")]
    CorruptLoopSlot {
        /// Which slot: "index" or "sequence"
        slot: &'static str,
        /// The loop's base slot id
        id: usize,
        /// The type name of the value found there
        found: String,
        /// The pc of the `for_iter` op
        pc: usize,
    },
}

/// The Result type used by the washi runtime
pub type Result<T> = std::result::Result<T, Error>;
