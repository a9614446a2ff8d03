use crate::{Error, Frame, Result, Stack, Stash, Value};
use washi_bytecode::{ByteCode, Operation};

/// The mutable execution context of a single render
///
/// A state is constructed fresh for each render and destroyed afterwards;
/// nothing is shared across renders. It owns the two scalar registers, the
/// operand stack, the mark and frame stacks, the output buffer, and the
/// warning sink, and borrows the bytecode and variable bag from the caller.
pub struct State<'a> {
    bytecode: &'a ByteCode,
    vars: &'a Stash,
    /// Register SA, the accumulator most ops read and write
    pub(crate) sa: Value,
    /// Register SB, the left operand of arithmetic and comparison
    pub(crate) sb: Value,
    pc: usize,
    pub(crate) stack: Stack,
    marks: Vec<usize>,
    frames: Vec<Frame>,
    output: String,
    warnings: Vec<String>,
}

impl<'a> State<'a> {
    /// Makes a fresh state: PC 0, one root frame with mark 0, empty mark and
    /// operand stacks
    pub fn new(bytecode: &'a ByteCode, vars: &'a Stash, stack_capacity: usize) -> Self {
        Self {
            bytecode,
            vars,
            sa: Value::Nil,
            sb: Value::Nil,
            pc: 0,
            stack: Stack::with_capacity(stack_capacity),
            marks: Vec::new(),
            frames: vec![Frame::with_name("main")],
            output: String::new(),
            warnings: Vec::new(),
        }
    }

    /// The program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// The operation at the program counter, `None` once the PC has fallen
    /// off the program
    pub fn current_op(&self) -> Option<&'a Operation> {
        self.bytecode.ops.get(self.pc)
    }

    /// Advances the program counter by one
    pub fn advance(&mut self) {
        self.pc += 1;
    }

    /// Advances the program counter by a signed offset
    ///
    /// Landing one past the last operation ends the render normally; landing
    /// anywhere else outside the program is a structural error.
    pub fn advance_by(&mut self, offset: i64) -> Result<()> {
        let len = self.bytecode.ops.len();
        let target = self.pc as i64 + offset;
        if target < 0 || target > len as i64 {
            return Err(Error::PcOutOfRange {
                pc: self.pc,
                target,
                len,
            });
        }
        self.pc = target as usize;
        Ok(())
    }

    /// The current frame: the top of the frame stack
    pub fn current_frame(&self) -> Result<&Frame> {
        self.frames
            .last()
            .ok_or(Error::EmptyFrameStack { pc: self.pc })
    }

    /// The current frame's local variable at position `i`
    pub fn get_lvar(&self, i: usize) -> Result<Value> {
        Ok(self.current_frame()?.get_lvar(&self.stack, i))
    }

    /// Writes the current frame's local variable at position `i`
    pub fn set_lvar(&mut self, i: usize, value: Value) -> Result<()> {
        let frame = self.current_frame()?.clone();
        frame.set_lvar(&mut self.stack, i, value);
        Ok(())
    }

    /// Records the operand stack's tip on the mark stack
    pub fn pushmark(&mut self) {
        self.marks.push(self.stack.cur());
    }

    /// Pops the top mark
    pub fn popmark(&mut self) -> Result<usize> {
        self.marks
            .pop()
            .ok_or(Error::MarkStackUnderflow { pc: self.pc })
    }

    /// The top mark, without popping it
    pub fn current_mark(&self) -> Result<usize> {
        self.marks
            .last()
            .copied()
            .ok_or(Error::MarkStackUnderflow { pc: self.pc })
    }

    /// Appends to the output buffer
    pub fn append_output(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Records a non-fatal warning
    ///
    /// Warnings flag template authoring hazards (printing nil, calling a
    /// missing method) that the VM recovers from with a benign value.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// The variable bag
    pub fn vars(&self) -> &Stash {
        self.vars
    }

    /// Consumes the state, yielding the rendered output and the warnings
    pub fn finish(self) -> (String, Vec<String>) {
        (self.output, self.warnings)
    }
}
