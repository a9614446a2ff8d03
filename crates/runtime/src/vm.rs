use crate::{
    coerce::{align_for_arithmetic, to_slot_index, Aligned},
    escape::{html_escape, uri_escape},
    record::MethodOutcome,
    Error, Result, State, Stash, Value,
};
use smallvec::SmallVec;
use std::rc::Rc;
use washi_bytecode::{ByteCode, Op, Operation};

/// The configurable settings used by a [Vm]
pub struct VmSettings {
    /// The operand stack's initial capacity
    ///
    /// The stack grows by doubling when a render outgrows it.
    pub initial_stack_capacity: usize,
}

impl Default for VmSettings {
    fn default() -> Self {
        Self {
            initial_stack_capacity: 16,
        }
    }
}

/// The template virtual machine
///
/// Each [render](Vm::render) is single-threaded and synchronous: a fresh
/// [State] is constructed, the dispatch loop runs the program to its `end`
/// op (or off the last operation), and the output buffer is returned. The
/// bytecode and variable bag are only read, so both may be shared between
/// renders.
#[derive(Default)]
pub struct Vm {
    settings: VmSettings,
    warnings: Vec<String>,
}

impl Vm {
    /// Makes a VM with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a VM with the given settings
    pub fn with_settings(settings: VmSettings) -> Self {
        Self {
            settings,
            warnings: Vec::new(),
        }
    }

    /// Renders the given bytecode against a variable bag
    ///
    /// Template authoring hazards (printing nil, calling a missing method)
    /// don't fail the render; they're recorded and available from
    /// [warnings](Vm::warnings) afterwards. An error means structurally
    /// broken bytecode.
    pub fn render(&mut self, bytecode: &ByteCode, vars: &Stash) -> Result<String> {
        let mut state = State::new(bytecode, vars, self.settings.initial_stack_capacity);
        let result = state.execute();
        let (output, warnings) = state.finish();
        self.warnings = warnings;
        result.map(|_| output)
    }

    /// The warnings recorded by the most recent render
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl<'a> State<'a> {
    /// The dispatch loop: fetch, execute, repeat until `end` or until the PC
    /// falls off the last operation
    pub(crate) fn execute(&mut self) -> Result<()> {
        while let Some(operation) = self.current_op() {
            match operation.op {
                Op::Noop => self.advance(),
                Op::End => break,
                Op::Nil => {
                    self.sa = Value::Nil;
                    self.advance();
                }
                Op::MoveToSb => {
                    self.sb = self.sa.clone();
                    self.advance();
                }
                Op::MoveFromSb => {
                    self.sa = self.sb.clone();
                    self.advance();
                }
                Op::Literal => {
                    self.sa = Value::from(&operation.arg);
                    self.advance();
                }
                Op::FetchS => self.run_fetch_symbol(operation)?,
                Op::FetchFieldS => self.run_fetch_field(operation)?,
                Op::MarkRaw => self.run_mark_raw(),
                Op::UnmarkRaw => self.run_unmark_raw(),
                Op::Print => self.run_print(),
                Op::PrintRaw => self.run_print_raw(),
                Op::SaveToLvar => {
                    let i = arg_index(operation, self.pc())?;
                    let value = self.sa.clone();
                    self.set_lvar(i, value)?;
                    self.advance();
                }
                Op::LoadLvar => {
                    let i = arg_index(operation, self.pc())?;
                    self.sa = self.get_lvar(i)?;
                    self.advance();
                }
                Op::Add | Op::Sub | Op::Mul => self.run_arithmetic(operation.op),
                Op::Div => self.run_div(),
                Op::And => {
                    if self.sa.to_bool() {
                        self.advance();
                    } else {
                        self.advance_by(arg_int(operation, self.pc())?)?;
                    }
                }
                Op::Goto => self.advance_by(arg_int(operation, self.pc())?)?,
                Op::ForStart => self.run_for_start(operation)?,
                Op::ForIter => self.run_for_iter(operation)?,
                Op::HtmlEscape => {
                    self.sa = Value::from(html_escape(&self.sa.to_display_string()));
                    self.advance();
                }
                Op::UriEscape => {
                    self.sa = Value::from(uri_escape(&self.sa.to_display_string()));
                    self.advance();
                }
                Op::Eq => {
                    self.sa = Value::Bool(self.sb == self.sa);
                    self.advance();
                }
                Op::Ne => {
                    self.sa = Value::Bool(self.sb != self.sa);
                    self.advance();
                }
                Op::Popmark => {
                    // Dropping a mark also discards whatever was pushed
                    // above it, so a balanced pushmark/popmark pair leaves
                    // the operand stack tip where it found it.
                    let mark = self.popmark()?;
                    self.stack.truncate(mark);
                    self.advance();
                }
                Op::Pushmark => {
                    self.pushmark();
                    self.advance();
                }
                Op::Push => {
                    let value = self.sa.clone();
                    self.stack.push(value);
                    self.advance();
                }
                Op::MethodCall => self.run_method_call(operation)?,
            }
        }
        Ok(())
    }

    fn run_fetch_symbol(&mut self, operation: &Operation) -> Result<()> {
        let key = arg_str(operation, self.pc())?;
        self.sa = self.vars().get(key).cloned().unwrap_or_default();
        self.advance();
        Ok(())
    }

    fn run_fetch_field(&mut self, operation: &Operation) -> Result<()> {
        let name = capitalize_first(arg_str(operation, self.pc())?);
        self.sa = match self.sa.clone() {
            Value::Nil => Value::Nil,
            Value::Record(record) => match record.field(&name) {
                Some(value) => value,
                None => {
                    let found = record.type_name().to_string();
                    self.warn(format!("record {found} has no field '{name}'"));
                    Value::Nil
                }
            },
            other => {
                self.warn(format!(
                    "cannot access field '{name}' on {}",
                    other.type_name()
                ));
                Value::Nil
            }
        };
        self.advance();
        Ok(())
    }

    // Wraps SA in the raw-string mark, stringifying it first.
    fn run_mark_raw(&mut self) {
        if !self.sa.is_raw() {
            self.sa = Value::Raw(self.sa.to_display_string().into());
        }
        self.advance();
    }

    // Strips the raw-string mark, so printing escapes again.
    fn run_unmark_raw(&mut self) {
        if let Value::Raw(s) = &self.sa {
            self.sa = Value::Str(s.clone());
        }
        self.advance();
    }

    fn run_print(&mut self) {
        match self.sa.clone() {
            Value::Nil => self.warn("use of nil to print"),
            Value::Raw(s) => self.append_output(&s),
            other => {
                let escaped = html_escape(&other.to_display_string());
                self.append_output(&escaped);
            }
        }
        self.advance();
    }

    fn run_print_raw(&mut self) {
        match self.sa.clone() {
            Value::Nil => self.warn("use of nil to print"),
            other => {
                let text = other.to_display_string();
                self.append_output(&text);
            }
        }
        self.advance();
    }

    fn run_arithmetic(&mut self, op: Op) {
        let aligned = align_for_arithmetic(&self.sb, &self.sa);
        self.sa = match (op, aligned) {
            (Op::Add, Aligned::Int(l, r)) => Value::Int(l.wrapping_add(r)),
            (Op::Add, Aligned::Uint(l, r)) => Value::Uint(l.wrapping_add(r)),
            (Op::Add, Aligned::Float(l, r)) => Value::Float(l + r),
            (Op::Sub, Aligned::Int(l, r)) => Value::Int(l.wrapping_sub(r)),
            (Op::Sub, Aligned::Uint(l, r)) => Value::Uint(l.wrapping_sub(r)),
            (Op::Sub, Aligned::Float(l, r)) => Value::Float(l - r),
            (Op::Mul, Aligned::Int(l, r)) => Value::Int(l.wrapping_mul(r)),
            (Op::Mul, Aligned::Uint(l, r)) => Value::Uint(l.wrapping_mul(r)),
            (Op::Mul, Aligned::Float(l, r)) => Value::Float(l * r),
            _ => unreachable!("run_arithmetic only handles add/sub/mul"),
        };
        self.advance();
    }

    fn run_div(&mut self) {
        self.sa = match align_for_arithmetic(&self.sb, &self.sa) {
            // Integer operands divide as floats; the shortest round-trip
            // display drops the fractional part again when it's zero.
            Aligned::Int(l, r) => {
                if r == 0 {
                    self.warn("division by zero");
                }
                Value::Float(l as f64 / r as f64)
            }
            Aligned::Uint(l, r) => {
                if r == 0 {
                    self.warn("division by zero");
                    Value::Uint(0)
                } else {
                    Value::Uint(l / r)
                }
            }
            Aligned::Float(l, r) => Value::Float(l / r),
        };
        self.advance();
    }

    fn run_for_start(&mut self, operation: &Operation) -> Result<()> {
        let id = arg_index(operation, self.pc())?;
        let seq = match &self.sa {
            Value::Seq(items) => items.clone(),
            // Not a sequence: loop over nothing.
            _ => Rc::new(Vec::new()),
        };
        self.set_lvar(id, Value::Nil)?;
        self.set_lvar(id + 1, Value::Int(-1))?;
        self.set_lvar(id + 2, Value::Seq(seq))?;
        self.advance();
        Ok(())
    }

    fn run_for_iter(&mut self, operation: &Operation) -> Result<()> {
        let offset = arg_int(operation, self.pc())?;
        let id = to_slot_index(&self.sa);

        let index = match self.get_lvar(id + 1)? {
            Value::Int(n) => n,
            other => {
                return Err(Error::CorruptLoopSlot {
                    slot: "index",
                    id,
                    found: other.type_name().to_string(),
                    pc: self.pc(),
                })
            }
        };
        let seq = match self.get_lvar(id + 2)? {
            Value::Seq(items) => items,
            other => {
                return Err(Error::CorruptLoopSlot {
                    slot: "sequence",
                    id,
                    found: other.type_name().to_string(),
                    pc: self.pc(),
                })
            }
        };

        let index = index + 1;
        self.set_lvar(id + 1, Value::Int(index))?;
        if index >= 0 && (index as usize) < seq.len() {
            self.set_lvar(id, seq[index as usize].clone())?;
            self.advance();
        } else {
            self.advance_by(offset)?;
        }
        Ok(())
    }

    fn run_method_call(&mut self, operation: &Operation) -> Result<()> {
        let name = arg_str(operation, self.pc())?;

        // Everything between the current mark and the stack tip is the call:
        // the invocant first, then its arguments. The mark and the entries
        // stay on the stack; the compiler emits popmark afterwards.
        let mark = self.current_mark()?;
        let tip = self.stack.cur();
        let invocant = self.stack.get(mark);
        let args: SmallVec<[Value; 4]> = (mark + 1..tip).map(|i| self.stack.get(i)).collect();
        let supplied = tip.saturating_sub(mark);

        self.sa = match &invocant {
            Value::Record(record) => match record.call_method(name, &args) {
                MethodOutcome::Missing => {
                    let found = record.type_name().to_string();
                    self.warn(format!("no method '{name}' on {found}"));
                    Value::Nil
                }
                MethodOutcome::ArityMismatch { expected } => {
                    self.warn(format!(
                        "wrong number of arguments for '{name}' \
                         (expected {expected}, got {supplied})"
                    ));
                    Value::Nil
                }
                MethodOutcome::Unit => Value::from(""),
                MethodOutcome::Value(value) => value,
            },
            other => {
                self.warn(format!("no method '{name}' on {}", other.type_name()));
                Value::Nil
            }
        };
        self.advance();
        Ok(())
    }
}

fn arg_int(operation: &Operation, pc: usize) -> Result<i64> {
    operation.arg.as_int().ok_or(Error::BadArgument {
        op: operation.op.name(),
        pc,
        expected: "an integer",
    })
}

fn arg_index(operation: &Operation, pc: usize) -> Result<usize> {
    match arg_int(operation, pc)? {
        n if n >= 0 => Ok(n as usize),
        _ => Err(Error::BadArgument {
            op: operation.op.name(),
            pc,
            expected: "a non-negative integer",
        }),
    }
}

fn arg_str(operation: &Operation, pc: usize) -> Result<&str> {
    operation.arg.as_str().ok_or(Error::BadArgument {
        op: operation.op.name(),
        pc,
        expected: "a string",
    })
}

// Exported host fields are conventionally capitalised, so field names are
// looked up with their first character upper-cased.
fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_balanced_mark_pair_restores_the_operand_stack_tip() {
        let bc = ByteCode::with_ops(vec![
            Operation::with_arg(Op::Literal, "x"),
            Operation::new(Op::Push),
            Operation::new(Op::Pushmark),
            Operation::with_arg(Op::Literal, "y"),
            Operation::new(Op::Push),
            Operation::new(Op::Popmark),
            Operation::new(Op::End),
        ]);
        let vars = Stash::new();
        let mut state = State::new(&bc, &vars, 4);

        state.execute().unwrap();
        assert_eq!(state.stack.cur(), 1);
        assert_eq!(state.stack.get(0), Value::from("x"));
        assert_eq!(state.stack.get(1), Value::Nil);
    }

    #[test]
    fn methodcall_leaves_the_mark_and_arguments_in_place() {
        let bc = ByteCode::with_ops(vec![
            Operation::new(Op::Pushmark),
            Operation::with_arg(Op::Literal, 1i64),
            Operation::new(Op::Push),
            Operation::with_arg(Op::MethodCall, "m"),
            Operation::new(Op::End),
        ]);
        let vars = Stash::new();
        let mut state = State::new(&bc, &vars, 4);

        state.execute().unwrap();
        // The invocant is still on the stack and the mark still set; the
        // compiler's popmark is what cleans both up.
        assert_eq!(state.stack.cur(), 1);
        assert_eq!(state.current_mark().unwrap(), 0);
    }

    #[test]
    fn capitalization_only_touches_the_first_character() {
        assert_eq!(capitalize_first("name"), "Name");
        assert_eq!(capitalize_first("fullName"), "FullName");
        assert_eq!(capitalize_first("Name"), "Name");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("été"), "Été");
    }
}
