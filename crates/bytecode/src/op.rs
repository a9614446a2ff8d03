use serde::{Deserialize, Serialize};
use std::fmt;

/// The opcodes understood by the template VM
///
/// The enumeration is a compatibility surface shared with the compiler that
/// produces the bytecode; the variant order is the wire order and must not be
/// rearranged.
///
/// Unless noted otherwise, every op advances the program counter by one after
/// executing. `SA` and `SB` are the VM's two scalar registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Op {
    /// Advances the program counter, nothing else
    Noop,

    /// Clears register SA
    Nil,

    /// Copies register SA into register SB
    MoveToSb,

    /// Copies register SB into register SA
    MoveFromSb,

    /// Loads the op's literal argument into SA
    Literal,

    /// Looks up the string argument in the variable bag and loads the result
    /// into SA, or nil when the variable is absent
    FetchS,

    /// Replaces the record in SA with one of its fields
    ///
    /// The field name is the string argument with its first character
    /// upper-cased. A nil container stays nil; a missing field or a
    /// non-record container warns and produces nil.
    FetchFieldS,

    /// Stringifies SA and wraps it in the raw-string mark, suppressing HTML
    /// escaping on print
    MarkRaw,

    /// Removes the raw-string mark from SA, restoring a plain string
    UnmarkRaw,

    /// Appends SA to the output, HTML-escaped unless SA carries the
    /// raw-string mark; a nil SA warns and prints nothing
    Print,

    /// Appends the stringified SA to the output without escaping; a nil SA
    /// warns and prints nothing
    PrintRaw,

    /// Stores SA into the current frame's local variable at the integer
    /// argument's index
    SaveToLvar,

    /// Loads the current frame's local variable at the integer argument's
    /// index into SA
    LoadLvar,

    /// `SA ← SB + SA` after aligning both operands to a common numeric kind
    Add,

    /// `SA ← SB - SA` after aligning both operands to a common numeric kind
    Sub,

    /// `SA ← SB * SA` after aligning both operands to a common numeric kind
    Mul,

    /// `SA ← SB / SA`; integer operands are promoted to float first, while
    /// unsigned-by-unsigned stays unsigned
    Div,

    /// If SA is truthy, advances by one; otherwise advances by the integer
    /// argument
    And,

    /// Advances by the integer argument, unconditionally
    Goto,

    /// Initializes the three loop slots starting at the integer argument's
    /// index: item (nil), index (-1), and the sequence taken from SA
    ForStart,

    /// Steps the loop whose slot id is held in SA: on a remaining element,
    /// stores it in the item slot and falls through; otherwise advances by
    /// the integer argument
    ForIter,

    /// `SA ← htmlEscape(stringify(SA))`
    HtmlEscape,

    /// `SA ← percent-encode(stringify(SA))`, keeping only RFC 3986's
    /// unreserved characters
    UriEscape,

    /// `SA ← SB == SA` by structural scalar equality
    Eq,

    /// `SA ← SB != SA` by structural scalar equality
    Ne,

    /// Pops the top entry from the mark stack
    Popmark,

    /// Pushes the operand stack's current tip onto the mark stack
    Pushmark,

    /// Pushes SA onto the operand stack
    Push,

    /// Invokes the method named by the string argument on the invocant at
    /// the current mark, with the stack entries above it as arguments
    ///
    /// Leaves the mark and the argument list on the stack; the compiler
    /// emits `popmark` afterwards.
    MethodCall,

    /// Halts the render without advancing the program counter
    End,
}

impl Op {
    /// The op's name as it appears in disassembly output
    pub fn name(self) -> &'static str {
        use Op::*;
        match self {
            Noop => "noop",
            Nil => "nil",
            MoveToSb => "move_to_sb",
            MoveFromSb => "move_from_sb",
            Literal => "literal",
            FetchS => "fetch_s",
            FetchFieldS => "fetch_field_s",
            MarkRaw => "mark_raw",
            UnmarkRaw => "unmark_raw",
            Print => "print",
            PrintRaw => "print_raw",
            SaveToLvar => "save_to_lvar",
            LoadLvar => "load_lvar",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            And => "and",
            Goto => "goto",
            ForStart => "for_start",
            ForIter => "for_iter",
            HtmlEscape => "html_escape",
            UriEscape => "uri_escape",
            Eq => "eq",
            Ne => "ne",
            Popmark => "popmark",
            Pushmark => "pushmark",
            Push => "push",
            MethodCall => "methodcall",
            End => "end",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
