//! P-code instructions and the growable code buffer.
//!
//! Forward jumps are emitted with a zero placeholder and rewritten once the
//! target is known. Jump fixups handed to the parser are move-only values,
//! so a handle cannot be patched twice. The listing writer and parser are
//! inverses of each other; the parser exists so a dumped listing can be
//! checked triple-for-triple.

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

/// Instruction opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Lit,
    Opr,
    Lod,
    Sto,
    Cal,
    Int,
    Jmp,
    Jpc,
    Red,
    Wrt,
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Lit => "LIT",
            Op::Opr => "OPR",
            Op::Lod => "LOD",
            Op::Sto => "STO",
            Op::Cal => "CAL",
            Op::Int => "INT",
            Op::Jmp => "JMP",
            Op::Jpc => "JPC",
            Op::Red => "RED",
            Op::Wrt => "WRT",
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Op> {
        Some(match text {
            "LIT" => Op::Lit,
            "OPR" => Op::Opr,
            "LOD" => Op::Lod,
            "STO" => Op::Sto,
            "CAL" => Op::Cal,
            "INT" => Op::Int,
            "JMP" => Op::Jmp,
            "JPC" => Op::Jpc,
            "RED" => Op::Red,
            "WRT" => Op::Wrt,
            _ => return None,
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// `OPR` sub-codes, carried in the instruction's `a` field. The numbering
/// is a wire-level contract shared with any consumer of dumped listings.
pub mod opr {
    pub const RET: i32 = 0;
    pub const NEG: i32 = 1;
    pub const ADD: i32 = 2;
    pub const SUB: i32 = 3;
    pub const MUL: i32 = 4;
    pub const DIV: i32 = 5;
    pub const ODD: i32 = 6;
    pub const EQ: i32 = 7;
    pub const NE: i32 = 8;
    pub const LT: i32 = 9;
    pub const GE: i32 = 10;
    pub const GT: i32 = 11;
    pub const LE: i32 = 12;
    pub const PRINTLN: i32 = 13;
}

/// One instruction: opcode, level field, operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PCode {
    pub op: Op,
    pub l: i32,
    pub a: i32,
}

/// Pending forward jump. Move-only on purpose: `CodeBuffer::patch` consumes
/// it, which makes a double backpatch a compile error instead of a bug.
#[derive(Debug)]
#[must_use = "an unpatched jump leaves a zero target in the code"]
pub struct Fixup(usize);

impl Fixup {
    pub fn addr(&self) -> usize {
        self.0
    }
}

/// Append-only instruction buffer.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    code: Vec<PCode>,
}

impl CodeBuffer {
    pub fn new() -> CodeBuffer {
        CodeBuffer::default()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn code(&self) -> &[PCode] {
        &self.code
    }

    /// Append an instruction, returning its address.
    pub fn emit(&mut self, op: Op, l: i32, a: i32) -> usize {
        self.code.push(PCode { op, l, a });
        self.code.len() - 1
    }

    /// Emit a placeholder `JMP` and return its fixup.
    pub fn emit_jump(&mut self) -> Fixup {
        Fixup(self.emit(Op::Jmp, 0, 0))
    }

    /// Emit a placeholder `JPC` (branch taken when the popped value is
    /// zero) and return its fixup.
    pub fn emit_branch(&mut self) -> Fixup {
        Fixup(self.emit(Op::Jpc, 0, 0))
    }

    /// Resolve a pending forward jump to `target`.
    pub fn patch(&mut self, fixup: Fixup, target: usize) {
        self.backpatch(fixup.0, target);
    }

    /// Rewrite the operand of the jump at `at`. Used directly for procedure
    /// entry jumps, whose addresses travel through the symbol table.
    pub fn backpatch(&mut self, at: usize, target: usize) {
        debug_assert!(at < self.code.len(), "backpatch past the end");
        debug_assert!(
            matches!(self.code[at].op, Op::Jmp | Op::Jpc),
            "backpatch target is not a jump"
        );
        debug_assert_eq!(self.code[at].a, 0, "jump patched twice");
        self.code[at].a = target as i32;
    }

    /// Render the whole buffer, one `"<addr:4> <mnemonic> <L> <a>"` line
    /// per instruction.
    pub fn write_listing(&self, out: &mut dyn Write) -> io::Result<()> {
        for (addr, inst) in self.code.iter().enumerate() {
            writeln!(out, "{:>4} {} {} {}", addr, inst.op, inst.l, inst.a)?;
        }
        Ok(())
    }

    pub fn listing(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::new();
        for (addr, inst) in self.code.iter().enumerate() {
            let _ = writeln!(out, "{:>4} {} {} {}", addr, inst.op, inst.l, inst.a);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: unknown mnemonic '{text}'")]
    UnknownMnemonic { line: usize, text: String },
    #[error("line {line}: malformed number '{text}'")]
    BadNumber { line: usize, text: String },
    #[error("line {line}: address {found} out of sequence (expected {expected})")]
    BadAddress {
        line: usize,
        found: usize,
        expected: usize,
    },
}

/// Parse a listing produced by `write_listing` back into instructions.
pub fn parse_listing(text: &str) -> Result<Vec<PCode>, ListingError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ListingError::FieldCount {
                line,
                found: fields.len(),
            });
        }
        let addr: usize = fields[0].parse().map_err(|_| ListingError::BadNumber {
            line,
            text: fields[0].to_string(),
        })?;
        if addr != out.len() {
            return Err(ListingError::BadAddress {
                line,
                found: addr,
                expected: out.len(),
            });
        }
        let op = Op::from_mnemonic(fields[1]).ok_or_else(|| ListingError::UnknownMnemonic {
            line,
            text: fields[1].to_string(),
        })?;
        let l: i32 = fields[2].parse().map_err(|_| ListingError::BadNumber {
            line,
            text: fields[2].to_string(),
        })?;
        let a: i32 = fields[3].parse().map_err(|_| ListingError::BadNumber {
            line,
            text: fields[3].to_string(),
        })?;
        out.push(PCode { op, l, a });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_returns_consecutive_addresses() {
        let mut buf = CodeBuffer::new();
        assert_eq!(buf.emit(Op::Lit, 0, 5), 0);
        assert_eq!(buf.emit(Op::Lit, 0, 7), 1);
        assert_eq!(buf.emit(Op::Opr, 0, opr::ADD), 2);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn fixups_resolve_forward_jumps() {
        let mut buf = CodeBuffer::new();
        let jump = buf.emit_jump();
        buf.emit(Op::Lit, 0, 1);
        let branch = buf.emit_branch();
        buf.emit(Op::Lit, 0, 2);
        buf.patch(branch, 4);
        buf.patch(jump, 1);
        assert_eq!(buf.code()[0], PCode { op: Op::Jmp, l: 0, a: 1 });
        assert_eq!(buf.code()[2], PCode { op: Op::Jpc, l: 0, a: 4 });
    }

    #[test]
    fn listing_format() {
        let mut buf = CodeBuffer::new();
        buf.emit(Op::Jmp, 0, 2);
        buf.emit(Op::Lit, 0, -3);
        buf.emit(Op::Opr, 0, opr::RET);
        assert_eq!(
            buf.listing(),
            "   0 JMP 0 2\n   1 LIT 0 -3\n   2 OPR 0 0\n"
        );
    }

    #[test]
    fn listing_round_trips() {
        let mut buf = CodeBuffer::new();
        buf.emit(Op::Int, 0, 5);
        buf.emit(Op::Lit, 0, 3);
        buf.emit(Op::Lod, 1, 5);
        buf.emit(Op::Sto, -1, 6);
        buf.emit(Op::Cal, 0, 1);
        buf.emit(Op::Opr, 0, opr::PRINTLN);
        let parsed = parse_listing(&buf.listing()).unwrap();
        assert_eq!(parsed, buf.code());
    }

    #[test]
    fn listing_parser_rejects_garbage() {
        assert!(matches!(
            parse_listing("   0 NOP 0 0"),
            Err(ListingError::UnknownMnemonic { .. })
        ));
        assert!(matches!(
            parse_listing("   0 LIT 0"),
            Err(ListingError::FieldCount { .. })
        ));
        assert!(matches!(
            parse_listing("   5 LIT 0 0"),
            Err(ListingError::BadAddress { .. })
        ));
        assert!(matches!(
            parse_listing("   0 LIT x 0"),
            Err(ListingError::BadNumber { .. })
        ));
    }
}
