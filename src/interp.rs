//! Stack-machine interpreter for the generated P-code.
//!
//! The runtime stack is a flat `i32` array. `sp` is the base of the current
//! activation record, `top` the next free slot. A frame starts with the
//! return address, the dynamic link, a cached pointer to its display, then
//! the display itself (one base address per visible lexical level) and the
//! local area. `CAL` builds the next frame above `top`; argument values are
//! stored into that not-yet-active region beforehand with `STO -1`.
//!
//! Reads and writes go through checked helpers, so a malformed program
//! surfaces as a `RuntimeError` instead of a panic.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::pcode::{opr, Op, PCode};

/// Frame slot offsets from `sp`.
pub const RETURN_ADDRESS: usize = 0;
pub const OLD_SP: usize = 1;
pub const GLO_DISPLAY: usize = 2;
pub const DISPLAY: usize = 3;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack access out of bounds at slot {0}")]
    BadAccess(usize),
    #[error("negative stack address ({0})")]
    NegativeAddress(i64),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown OPR sub-code {0}")]
    UnknownOpr(i32),
    #[error("input exhausted while reading an integer")]
    InputExhausted,
    #[error("malformed integer input '{0}'")]
    BadInput(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// P-code executor over pluggable standard streams.
pub struct Interpreter<R, W> {
    pc: usize,
    sp: usize,
    top: usize,
    stack: Vec<i32>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W) -> Interpreter<R, W> {
        Interpreter {
            pc: 0,
            sp: 0,
            top: 0,
            stack: Vec::new(),
            input,
            output,
        }
    }

    /// Execute until the program's own `RET` or the end of the buffer.
    pub fn run(&mut self, code: &[PCode]) -> Result<(), RuntimeError> {
        self.pc = 0;
        self.sp = 0;
        self.top = 0;
        self.stack.clear();

        while self.pc < code.len() {
            let inst = code[self.pc];
            match inst.op {
                Op::Lit => {
                    self.push(inst.a);
                    self.pc += 1;
                }
                Op::Opr => {
                    if inst.a == opr::RET {
                        if self.ret()? {
                            return Ok(());
                        }
                    } else {
                        self.operate(inst.a)?;
                        self.pc += 1;
                    }
                }
                Op::Lod => {
                    let base = self.read(self.sp + DISPLAY + index(inst.l)?)?;
                    let value = self.read(offset(base, inst.a)?)?;
                    self.push(value);
                    self.pc += 1;
                }
                Op::Sto => {
                    let value = self.pop()?;
                    if inst.l >= 0 {
                        let base = self.read(self.sp + DISPLAY + index(inst.l)?)?;
                        self.write(offset(base, inst.a)?, value);
                    } else {
                        // destination lives in the callee frame that CAL has
                        // not pushed yet; top itself must not move
                        self.write(offset(self.top as i32, inst.a)?, value);
                    }
                    self.pc += 1;
                }
                Op::Cal => {
                    self.call(index(inst.l)?, inst.a as usize)?;
                }
                Op::Int => {
                    let new_top = self.sp + inst.a.max(0) as usize;
                    if self.stack.len() < new_top {
                        self.stack.resize(new_top, 0);
                    }
                    self.top = new_top;
                    self.write(self.sp + GLO_DISPLAY, (self.sp + DISPLAY) as i32);
                    self.pc += 1;
                }
                Op::Jmp => {
                    self.pc = inst.a as usize;
                }
                Op::Jpc => {
                    let cond = self.pop()?;
                    if cond == 0 {
                        self.pc = inst.a as usize;
                    } else {
                        self.pc += 1;
                    }
                }
                Op::Red => {
                    let value = self.read_int()?;
                    self.push(value);
                    self.pc += 1;
                }
                Op::Wrt => {
                    let value = self.pop()?;
                    write!(self.output, "{} ", value)?;
                    self.pc += 1;
                }
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Procedure return. `true` means the base frame returned: halt.
    fn ret(&mut self) -> Result<bool, RuntimeError> {
        if self.sp == 0 {
            self.output.flush()?;
            return Ok(true);
        }
        let ret_pc = self.read(self.sp + RETURN_ADDRESS)?;
        let old_sp = self.read(self.sp + OLD_SP)?;
        self.top = self.sp;
        self.sp = index(old_sp)?;
        self.pc = index(ret_pc)?;
        Ok(false)
    }

    fn call(&mut self, l: usize, entry: usize) -> Result<(), RuntimeError> {
        let new_base = self.top;
        self.write(new_base + RETURN_ADDRESS, (self.pc + 1) as i32);
        // copy the caller's display up to the callee's declaration level,
        // reading through the caller's cached display pointer
        let caller_display = index(self.read(self.sp + GLO_DISPLAY)?)?;
        for i in 0..=l {
            let slot = self.read(caller_display + i)?;
            self.write(new_base + DISPLAY + i, slot);
        }
        self.write(new_base + DISPLAY + l + 1, new_base as i32);
        self.write(new_base + OLD_SP, self.sp as i32);
        self.sp = new_base;
        self.pc = entry;
        Ok(())
    }

    fn operate(&mut self, code: i32) -> Result<(), RuntimeError> {
        match code {
            opr::NEG => {
                let v = self.pop()?;
                self.push(v.wrapping_neg());
            }
            opr::ODD => {
                let v = self.pop()?;
                self.push(v & 1);
            }
            opr::ADD | opr::SUB | opr::MUL | opr::DIV => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let value = match code {
                    opr::ADD => lhs.wrapping_add(rhs),
                    opr::SUB => lhs.wrapping_sub(rhs),
                    opr::MUL => lhs.wrapping_mul(rhs),
                    _ => {
                        if rhs == 0 {
                            return Err(RuntimeError::DivisionByZero);
                        }
                        lhs.wrapping_div(rhs)
                    }
                };
                self.push(value);
            }
            opr::EQ | opr::NE | opr::LT | opr::GE | opr::GT | opr::LE => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let truth = match code {
                    opr::EQ => lhs == rhs,
                    opr::NE => lhs != rhs,
                    opr::LT => lhs < rhs,
                    opr::GE => lhs >= rhs,
                    opr::GT => lhs > rhs,
                    _ => lhs <= rhs,
                };
                self.push(truth as i32);
            }
            opr::PRINTLN => {
                writeln!(self.output)?;
            }
            other => return Err(RuntimeError::UnknownOpr(other)),
        }
        Ok(())
    }

    fn push(&mut self, value: i32) {
        self.write(self.top, value);
        self.top += 1;
    }

    fn pop(&mut self) -> Result<i32, RuntimeError> {
        if self.top == 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        let value = self.read(self.top - 1)?;
        self.top -= 1;
        Ok(value)
    }

    fn read(&self, slot: usize) -> Result<i32, RuntimeError> {
        self.stack
            .get(slot)
            .copied()
            .ok_or(RuntimeError::BadAccess(slot))
    }

    fn write(&mut self, slot: usize, value: i32) {
        if self.stack.len() <= slot {
            self.stack.resize(slot + 1, 0);
        }
        self.stack[slot] = value;
    }

    /// One whitespace-delimited decimal integer from the input stream.
    fn read_int(&mut self) -> Result<i32, RuntimeError> {
        let mut byte = [0u8; 1];
        loop {
            if self.input.read(&mut byte)? == 0 {
                return Err(RuntimeError::InputExhausted);
            }
            if !byte[0].is_ascii_whitespace() {
                break;
            }
        }
        let mut text = String::new();
        if byte[0] == b'-' || byte[0] == b'+' {
            text.push(byte[0] as char);
            if self.input.read(&mut byte)? == 0 {
                return Err(RuntimeError::BadInput(text));
            }
        }
        if !byte[0].is_ascii_digit() {
            text.push(byte[0] as char);
            return Err(RuntimeError::BadInput(text));
        }
        text.push(byte[0] as char);
        loop {
            if self.input.read(&mut byte)? == 0 || !byte[0].is_ascii_digit() {
                break;
            }
            text.push(byte[0] as char);
        }
        // wraps like literal parsing does
        let wide: i64 = text
            .parse()
            .map_err(|_| RuntimeError::BadInput(text.clone()))?;
        Ok(wide as i32)
    }
}

fn index(value: i32) -> Result<usize, RuntimeError> {
    usize::try_from(value).map_err(|_| RuntimeError::NegativeAddress(value as i64))
}

fn offset(base: i32, a: i32) -> Result<usize, RuntimeError> {
    let wide = base as i64 + a as i64;
    usize::try_from(wide).map_err(|_| RuntimeError::NegativeAddress(wide))
}
