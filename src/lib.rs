//! pl0c — a compiler and runtime for the PL/0 teaching language.
//!
//! The pipeline: a decoded [`source::SourceFile`] feeds an on-demand
//! [`lexer::Lexer`]; the recursive-descent [`parser::Parser`] checks the
//! program against a display-based [`symtable::SymTable`] and emits
//! stack-machine instructions into a [`pcode::CodeBuffer`] in a single
//! pass; the [`interp::Interpreter`] executes the buffer on a growable
//! integer stack. Problems found along the way land in a
//! [`diagnostics::Reporter`] and never abort the compile; execution is the
//! caller's decision, gated on the error count.
//!
//! ```no_run
//! use pl0c::{compile, source::SourceFile};
//!
//! let src = SourceFile::from_text("demo.pl0", "program demo; begin write(1) end");
//! let out = compile(&src);
//! assert_eq!(out.diagnostics.error_count(), 0);
//! println!("{}", out.code.listing());
//! ```

pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod pcode;
pub mod source;
pub mod symtable;
pub mod token;

use diagnostics::Reporter;
use parser::Parser;
use pcode::CodeBuffer;
use source::SourceFile;
use symtable::SymTable;

/// Everything one compilation produces.
pub struct Compilation {
    pub code: CodeBuffer,
    pub symbols: SymTable,
    pub diagnostics: Reporter,
}

impl Compilation {
    /// Whether the generated code may be executed.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.error_count() == 0
    }
}

/// Compile one source file front to back. Infallible by design: all
/// problems are recoverable and end up in `diagnostics`.
pub fn compile(src: &SourceFile) -> Compilation {
    let mut diagnostics = Reporter::new();
    let parser = Parser::new(src, &mut diagnostics);
    let (code, symbols) = parser.parse();
    Compilation {
        code,
        symbols,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_is_repeatable_within_one_process() {
        let src = SourceFile::from_text("t", "program p; var a; begin a := 1; write(a) end");
        let first = compile(&src);
        let second = compile(&src);
        assert!(first.is_clean());
        assert_eq!(first.code.code(), second.code.code());
        assert_eq!(first.symbols.len(), second.symbols.len());
    }

    #[test]
    fn dirty_compile_still_yields_code_and_symbols() {
        let src = SourceFile::from_text("t", "program p; begin x := 1 end");
        let out = compile(&src);
        assert!(!out.is_clean());
        assert!(!out.code.is_empty());
        assert_eq!(out.symbols.len(), 1); // just the program entry
    }
}
