//! Diagnostic kinds, collection, and rendering.
//!
//! Every compile-time problem is one `DiagKind` value. The `Reporter`
//! counts and stores them during the parse; rendering against the source
//! happens afterwards, clang-style: a location line, the offending source
//! line with a caret underneath, and an optional `hint:` suggestion.

use std::io::{self, Write};

use thiserror::Error;

use crate::source::SourceFile;

/// Diagnostic severity. Only errors gate execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

/// The diagnostic taxonomy. Display impls double as the message table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagKind {
    #[error("missing {0}")]
    Missing(String),
    #[error("expected {0}")]
    Expect(String),
    #[error("expected {expected}, but found {found}")]
    ExpectFound { expected: String, found: String },
    #[error("extraneous {0}")]
    Redundant(String),
    #[error("redefinition of '{0}'")]
    RedeclaredIdent(String),
    #[error("redefinition of procedure '{0}'")]
    RedeclaredProc(String),
    #[error("use of undeclared identifier '{0}'")]
    UndeclaredIdent(String),
    #[error("use of undeclared procedure '{0}'")]
    UndeclaredProc(String),
    #[error("call to undefined procedure '{0}'")]
    UndefinedProc(String),
    #[error("argument count mismatch")]
    IncompatibleVarList,
    #[error("invalid {0}")]
    IllegalDefine(String),
    #[error("invalid token '{0}'")]
    IllegalWord(String),
    #[error("expression is not assignable")]
    IllegalRvalueAssign,
    #[error("{what}; expected {expected}")]
    SyntaxError { what: String, expected: String },
    #[error("invalid syntax near '{0}'")]
    InvalidSyntax(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}

impl DiagKind {
    /// Suggestion text for the trailing `hint:` line.
    pub fn hint(&self) -> Option<String> {
        match self {
            DiagKind::Missing(what) | DiagKind::Expect(what) => {
                Some(format!("expected {what} here"))
            }
            DiagKind::ExpectFound { expected, found } => {
                Some(format!("did you mean {expected} instead of {found}?"))
            }
            DiagKind::Redundant(what) => Some(format!("remove {what} here")),
            DiagKind::UndeclaredIdent(name) | DiagKind::UndeclaredProc(name) => {
                Some(format!("declare '{name}' first"))
            }
            DiagKind::UndefinedProc(name) => Some(format!("define '{name}' first")),
            DiagKind::IllegalDefine(what) => Some(format!("check the {what}")),
            DiagKind::IllegalWord(word) => Some(format!("check the '{word}'")),
            DiagKind::SyntaxError { expected, .. } => {
                Some(format!("check the syntax: {expected}"))
            }
            DiagKind::IllegalRvalueAssign
            | DiagKind::IncompatibleVarList
            | DiagKind::InvalidSyntax(_)
            | DiagKind::UnexpectedToken(_)
            | DiagKind::RedeclaredIdent(_)
            | DiagKind::RedeclaredProc(_) => None,
        }
    }

    /// How many columns the caret underline spans.
    pub fn highlight_len(&self) -> usize {
        match self {
            DiagKind::Missing(_) | DiagKind::Expect(_) => 1,
            DiagKind::ExpectFound { found, .. } => found.chars().count().max(1),
            DiagKind::Redundant(what) => what.chars().count().saturating_sub(2).max(1),
            DiagKind::RedeclaredIdent(n)
            | DiagKind::RedeclaredProc(n)
            | DiagKind::UndeclaredIdent(n)
            | DiagKind::UndeclaredProc(n)
            | DiagKind::UndefinedProc(n)
            | DiagKind::IllegalWord(n)
            | DiagKind::InvalidSyntax(n)
            | DiagKind::UnexpectedToken(n) => n.chars().count().max(1),
            _ => 1,
        }
    }
}

/// One reported problem, positioned at a 1-based row/column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagKind,
    pub row: u32,
    pub col: u32,
}

// ANSI attributes, mirroring the console palette of the reference
// implementation (red errors, yellow warnings, cyan notes, green carets).
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Collects diagnostics and keeps the error/warning tally.
#[derive(Debug, Default)]
pub struct Reporter {
    diags: Vec<Diagnostic>,
    errors: u32,
    warnings: u32,
}

impl Reporter {
    pub fn new() -> Reporter {
        Reporter::default()
    }

    /// Record an error at `row:col`.
    pub fn report(&mut self, kind: DiagKind, row: u32, col: u32) {
        self.push(Severity::Error, kind, row, col);
    }

    /// Record a warning at `row:col`.
    pub fn warn(&mut self, kind: DiagKind, row: u32, col: u32) {
        self.push(Severity::Warning, kind, row, col);
    }

    fn push(&mut self, severity: Severity, kind: DiagKind, row: u32, col: u32) {
        match severity {
            Severity::Error | Severity::Fatal => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note => {}
        }
        self.diags.push(Diagnostic {
            severity,
            kind,
            row,
            col,
        });
    }

    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// Render every collected diagnostic in source order.
    pub fn render(&self, src: &SourceFile, color: bool, out: &mut dyn Write) -> io::Result<()> {
        for diag in &self.diags {
            render_one(diag, src, color, out)?;
        }
        Ok(())
    }

    /// Final tally plus the success/failure banner.
    pub fn render_summary(&self, color: bool, out: &mut dyn Write) -> io::Result<()> {
        let (red, yellow, green, reset) = if color {
            (RED, YELLOW, GREEN, RESET)
        } else {
            ("", "", "", "")
        };
        let rule = "-".repeat(57);
        writeln!(out, "{rule}")?;
        if self.errors == 0 && self.warnings == 0 {
            writeln!(out, "{green}*{reset} build succeeded with no errors or warnings.")?;
        } else {
            let mut parts = Vec::new();
            if self.errors > 0 {
                parts.push(format!("{red}{}{reset} error(s)", self.errors));
            }
            if self.warnings > 0 {
                parts.push(format!("{yellow}{}{reset} warning(s)", self.warnings));
            }
            writeln!(out, "{} generated.", parts.join(", "))?;
        }
        writeln!(out, "{rule}")?;
        if self.errors == 0 {
            writeln!(out, "{green}compilation successful{reset}")?;
        } else {
            writeln!(out, "{red}compilation failed{reset}")?;
        }
        Ok(())
    }
}

fn render_one(
    diag: &Diagnostic,
    src: &SourceFile,
    color: bool,
    out: &mut dyn Write,
) -> io::Result<()> {
    let (level_color, bold, cyan, green, reset) = if color {
        let lc = match diag.severity {
            Severity::Error | Severity::Fatal => RED,
            Severity::Warning => YELLOW,
            Severity::Note => CYAN,
        };
        (lc, BOLD, CYAN, GREEN, RESET)
    } else {
        ("", "", "", "", "")
    };

    writeln!(
        out,
        "{bold}{}:{}:{}:{reset} {level_color}{}:{reset} {}",
        src.name(),
        diag.row,
        diag.col,
        diag.severity.label(),
        diag.kind
    )?;

    let line = src.line_text(diag.row);
    if !line.is_empty() {
        writeln!(out, "{cyan}{:>4} |{reset} {}", diag.row, line)?;
        let pad = " ".repeat(diag.col.saturating_sub(1) as usize);
        let carets = "^".repeat(diag.kind.highlight_len());
        writeln!(out, "{cyan}     |{reset} {pad}{green}{carets}{reset}")?;
    }
    if let Some(hint) = diag.kind.hint() {
        writeln!(out, "{cyan}     |{reset} {green}hint: {hint}{reset}")?;
    }
    writeln!(out)
}
