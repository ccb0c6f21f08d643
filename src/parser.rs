//! Recursive-descent parser with embedded P-code generation.
//!
//! One routine per nonterminal, driven by the look-ahead token. Code is
//! emitted in a single pass; forward jumps (`if`, `while`, procedure entry)
//! get placeholder targets that are patched once the destination address is
//! known.
//!
//! Error recovery has two shapes. Where a single required terminal is
//! missing but the next token can carry the parse (a dropped `;` or `:=`),
//! the parser reports and continues as if the terminal had been present.
//! Everywhere else `judge` runs panic mode: report, then skip tokens until
//! the look-ahead lands in the production's FIRST or FOLLOW set.
//!
//! Addressing discipline shared with the interpreter: instruction `L`
//! fields carry the *declaration level* of the symbol (the display index
//! holding its frame base), and a symbol at byte offset `off` declared at
//! level `L` lives `off/4 + 3 + L + 1` slots above that base.

use crate::diagnostics::{DiagKind, Reporter};
use crate::lexer::Lexer;
use crate::pcode::{opr, CodeBuffer, Op};
use crate::source::SourceFile;
use crate::symtable::{EntryIndex, KindClass, SymTable, SymbolKind, UNIT_SIZE};
use crate::token::{TokenKind, TokenSet};

const FIRST_CONDECL: TokenSet = TokenSet::of(TokenKind::Const);
const FIRST_VARDECL: TokenSet = TokenSet::of(TokenKind::Var);
const FIRST_PROC: TokenSet = TokenSet::of(TokenKind::Procedure);
const FIRST_BODY: TokenSet = TokenSet::of(TokenKind::Begin);
const FIRST_STATEMENT: TokenSet = TokenSet::of(TokenKind::Ident)
    .with(TokenKind::If)
    .with(TokenKind::While)
    .with(TokenKind::Call)
    .with(TokenKind::Begin)
    .with(TokenKind::Read)
    .with(TokenKind::Write);
const FIRST_FACTOR: TokenSet = TokenSet::of(TokenKind::Ident)
    .with(TokenKind::Number)
    .with(TokenKind::LParen);
const FIRST_EXP: TokenSet = FIRST_FACTOR.with(TokenKind::Plus).with(TokenKind::Minus);
const FIRST_LOP: TokenSet = TokenSet::of(TokenKind::Eql)
    .with(TokenKind::Neq)
    .with(TokenKind::Lss)
    .with(TokenKind::Leq)
    .with(TokenKind::Grt)
    .with(TokenKind::Geq);
const FIRST_BLOCK: TokenSet = FIRST_CONDECL
    .union(FIRST_VARDECL)
    .union(FIRST_PROC)
    .union(FIRST_BODY);

const FOLLOW_CONSTDEF: TokenSet = TokenSet::of(TokenKind::Comma).with(TokenKind::Semicolon);
const FOLLOW_STATEMENT: TokenSet = TokenSet::of(TokenKind::Semicolon)
    .with(TokenKind::End)
    .with(TokenKind::Else);
const FOLLOW_LEXP: TokenSet = TokenSet::of(TokenKind::Then).with(TokenKind::Do);
const FOLLOW_EXP: TokenSet = FIRST_LOP
    .with(TokenKind::Comma)
    .with(TokenKind::RParen)
    .union(FOLLOW_STATEMENT)
    .union(FOLLOW_LEXP);
const FOLLOW_TERM: TokenSet = FOLLOW_EXP.with(TokenKind::Plus).with(TokenKind::Minus);
const FOLLOW_FACTOR: TokenSet = FOLLOW_TERM.with(TokenKind::Star).with(TokenKind::Slash);

/// Where panic-mode recovery landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sync {
    /// Look-ahead can start the production; go on parsing it.
    InFirst,
    /// Look-ahead legally follows the production; give up on it.
    InFollow,
    /// Ran out of input.
    Eof,
    /// Landed on something in neither set (only when the sets were narrow).
    Stuck,
}

pub struct Parser<'a> {
    lex: Lexer<'a>,
    diags: &'a mut Reporter,
    table: SymTable,
    code: CodeBuffer,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a SourceFile, diags: &'a mut Reporter) -> Parser<'a> {
        Parser {
            lex: Lexer::new(src),
            diags,
            table: SymTable::new(),
            code: CodeBuffer::new(),
        }
    }

    /// Run the whole pipeline over the source, yielding generated code and
    /// the finished symbol table. Diagnostics accumulate in the reporter
    /// handed to `new`.
    pub fn parse(mut self) -> (CodeBuffer, SymTable) {
        self.advance();
        self.prog();
        (self.code, self.table)
    }

    // ------------------------------------------------------------------
    // token plumbing
    // ------------------------------------------------------------------

    fn kind(&self) -> TokenKind {
        self.lex.kind()
    }

    fn advance(&mut self) {
        self.lex.get_word(self.diags);
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn report_here(&mut self, kind: DiagKind) {
        self.diags.report(kind, self.lex.row(), self.lex.col());
    }

    /// "missing X" points just past the end of the previous token, where
    /// the absent terminal should have appeared.
    fn report_missing(&mut self, what: &str) {
        self.diags.report(
            DiagKind::Missing(what.to_string()),
            self.lex.prev_row(),
            self.lex.prev_col() + 1,
        );
    }

    /// Require `kind`, synthesizing it when absent.
    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.report_missing(what);
            false
        }
    }

    fn skip_until(&mut self, set: TokenSet) {
        while self.kind() != TokenKind::Eof && !set.contains(self.kind()) {
            self.advance();
        }
    }

    /// Panic-mode driver. If the look-ahead is outside `first`, report
    /// `err` and skip until it lands in `first` or `follow` (or input
    /// ends), then say where it landed.
    fn judge(&mut self, first: TokenSet, follow: TokenSet, err: DiagKind) -> Sync {
        if first.contains(self.kind()) {
            return Sync::InFirst;
        }
        self.report_here(err);
        let both = first.union(follow);
        while self.kind() != TokenKind::Eof && !both.contains(self.kind()) {
            self.advance();
        }
        if self.kind() == TokenKind::Eof {
            Sync::Eof
        } else if first.contains(self.kind()) {
            Sync::InFirst
        } else if follow.contains(self.kind()) {
            Sync::InFollow
        } else {
            Sync::Stuck
        }
    }

    // ------------------------------------------------------------------
    // addressing
    // ------------------------------------------------------------------

    /// `(L, a)` pair addressing a variable or formal parameter: display
    /// index of its declaring frame and its slot above that frame's base.
    fn var_address(&self, index: EntryIndex) -> (i32, i32) {
        let entry = self.table.entry(index);
        let level = entry.level as i32;
        let slot = (entry.offset / UNIT_SIZE) as i32 + 3 + level + 1;
        (level, slot)
    }

    // ------------------------------------------------------------------
    // prog -> program <id> ; block
    // ------------------------------------------------------------------

    fn prog(&mut self) {
        if !self.eat(TokenKind::Program) {
            match self.judge(
                TokenSet::of(TokenKind::Program),
                FIRST_BLOCK.with(TokenKind::Ident),
                DiagKind::Missing("'program'".into()),
            ) {
                Sync::InFirst => {
                    self.advance();
                }
                Sync::Eof => return,
                _ => {}
            }
        }

        let name = if self.kind() == TokenKind::Ident {
            let name = self.lex.lexeme().to_string();
            self.advance();
            name
        } else {
            self.report_here(DiagKind::Expect("program name".into()));
            String::new()
        };
        let program = self.table.enter_program(&name);
        self.expect(TokenKind::Semicolon, "';'");

        // entry jump over any procedure bodies, resolved at block entry
        let entry_jump = self.code.emit(Op::Jmp, 0, 0);
        self.table.set_entry_addr(program, entry_jump as u32);
        self.block(Some(program));

        if self.kind() != TokenKind::Eof {
            let lexeme = self.lex.lexeme().to_string();
            self.report_here(DiagKind::Redundant(format!("'{lexeme}'")));
        }
    }

    // ------------------------------------------------------------------
    // block -> [condecl] [vardecl] [proc] body
    // ------------------------------------------------------------------

    /// `owner` is the symbol entry this block belongs to; `None` when the
    /// owning procedure's declaration failed and there is nothing to hang
    /// the frame data on.
    fn block(&mut self, owner: Option<EntryIndex>) {
        if self.kind() == TokenKind::Const {
            self.condecl();
        }
        if self.kind() == TokenKind::Var {
            self.vardecl();
        }

        // the local area is complete; nested procedures reuse the cursor
        let width = self.table.alloc_offset();
        match owner {
            Some(index) => self.table.set_width(index, width),
            None => self.table.reset_alloc(),
        }

        while self.kind() == TokenKind::Procedure {
            self.proc();
        }

        let prologue = self.code.len();
        if let Some(index) = owner {
            let pending = self.table.entry(index).entry_addr as usize;
            self.code.backpatch(pending, prologue);
            self.table.set_entry_addr(index, prologue as u32);
            self.table.set_defined(index);
        }
        let level = self.table.level() as i32;
        self.code
            .emit(Op::Int, 0, (width / UNIT_SIZE) as i32 + 3 + level + 1);

        self.body();
        self.code.emit(Op::Opr, 0, opr::RET);
    }

    // ------------------------------------------------------------------
    // condecl -> const const_def { , const_def } ;
    // ------------------------------------------------------------------

    fn condecl(&mut self) {
        self.advance();
        loop {
            self.const_def();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, "';'");
    }

    // const_def -> <id> := <integer>
    fn const_def(&mut self) {
        if self.kind() != TokenKind::Ident
            && self.judge(
                TokenSet::of(TokenKind::Ident),
                FOLLOW_CONSTDEF,
                DiagKind::Expect("constant name".into()),
            ) != Sync::InFirst
        {
            return;
        }
        let name = self.lex.lexeme().to_string();
        let (row, col) = (self.lex.row(), self.lex.col());
        self.advance();

        if !self.eat(TokenKind::Assign) {
            if self.kind() == TokenKind::Eql {
                self.report_here(DiagKind::ExpectFound {
                    expected: "':='".into(),
                    found: "'='".into(),
                });
                self.advance();
            } else {
                self.report_missing("':='");
            }
        }

        if self.kind() == TokenKind::Number {
            let value = parse_number(self.lex.lexeme());
            match self.table.insert(&name, 0, SymbolKind::Constant) {
                Some(index) => self.table.set_value(index, value),
                None => self.diags.report(DiagKind::RedeclaredIdent(name), row, col),
            }
            self.advance();
        } else {
            self.report_here(DiagKind::IllegalDefine("constant definition".into()));
            self.skip_until(FOLLOW_CONSTDEF);
        }
    }

    // ------------------------------------------------------------------
    // vardecl -> var <id> { , <id> } ;
    // ------------------------------------------------------------------

    fn vardecl(&mut self) {
        self.advance();
        loop {
            if self.kind() == TokenKind::Ident {
                let name = self.lex.lexeme().to_string();
                let (row, col) = (self.lex.row(), self.lex.col());
                let offset = self.table.alloc_slot();
                if self
                    .table
                    .insert(&name, offset, SymbolKind::Variable)
                    .is_none()
                {
                    self.diags.report(DiagKind::RedeclaredIdent(name), row, col);
                }
                self.advance();
            } else {
                self.report_here(DiagKind::Expect("variable name".into()));
                self.skip_until(FOLLOW_CONSTDEF.union(FIRST_PROC).union(FIRST_BODY));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, "';'");
    }

    // ------------------------------------------------------------------
    // proc -> procedure <id> ( [<id> { , <id> }] ) ; block
    // ------------------------------------------------------------------

    fn proc(&mut self) {
        self.advance();

        let mut declared: Option<EntryIndex> = None;
        if self.kind() == TokenKind::Ident {
            let name = self.lex.lexeme().to_string();
            let (row, col) = (self.lex.row(), self.lex.col());
            match self.table.insert(&name, 0, SymbolKind::Procedure) {
                Some(index) => declared = Some(index),
                None => self.diags.report(DiagKind::RedeclaredProc(name), row, col),
            }
            self.advance();
        } else {
            self.report_here(DiagKind::Expect("procedure name".into()));
        }

        self.table.make_table();
        self.table.enter_scope();

        self.expect(TokenKind::LParen, "'('");
        if self.kind() == TokenKind::Ident {
            loop {
                let name = self.lex.lexeme().to_string();
                let (row, col) = (self.lex.row(), self.lex.col());
                let offset = self.table.alloc_slot();
                match self
                    .table
                    .insert(&name, offset, SymbolKind::FormalParameter)
                {
                    Some(index) => {
                        if let Some(owner) = declared {
                            self.table.add_formal(owner, index);
                        }
                    }
                    None => self.diags.report(DiagKind::RedeclaredIdent(name), row, col),
                }
                self.advance();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                if self.kind() != TokenKind::Ident {
                    self.report_here(DiagKind::Expect("parameter name".into()));
                    self.skip_until(TokenSet::of(TokenKind::RParen).with(TokenKind::Semicolon));
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        self.expect(TokenKind::Semicolon, "';'");

        if let Some(index) = declared {
            let pending = self.code.emit(Op::Jmp, 0, 0);
            self.table.set_entry_addr(index, pending as u32);
        }
        self.block(declared);
        self.table.leave_scope();
        self.expect(TokenKind::Semicolon, "';'");
    }

    // ------------------------------------------------------------------
    // body -> begin statement { ; statement } end
    // ------------------------------------------------------------------

    fn body(&mut self) {
        if !self.eat(TokenKind::Begin) {
            match self.judge(
                FIRST_BODY,
                FIRST_STATEMENT.union(FOLLOW_STATEMENT),
                DiagKind::Missing("'begin'".into()),
            ) {
                Sync::InFirst => {
                    self.advance();
                }
                Sync::Eof => return,
                _ => {}
            }
        }

        loop {
            self.statement();
            if self.eat(TokenKind::Semicolon) {
                if self.kind() == TokenKind::End {
                    self.diags.warn(
                        DiagKind::Redundant("';'".into()),
                        self.lex.prev_row(),
                        self.lex.prev_col(),
                    );
                    break;
                }
                continue;
            }
            if FIRST_STATEMENT.contains(self.kind()) {
                // two statements with no separator between them
                self.report_missing("';'");
                continue;
            }
            break;
        }

        if !self.eat(TokenKind::End) {
            self.report_missing("'end'");
        }
    }

    // ------------------------------------------------------------------
    // statement
    // ------------------------------------------------------------------

    fn statement(&mut self) {
        match self.kind() {
            TokenKind::Ident => self.assignment(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Call => self.call_statement(),
            TokenKind::Begin => self.body(),
            TokenKind::Read => self.read_statement(),
            TokenKind::Write => self.write_statement(),
            _ => {
                let found = if self.kind() == TokenKind::Eof {
                    self.kind().describe().to_string()
                } else {
                    self.lex.lexeme().to_string()
                };
                let sync = self.judge(
                    FIRST_STATEMENT,
                    FOLLOW_STATEMENT,
                    DiagKind::UnexpectedToken(found),
                );
                if sync == Sync::InFirst {
                    self.statement();
                }
            }
        }
    }

    // <id> := exp
    fn assignment(&mut self) {
        let name = self.lex.lexeme().to_string();
        let (row, col) = (self.lex.row(), self.lex.col());
        let target = self.table.lookup(&name, KindClass::Value);
        match target {
            None => self
                .diags
                .report(DiagKind::UndeclaredIdent(name.clone()), row, col),
            Some(index) => {
                if self.table.entry(index).kind == SymbolKind::Constant {
                    self.diags.report(DiagKind::IllegalRvalueAssign, row, col);
                }
            }
        }
        self.advance();

        if !self.eat(TokenKind::Assign) {
            if self.kind() == TokenKind::Eql {
                self.report_here(DiagKind::ExpectFound {
                    expected: "':='".into(),
                    found: "'='".into(),
                });
                self.advance();
            } else {
                self.report_missing("':='");
            }
        }

        self.exp();

        // never store through an unresolved or read-only name
        if let Some(index) = target {
            let entry = self.table.entry(index);
            if matches!(
                entry.kind,
                SymbolKind::Variable | SymbolKind::FormalParameter
            ) {
                let (l, a) = self.var_address(index);
                self.code.emit(Op::Sto, l, a);
            }
        }
    }

    // if lexp then statement [else statement]
    fn if_statement(&mut self) {
        self.advance();
        self.lexp();
        if !self.eat(TokenKind::Then) {
            self.report_missing("'then'");
        }
        let skip_then = self.code.emit_branch();
        self.statement();
        if self.eat(TokenKind::Else) {
            let skip_else = self.code.emit_jump();
            let else_start = self.code.len();
            self.code.patch(skip_then, else_start);
            self.statement();
            let after = self.code.len();
            self.code.patch(skip_else, after);
        } else {
            let after = self.code.len();
            self.code.patch(skip_then, after);
        }
    }

    // while lexp do statement
    fn while_statement(&mut self) {
        self.advance();
        let top = self.code.len();
        self.lexp();
        if !self.eat(TokenKind::Do) {
            self.report_missing("'do'");
        }
        let exit = self.code.emit_branch();
        self.statement();
        self.code.emit(Op::Jmp, 0, top as i32);
        let after = self.code.len();
        self.code.patch(exit, after);
    }

    // call <id> ( [exp { , exp }] )
    fn call_statement(&mut self) {
        self.advance();

        let mut callee: Option<EntryIndex> = None;
        let call_pos = (self.lex.row(), self.lex.col());
        if self.kind() == TokenKind::Ident {
            let name = self.lex.lexeme().to_string();
            match self.table.lookup(&name, KindClass::Procedure) {
                Some(index) => {
                    if self.table.entry(index).is_defined {
                        callee = Some(index);
                    } else {
                        self.diags
                            .report(DiagKind::UndefinedProc(name), call_pos.0, call_pos.1);
                    }
                }
                None => self
                    .diags
                    .report(DiagKind::UndeclaredProc(name), call_pos.0, call_pos.1),
            }
            self.advance();
        } else {
            self.report_here(DiagKind::Expect("procedure name".into()));
        }

        self.expect(TokenKind::LParen, "'('");
        let mut argc = 0usize;
        if FIRST_EXP.contains(self.kind()) {
            loop {
                self.exp();
                if let Some(index) = callee {
                    // drop the value into the callee's frame-to-be
                    let callee_level = self.table.entry(index).level as i32;
                    self.code
                        .emit(Op::Sto, -1, 3 + callee_level + 2 + argc as i32);
                }
                argc += 1;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");

        if let Some(index) = callee {
            let entry = self.table.entry(index);
            if entry.formals.len() != argc {
                self.diags
                    .report(DiagKind::IncompatibleVarList, call_pos.0, call_pos.1);
            }
            let (level, addr) = (entry.level as i32, entry.entry_addr as i32);
            self.code.emit(Op::Cal, level, addr);
        }
    }

    // read ( <id> { , <id> } )
    fn read_statement(&mut self) {
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        loop {
            if self.kind() == TokenKind::Ident {
                let name = self.lex.lexeme().to_string();
                let (row, col) = (self.lex.row(), self.lex.col());
                let target = self.table.lookup(&name, KindClass::Value);
                match target {
                    None => self.diags.report(DiagKind::UndeclaredIdent(name), row, col),
                    Some(index) => {
                        if self.table.entry(index).kind == SymbolKind::Constant {
                            self.diags.report(DiagKind::IllegalRvalueAssign, row, col);
                        }
                    }
                }
                self.advance();
                self.code.emit(Op::Red, 0, 0);
                if let Some(index) = target {
                    let entry = self.table.entry(index);
                    if matches!(
                        entry.kind,
                        SymbolKind::Variable | SymbolKind::FormalParameter
                    ) {
                        let (l, a) = self.var_address(index);
                        self.code.emit(Op::Sto, l, a);
                    }
                }
            } else {
                self.report_here(DiagKind::Expect("variable name".into()));
                self.skip_until(FOLLOW_CONSTDEF.with(TokenKind::RParen));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'");
    }

    // write ( exp { , exp } )
    fn write_statement(&mut self) {
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        if FIRST_EXP.contains(self.kind()) {
            loop {
                self.exp();
                self.code.emit(Op::Wrt, 0, 0);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        } else {
            self.report_here(DiagKind::Expect("an expression".into()));
        }
        self.expect(TokenKind::RParen, "')'");
        // one newline per write list, whatever its arity
        self.code.emit(Op::Opr, 0, opr::PRINTLN);
    }

    // ------------------------------------------------------------------
    // expressions
    // ------------------------------------------------------------------

    // lexp -> exp lop exp | odd exp
    fn lexp(&mut self) {
        if self.eat(TokenKind::Odd) {
            self.exp();
            self.code.emit(Op::Opr, 0, opr::ODD);
            return;
        }
        self.exp();
        let sync = if FIRST_LOP.contains(self.kind()) {
            Sync::InFirst
        } else {
            self.judge(
                FIRST_LOP,
                FOLLOW_LEXP,
                DiagKind::Expect("a relational operator".into()),
            )
        };
        if sync == Sync::InFirst {
            let op = self.kind();
            self.advance();
            self.exp();
            let code = match op {
                TokenKind::Eql => opr::EQ,
                TokenKind::Neq => opr::NE,
                TokenKind::Lss => opr::LT,
                TokenKind::Leq => opr::LE,
                TokenKind::Grt => opr::GT,
                _ => opr::GE,
            };
            self.code.emit(Op::Opr, 0, code);
        }
    }

    // exp -> [+|-] term { (+|-) term }
    fn exp(&mut self) {
        let mut negate = false;
        if self.kind() == TokenKind::Plus {
            self.advance();
        } else if self.kind() == TokenKind::Minus {
            negate = true;
            self.advance();
        }
        self.term();
        if negate {
            self.code.emit(Op::Opr, 0, opr::NEG);
        }
        while matches!(self.kind(), TokenKind::Plus | TokenKind::Minus) {
            let op = self.kind();
            self.advance();
            self.term();
            let code = if op == TokenKind::Plus {
                opr::ADD
            } else {
                opr::SUB
            };
            self.code.emit(Op::Opr, 0, code);
        }
    }

    // term -> factor { (*|/) factor }
    fn term(&mut self) {
        self.factor();
        while matches!(self.kind(), TokenKind::Star | TokenKind::Slash) {
            let op = self.kind();
            self.advance();
            self.factor();
            let code = if op == TokenKind::Star {
                opr::MUL
            } else {
                opr::DIV
            };
            self.code.emit(Op::Opr, 0, code);
        }
    }

    // factor -> <id> | <integer> | ( exp )
    fn factor(&mut self) {
        match self.kind() {
            TokenKind::Ident => {
                let name = self.lex.lexeme().to_string();
                let (row, col) = (self.lex.row(), self.lex.col());
                match self.table.lookup(&name, KindClass::Value) {
                    None => self.diags.report(DiagKind::UndeclaredIdent(name), row, col),
                    Some(index) => {
                        let entry = self.table.entry(index);
                        match entry.kind {
                            SymbolKind::Constant => {
                                // constants fold to immediates
                                let (level, value) = (entry.level as i32, entry.value);
                                self.code.emit(Op::Lit, level, value);
                            }
                            SymbolKind::Variable | SymbolKind::FormalParameter => {
                                let (l, a) = self.var_address(index);
                                self.code.emit(Op::Lod, l, a);
                            }
                            _ => {}
                        }
                    }
                }
                self.advance();
            }
            TokenKind::Number => {
                let value = parse_number(self.lex.lexeme());
                self.code.emit(Op::Lit, 0, value);
                self.advance();
            }
            TokenKind::LParen => {
                self.advance();
                self.exp();
                if !self.eat(TokenKind::RParen) {
                    self.report_missing("')'");
                }
            }
            _ => {
                let sync = self.judge(
                    FIRST_FACTOR,
                    FOLLOW_FACTOR,
                    DiagKind::Expect("an expression".into()),
                );
                if sync == Sync::InFirst {
                    self.factor();
                }
            }
        }
    }
}

/// Literal conversion wraps on overflow rather than failing the parse.
fn parse_number(text: &str) -> i32 {
    text.parse::<i64>().unwrap_or(0) as i32
}
