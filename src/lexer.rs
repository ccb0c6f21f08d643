//! On-demand tokenizer.
//!
//! `get_word` advances to the next token; the accessors expose it. The lexer
//! never fails outright: anything unrecognizable is reported through the
//! `Reporter` and surfaces as a `Null` sentinel token, so the parser's
//! recovery loops always have something to skip past. `prev_row`/`prev_col`
//! track where the previous accepted token ended, which is where "missing X"
//! diagnostics want to point.

use crate::diagnostics::{DiagKind, Reporter};
use crate::source::SourceFile;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a SourceFile,
    pos: usize,
    row: u32,
    col: u32,
    prev_row: u32,
    prev_col: u32,
    kind: TokenKind,
    lexeme: String,
    tok_row: u32,
    tok_col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a SourceFile) -> Lexer<'a> {
        Lexer {
            src,
            pos: 0,
            row: 1,
            col: 0,
            prev_row: 1,
            prev_col: 0,
            kind: TokenKind::Null,
            lexeme: String::new(),
            tok_row: 1,
            tok_col: 1,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Start position of the current token.
    pub fn row(&self) -> u32 {
        self.tok_row
    }

    pub fn col(&self) -> u32 {
        self.tok_col
    }

    /// End position of the token accepted before the current one.
    pub fn prev_row(&self) -> u32 {
        self.prev_row
    }

    pub fn prev_col(&self) -> u32 {
        self.prev_col
    }

    /// Current token as an owned value (token dump mode).
    pub fn token(&self) -> Token {
        Token {
            kind: self.kind,
            lexeme: self.lexeme.clone(),
            row: self.tok_row,
            col: self.tok_col,
        }
    }

    fn peek(&self) -> char {
        self.src.char_at(self.pos)
    }

    fn peek2(&self) -> char {
        self.src.char_at(self.pos + 1)
    }

    fn advance(&mut self) -> char {
        let c = self.src.char_at(self.pos);
        self.pos += 1;
        if c == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\n') {
            self.advance();
        }
    }

    /// Advance to the next token, reporting lexical errors along the way.
    pub fn get_word(&mut self, diags: &mut Reporter) {
        self.prev_row = self.row;
        self.prev_col = self.col;
        self.skip_whitespace();

        self.lexeme.clear();
        self.tok_row = self.row;
        self.tok_col = self.col + 1;

        let c = self.peek();
        if c == '\0' {
            self.kind = TokenKind::Eof;
            self.lexeme.push('\0');
            return;
        }

        if c.is_ascii_alphabetic() {
            self.read_word();
            return;
        }
        if c.is_ascii_digit() {
            self.read_number(diags);
            return;
        }

        self.advance();
        self.lexeme.push(c);
        self.kind = match c {
            '=' => TokenKind::Eql,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '*' => {
                if self.peek() == '*' {
                    self.advance();
                    self.lexeme.push('*');
                    diags.report(
                        DiagKind::IllegalWord(self.lexeme.clone()),
                        self.tok_row,
                        self.tok_col,
                    );
                    TokenKind::Null
                } else {
                    TokenKind::Star
                }
            }
            '<' => match self.peek() {
                '=' => {
                    self.advance();
                    self.lexeme.push('=');
                    TokenKind::Leq
                }
                '>' => {
                    self.advance();
                    self.lexeme.push('>');
                    TokenKind::Neq
                }
                _ => TokenKind::Lss,
            },
            '>' => {
                if self.peek() == '=' {
                    self.advance();
                    self.lexeme.push('=');
                    TokenKind::Geq
                } else {
                    TokenKind::Grt
                }
            }
            ':' => {
                if self.peek() == '=' {
                    self.advance();
                    self.lexeme.push('=');
                    TokenKind::Assign
                } else {
                    diags.report(DiagKind::Missing("'='".into()), self.tok_row, self.tok_col);
                    TokenKind::Null
                }
            }
            other => {
                diags.report(
                    DiagKind::IllegalWord(other.to_string()),
                    self.tok_row,
                    self.tok_col,
                );
                TokenKind::Null
            }
        };
    }

    fn read_word(&mut self) {
        while self.peek().is_ascii_alphanumeric() {
            let c = self.advance();
            self.lexeme.push(c);
        }
        self.kind = match self.lexeme.as_str() {
            "odd" => TokenKind::Odd,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "call" => TokenKind::Call,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "procedure" => TokenKind::Procedure,
            "write" => TokenKind::Write,
            "read" => TokenKind::Read,
            "program" => TokenKind::Program,
            _ => TokenKind::Ident,
        };
    }

    fn read_number(&mut self, diags: &mut Reporter) {
        while self.peek().is_ascii_digit() {
            let c = self.advance();
            self.lexeme.push(c);
        }
        if self.peek().is_ascii_alphabetic() {
            // A letter hard against digits is not a number and not an
            // identifier. Swallow the whole run and resynchronize.
            while self.peek().is_ascii_alphanumeric() {
                let c = self.advance();
                self.lexeme.push(c);
            }
            diags.report(
                DiagKind::IllegalWord(self.lexeme.clone()),
                self.tok_row,
                self.tok_col,
            );
            self.kind = TokenKind::Null;
            return;
        }
        self.kind = TokenKind::Number;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(text: &str) -> (Vec<Token>, Reporter) {
        let src = SourceFile::from_text("t", text);
        let mut diags = Reporter::new();
        let mut lexer = Lexer::new(&src);
        let mut out = Vec::new();
        loop {
            lexer.get_word(&mut diags);
            if lexer.kind() == TokenKind::Eof {
                break;
            }
            out.push(lexer.token());
            assert!(out.len() < 10_000, "lexer failed to make progress");
        }
        (out, diags)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_idents_and_numbers() {
        let (tokens, diags) = lex_all("program demo; var x1;\nbegin x1 := 42 end");
        assert_eq!(diags.error_count(), 0);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Program,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Var,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Begin,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::End,
            ]
        );
        assert_eq!(tokens[1].lexeme, "demo");
        assert_eq!(tokens[9].lexeme, "42");
    }

    #[test]
    fn multi_char_operators() {
        let (tokens, diags) = lex_all("a <= b >= c <> d < e > f = g := h");
        assert_eq!(diags.error_count(), 0);
        let ops: Vec<TokenKind> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Ident)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::Leq,
                TokenKind::Geq,
                TokenKind::Neq,
                TokenKind::Lss,
                TokenKind::Grt,
                TokenKind::Eql,
                TokenKind::Assign,
            ]
        );
    }

    #[test]
    fn rows_and_cols_are_one_based() {
        let (tokens, _) = lex_all("ab\n  cd");
        assert_eq!((tokens[0].row, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].row, tokens[1].col), (2, 3));
    }

    #[test]
    fn prev_position_tracks_previous_token_end() {
        let src = SourceFile::from_text("t", "ab cd");
        let mut diags = Reporter::new();
        let mut lexer = Lexer::new(&src);
        lexer.get_word(&mut diags);
        assert_eq!(lexer.lexeme(), "ab");
        lexer.get_word(&mut diags);
        assert_eq!(lexer.lexeme(), "cd");
        // "ab" ends at row 1, col 2
        assert_eq!((lexer.prev_row(), lexer.prev_col()), (1, 2));
    }

    #[test]
    fn digit_then_letter_is_an_illegal_word() {
        let (tokens, diags) = lex_all("x := 12abc ;");
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            &diags.diagnostics()[0].kind,
            DiagKind::IllegalWord(w) if w == "12abc"
        ));
        // the sentinel token re-synchronizes at ';'
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Null,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn bare_colon_reports_missing_equals() {
        let (tokens, diags) = lex_all("x : 1");
        assert_eq!(diags.error_count(), 1);
        assert!(matches!(
            &diags.diagnostics()[0].kind,
            DiagKind::Missing(w) if w == "'='"
        ));
        assert_eq!(tokens[1].kind, TokenKind::Null);
    }

    #[test]
    fn double_star_is_rejected() {
        let (tokens, diags) = lex_all("a ** b");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(tokens[1].kind, TokenKind::Null);
        assert_eq!(tokens[1].lexeme, "**");
    }

    #[test]
    fn whitespace_changes_positions_but_not_tokens() {
        let (a, _) = lex_all("begin x:=1; write(x) end");
        let (b, _) = lex_all("begin\n\tx := 1 ;\n\twrite ( x )\nend");
        assert_eq!(kinds(&a), kinds(&b));
        let lexemes_a: Vec<&str> = a.iter().map(|t| t.lexeme.as_str()).collect();
        let lexemes_b: Vec<&str> = b.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes_a, lexemes_b);
    }

    #[test]
    fn eof_token_has_nul_lexeme() {
        let src = SourceFile::from_text("t", "  ");
        let mut diags = Reporter::new();
        let mut lexer = Lexer::new(&src);
        lexer.get_word(&mut diags);
        assert_eq!(lexer.kind(), TokenKind::Eof);
        assert_eq!(lexer.lexeme(), "\0");
        // stable on repeated calls
        lexer.get_word(&mut diags);
        assert_eq!(lexer.kind(), TokenKind::Eof);
    }
}
