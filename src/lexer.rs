use crate::keywords;
use crate::token::{Token, TokenKind};

/// Hand-written scanner. Total by construction: it never reports an
/// error, and anything it does not recognize is skipped.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

const SYMBOLS: &str = ".,/?!;";

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.pos < self.chars.len() {
            self.skip_whitespace();
            if self.pos >= self.chars.len() {
                break;
            }

            let ch = self.chars[self.pos];
            if ch == '/' && matches!(self.peek(1), Some('/') | Some('*')) {
                self.skip_comment();
            } else if ch.is_ascii_digit() {
                tokens.push(self.read_number());
            } else if ch == '"' {
                tokens.push(self.read_string());
            } else if ch.is_alphabetic() || ch == '_' {
                tokens.push(self.read_identifier());
            } else if SYMBOLS.contains(ch) {
                tokens.push(Token::new(
                    TokenKind::Symbol,
                    ch.to_string(),
                    self.line,
                    self.col,
                ));
                self.bump();
            } else {
                // Unrecognized punctuation is dropped, not reported.
                self.bump();
            }
        }
        tokens.push(Token::new(TokenKind::EndOfInput, "", self.line, self.col));
        tokens
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if let Some(&ch) = self.chars.get(self.pos) {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .chars
            .get(self.pos)
            .is_some_and(|ch| ch.is_whitespace())
        {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        if self.peek(1) == Some('/') {
            while self.chars.get(self.pos).is_some_and(|&ch| ch != '\n') {
                self.bump();
            }
        } else {
            // Block comment. An unterminated one runs to end of input.
            self.bump();
            self.bump();
            while self.pos < self.chars.len() {
                if self.chars[self.pos] == '*' && self.peek(1) == Some('/') {
                    self.bump();
                    self.bump();
                    break;
                }
                self.bump();
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut lexeme = String::new();
        let mut has_dot = false;
        while let Some(&ch) = self.chars.get(self.pos) {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
            } else if ch == '.' && !has_dot {
                // A second dot ends the literal and is left for the next token.
                has_dot = true;
                lexeme.push(ch);
            } else {
                break;
            }
            self.bump();
        }
        Token::new(TokenKind::Number, lexeme, line, col)
    }

    fn read_string(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut lexeme = String::new();
        self.bump(); // opening quote
        while let Some(&ch) = self.chars.get(self.pos) {
            if ch == '"' {
                self.bump();
                break;
            }
            if ch == '\\' && self.peek(1).is_some() {
                // Generic escape: keep both characters verbatim.
                lexeme.push(ch);
                self.bump();
                lexeme.push(self.chars[self.pos]);
                self.bump();
            } else {
                lexeme.push(ch);
                self.bump();
            }
        }
        // An unterminated string has silently consumed the rest of the input.
        Token::new(TokenKind::String, lexeme, line, col)
    }

    fn read_identifier(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut lexeme = String::new();
        while self
            .chars
            .get(self.pos)
            .is_some_and(|ch| ch.is_alphanumeric() || *ch == '_')
        {
            lexeme.push(self.chars[self.pos]);
            self.bump();
        }
        let kind = if keywords::is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, line, col)
    }
}
