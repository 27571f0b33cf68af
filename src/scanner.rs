use std::iter::Peekable;
use std::str::{from_utf8, Chars};

use thiserror::Error;

use crate::token::{Literal, Token, TokenType};

/// public interface for tokenizing.
/// Lexical errors never abort the scan: everything that could be tokenized
/// comes back in the first slot, the accumulated diagnostics in the second,
/// and the token list always ends with a single EOF token.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<ScanningError>) {
    let mut scanner = Scanner::new(source);
    scanner.scan_tokens();
    (scanner.tokens, scanner.errors)
}

struct Scanner<'a> {
    source: &'a str,
    char_iter: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    errors: Vec<ScanningError>,

    // byte position of the start of the lexeme being recognized
    current_lexeme_start: usize,
    // line that lexeme started on; `line` can move past it while scanning a
    // multi-line string, and the token reports where it started
    current_lexeme_line: usize,
    current: usize,
    line: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScanningError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize },
}

impl ScanningError {
    pub fn line(&self) -> usize {
        match self {
            ScanningError::UnexpectedCharacter { line, .. }
            | ScanningError::UnterminatedString { line } => *line,
        }
    }
}

impl Scanner<'_> {
    fn new(source: &str) -> Scanner {
        Scanner {
            source,
            char_iter: source.chars().peekable(),
            tokens: vec![],
            errors: vec![],
            current_lexeme_start: 0,
            current_lexeme_line: 1,
            current: 0,
            line: 1,
        }
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            if let Err(scanning_error) = self.scan_token() {
                self.errors.push(scanning_error);
            }
        }
        self.tokens.push(Token {
            r#type: TokenType::EOF,
            lexeme: "".to_string(),
            literal: None,
            line: self.line,
        });
    }

    fn scan_token(&mut self) -> Result<(), ScanningError> {
        // set start of lexeme
        self.current_lexeme_start = self.current;
        self.current_lexeme_line = self.line;
        let c: char = self.advance();
        let maybe_token_type = match c {
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            '-' => Some(TokenType::Minus),
            '+' => Some(TokenType::Plus),
            ';' => Some(TokenType::Semicolon),
            '*' => Some(TokenType::Star),
            '!' => match self.match_one('=') {
                true => Some(TokenType::BangEqual),
                false => Some(TokenType::Bang),
            },
            '=' => match self.match_one('=') {
                true => Some(TokenType::EqualEqual),
                false => Some(TokenType::Equal),
            },
            '<' => match self.match_one('=') {
                true => Some(TokenType::LessEqual),
                false => Some(TokenType::Less),
            },
            '>' => match self.match_one('=') {
                true => Some(TokenType::GreaterEqual),
                false => Some(TokenType::Greater),
            },
            '/' => {
                if self.match_one('/') {
                    // line comment, runs to end of line (exclusive) or end
                    // of input
                    while self.peek_one() != Some(&'\n') && self.peek_one() != None {
                        self.advance();
                    }
                    None
                } else if self.match_one('*') {
                    self.consume_block_comment();
                    None
                } else {
                    Some(TokenType::Slash)
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => Some(self.consume_if_match_string()?),
            c if is_digit(&c) => Some(self.consume_if_match_number()),
            c if is_alpha(&c) => Some(self.consume_if_match_identifier()),
            _ => {
                return Err(ScanningError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                });
            }
        };

        if let Some(token_type) = maybe_token_type {
            self.add_token(token_type);
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn match_one(&mut self, expected: char) -> bool {
        if self.peek_one() != Some(&expected) {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) -> char {
        // only called when the dispatch loop or a lookahead said there is a
        // character left, hence the unwrap
        let current_char = self.char_iter.next().unwrap();
        self.current += current_char.len_utf8();
        current_char
    }

    fn add_token(&mut self, token_type: TokenType) {
        // slicing by byte offsets; `current` only ever lands on char
        // boundaries since it is advanced by len_utf8
        let text: String = self.source[self.current_lexeme_start..self.current].to_string();
        let literal = match token_type {
            // both quotes are one byte so stripping them keeps boundaries
            TokenType::String => Some(Literal::String(text[1..text.len() - 1].to_string())),
            TokenType::Number => Some(Literal::Number(
                text.parse().expect("number lexeme is valid f64 text"),
            )),
            _ => None,
        };
        self.tokens.push(Token {
            r#type: token_type,
            lexeme: text,
            literal,
            line: self.current_lexeme_line,
        });
    }

    /// like advance but does not consume the character. 1 lookahead.
    fn peek_one(&mut self) -> Option<&char> {
        self.char_iter.peek()
    }

    /// 2 lookahead. The iterator only peeks one ahead so this goes back to
    /// the source text, decoding from the current byte offset.
    fn peek_two(&self) -> Option<char> {
        from_utf8(&self.source.as_bytes()[self.current..])
            .expect("current is a char boundary")
            .chars()
            .nth(1)
    }

    fn consume_if_match_string(&mut self) -> Result<TokenType, ScanningError> {
        while self.peek_one() != None && self.peek_one() != Some(&'"') {
            if self.peek_one() == Some(&'\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.peek_one() == None {
            return Err(ScanningError::UnterminatedString { line: self.line });
        }

        // consume closing quote
        self.advance();

        Ok(TokenType::String)
    }

    fn consume_if_match_number(&mut self) -> TokenType {
        while self.peek_one().is_some_and(is_digit) {
            self.advance();
        }

        // a '.' only belongs to the number if a digit follows it, so "1."
        // stops before the dot
        if self.peek_one() == Some(&'.') && self.peek_two().is_some_and(|c| is_digit(&c)) {
            // consume the '.'
            self.advance();

            while self.peek_one().is_some_and(is_digit) {
                self.advance();
            }
        }

        TokenType::Number
    }

    fn consume_if_match_identifier(&mut self) -> TokenType {
        while self.peek_one().is_some_and(is_alphanumeric) {
            self.advance();
        }

        let lexeme = &self.source[self.current_lexeme_start..self.current];

        match match_keyword(lexeme) {
            Some(keyword_token) => keyword_token,
            _ => TokenType::Identifier,
        }
    }

    /// Non-nesting: the first `*/` closes the comment. The pair is checked
    /// at adjacent positions on every iteration, so a lone `*` (as in
    /// `/* * a */`) just advances the scan. Running out of input before the
    /// terminator consumes the rest silently.
    fn consume_block_comment(&mut self) {
        while let Some(&c) = self.peek_one() {
            if c == '*' && self.peek_two() == Some('/') {
                // consume '*' and '/'
                self.advance();
                self.advance();
                return;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }
    }
}

fn match_keyword(input: &str) -> Option<TokenType> {
    // the fifteen reserved spellings, case-sensitive
    match input {
        "and" => Some(TokenType::And),
        "class" => Some(TokenType::Class),
        "else" => Some(TokenType::Else),
        "false" => Some(TokenType::False),
        "fun" => Some(TokenType::Fun),
        "for" => Some(TokenType::For),
        "if" => Some(TokenType::If),
        "nil" => Some(TokenType::Nil),
        "or" => Some(TokenType::Or),
        "print" => Some(TokenType::Print),
        "return" => Some(TokenType::Return),
        "super" => Some(TokenType::Super),
        "this" => Some(TokenType::This),
        "var" => Some(TokenType::Var),
        "while" => Some(TokenType::While),
        _ => None,
    }
}

fn is_digit(c: &char) -> bool {
    matches!(*c, '0'..='9')
}

fn is_alpha(c: &char) -> bool {
    matches!(*c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_alphanumeric(c: &char) -> bool {
    is_digit(c) || is_alpha(c)
}
