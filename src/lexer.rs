//! Lexical analysis (§4.1).
//!
//! Tokenizes Lambdatron source text into a flat token stream. Runs in three
//! states — Normal, InString, InComment — though the state machine is
//! expressed here as a sequence of `try_*` scanners rather than an explicit
//! state enum, since each scanner is only ever entered from Normal.

use crate::ast::Span;
use crate::error::ReadError;
use crate::value::SpecialForm;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single lexical token together with its source span.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// The category of a lexical token (§4.1).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    Backtick,
    Tilde,
    TildeAt,
    At,
    /// `#(` — opens an anonymous-function literal (§4.2, §4.3).
    HashParen,
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Keyword(String),
    Ident(String),
    Special(SpecialForm),
}

/// Scans `source` into a complete token stream, or the first lex error
/// encountered.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ReadError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token()? {
            Some(tok) => tokens.push(tok),
            None => break,
        }
    }
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    remaining: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            remaining: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self, bytes: usize) {
        let consumed = &self.remaining[..bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += bytes;
        self.remaining = &self.source[self.position..];
    }

    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.remaining.chars().nth(1)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let before = self.position;
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() || ch == ',' {
                    // Commas are whitespace in Clojure-like readers.
                    self.advance(ch.len_utf8());
                } else {
                    break;
                }
            }
            if self.peek() == Some(';') {
                while let Some(ch) = self.peek() {
                    self.advance(ch.len_utf8());
                    if ch == '\n' {
                        break;
                    }
                }
            }
            if self.position == before {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ReadError> {
        self.skip_whitespace_and_comments();
        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let ch = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let span = |this: &Self| Span::new(start_pos, this.position, start_line, start_col);

        match ch {
            '(' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::LParen, span(self))))
            }
            ')' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::RParen, span(self))))
            }
            '[' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::LBracket, span(self))))
            }
            ']' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::RBracket, span(self))))
            }
            '{' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::LBrace, span(self))))
            }
            '}' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::RBrace, span(self))))
            }
            '\'' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::Quote, span(self))))
            }
            '`' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::Backtick, span(self))))
            }
            '~' => {
                if self.peek2() == Some('@') {
                    self.advance(2);
                    Ok(Some(Token::new(TokenKind::TildeAt, span(self))))
                } else {
                    self.advance(1);
                    Ok(Some(Token::new(TokenKind::Tilde, span(self))))
                }
            }
            '@' => {
                self.advance(1);
                Ok(Some(Token::new(TokenKind::At, span(self))))
            }
            '#' => {
                if self.peek2() == Some('(') {
                    self.advance(2);
                    Ok(Some(Token::new(TokenKind::HashParen, span(self))))
                } else {
                    self.advance(1);
                    Err(ReadError::UnexpectedChar {
                        ch: '#',
                        span: span(self),
                    })
                }
            }
            '"' => self.scan_string(start_pos, start_line, start_col),
            '\\' => self.scan_char(start_pos, start_line, start_col),
            _ => self.scan_atom(start_pos, start_line, start_col),
        }
    }

    fn scan_string(
        &mut self,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Result<Option<Token>, ReadError> {
        self.advance(1); // opening quote
        let mut content = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ReadError::NonTerminatedString {
                        span: Span::new(start_pos, self.position, start_line, start_col),
                    })
                }
                Some('"') => {
                    self.advance(1);
                    return Ok(Some(Token::new(
                        TokenKind::Str(content),
                        Span::new(start_pos, self.position, start_line, start_col),
                    )));
                }
                Some('\\') => {
                    let escape_start = Span::new(self.position, self.position + 1, self.line, self.column);
                    self.advance(1);
                    match self.peek() {
                        Some('n') => {
                            content.push('\n');
                            self.advance(1);
                        }
                        Some('t') => {
                            content.push('\t');
                            self.advance(1);
                        }
                        Some('r') => {
                            content.push('\r');
                            self.advance(1);
                        }
                        Some('"') => {
                            content.push('"');
                            self.advance(1);
                        }
                        Some('\\') => {
                            content.push('\\');
                            self.advance(1);
                        }
                        Some(other) => {
                            return Err(ReadError::InvalidEscape {
                                ch: other,
                                span: escape_start,
                            })
                        }
                        None => {
                            return Err(ReadError::NonTerminatedString {
                                span: Span::new(start_pos, self.position, start_line, start_col),
                            })
                        }
                    }
                }
                Some(ch) => {
                    content.push(ch);
                    self.advance(ch.len_utf8());
                }
            }
        }
    }

    fn scan_char(
        &mut self,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Result<Option<Token>, ReadError> {
        self.advance(1); // backslash
        let mut name = String::new();
        // First character is always part of the literal, even if it's
        // itself a delimiter (e.g. `\(`).
        if let Some(ch) = self.peek() {
            name.push(ch);
            self.advance(ch.len_utf8());
        }
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() {
                name.push(ch);
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
        let span = Span::new(start_pos, self.position, start_line, start_col);
        let resolved = match name.as_str() {
            "newline" => '\n',
            "space" => ' ',
            "tab" => '\t',
            "return" => '\r',
            "backspace" => '\u{8}',
            "formfeed" => '\u{c}',
            _ if name.chars().count() == 1 => name.chars().next().unwrap(),
            _ => {
                return Err(ReadError::InvalidCharLiteral {
                    text: name,
                    span,
                })
            }
        };
        Ok(Some(Token::new(TokenKind::Char(resolved), span)))
    }

    fn scan_atom(
        &mut self,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Result<Option<Token>, ReadError> {
        let mut lexeme = String::new();
        while let Some(ch) = self.peek() {
            if is_atom_char(ch) {
                lexeme.push(ch);
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
        let span = Span::new(start_pos, self.position, start_line, start_col);
        if lexeme.is_empty() {
            let ch = self.peek().unwrap();
            self.advance(ch.len_utf8());
            return Err(ReadError::UnexpectedChar {
                ch,
                span: Span::new(start_pos, self.position, start_line, start_col),
            });
        }
        Ok(Some(Token::new(classify(&lexeme), span)))
    }
}

fn is_atom_char(ch: char) -> bool {
    ch.is_alphanumeric()
        || matches!(
            ch,
            '-' | '_' | '*' | '+' | '!' | '?' | '/' | '.' | '$' | '=' | '<' | '>' | '&' | ':' | '%' | '#'
        )
}

/// Classifies a scanned atom lexeme per §4.1's phase-2 rules.
fn classify(lexeme: &str) -> TokenKind {
    if let Some(tag) = SpecialForm::from_name(lexeme) {
        return TokenKind::Special(tag);
    }
    if lexeme.starts_with(':') && lexeme.len() >= 2 {
        return TokenKind::Keyword(lexeme[1..].to_string());
    }
    match lexeme {
        "nil" => return TokenKind::Nil,
        "true" => return TokenKind::Bool(true),
        "false" => return TokenKind::Bool(false),
        _ => {}
    }
    if let Some(num) = parse_number(lexeme) {
        return num;
    }
    TokenKind::Ident(lexeme.to_string())
}

/// Number parsing (§4.8): prefer a signed integer; fall back to a double on
/// overflow, a decimal point, or an exponent.
fn parse_number(lexeme: &str) -> Option<TokenKind> {
    let mut chars = lexeme.chars();
    let first = chars.next()?;
    let rest_starts_digit = lexeme
        .chars()
        .nth(1)
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false);
    if !(first.is_ascii_digit() || ((first == '-' || first == '+') && rest_starts_digit)) {
        return None;
    }
    let looks_float = lexeme.contains('.') || lexeme.contains(['e', 'E']);
    if !looks_float {
        if let Ok(i) = lexeme.parse::<i64>() {
            return Some(TokenKind::Int(i));
        }
    }
    lexeme.parse::<f64>().ok().map(TokenKind::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_delimiters() {
        assert_eq!(
            kinds("( ) [ ] { }"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn lexes_reader_macros() {
        assert_eq!(
            kinds("' ` ~ ~@ @ #("),
            vec![
                TokenKind::Quote,
                TokenKind::Backtick,
                TokenKind::Tilde,
                TokenKind::TildeAt,
                TokenKind::At,
                TokenKind::HashParen,
            ]
        );
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Int(42)]);
        assert_eq!(kinds("-7"), vec![TokenKind::Int(-7)]);
        assert_eq!(kinds("3.5"), vec![TokenKind::Float(3.5)]);
        assert_eq!(kinds("1e10"), vec![TokenKind::Float(1e10)]);
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::Str("a\nb".to_string())]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize(r#""abc"#).is_err());
    }

    #[test]
    fn invalid_escape_is_an_error() {
        assert!(tokenize(r#""a\zb""#).is_err());
    }

    #[test]
    fn lexes_named_char_literals() {
        assert_eq!(kinds(r"\newline"), vec![TokenKind::Char('\n')]);
        assert_eq!(kinds(r"\a"), vec![TokenKind::Char('a')]);
        assert_eq!(kinds(r"\space"), vec![TokenKind::Char(' ')]);
    }

    #[test]
    fn lexes_keywords_and_nil_true_false() {
        assert_eq!(
            kinds(":foo nil true false"),
            vec![
                TokenKind::Keyword("foo".to_string()),
                TokenKind::Nil,
                TokenKind::Bool(true),
                TokenKind::Bool(false),
            ]
        );
    }

    #[test]
    fn lexes_special_forms_and_identifiers() {
        assert_eq!(kinds("if"), vec![TokenKind::Special(SpecialForm::If)]);
        assert_eq!(
            kinds("my-fn?"),
            vec![TokenKind::Ident("my-fn?".to_string())]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("1 ; comment\n2"),
            vec![TokenKind::Int(1), TokenKind::Int(2)]
        );
    }

    #[test]
    fn commas_are_whitespace() {
        assert_eq!(
            kinds("1, 2,3"),
            vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Int(3)]
        );
    }
}
