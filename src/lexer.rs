use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    String,
    Symbol,
    /// `:name`, marks a jump target.
    Label,
    /// `@name`, moves execution to the matching label.
    Jump,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Label => "label",
            TokenKind::Jump => "jump",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = if let Some((idx, ch)) = self.peeked.take() {
            Some((idx, ch))
        } else {
            self.chars.next()
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
            Some((idx, ch))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn collect_while<F>(&mut self, start: usize, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut end = self.current;
        while let Some((idx, ch)) = self.peek() {
            if predicate(ch) {
                self.bump();
                end = idx + ch.len_utf8();
            } else {
                break;
            }
        }
        self.source[start..end].to_string()
    }

    fn skip_comment(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn symbol(&mut self, start: usize) -> Token {
        let lexeme = self.collect_while(start, is_word_char);
        Token {
            kind: TokenKind::Symbol,
            lexeme,
            span: SourceSpan::new(start, self.current),
        }
    }

    fn number_literal(&mut self, start: usize) -> Token {
        let lexeme = self.collect_while(start, |ch| ch.is_ascii_digit() || ch == '.');
        Token {
            kind: TokenKind::Number,
            lexeme,
            span: SourceSpan::new(start, self.current),
        }
    }

    /// Reads the name following a `:` or `@` sigil.
    fn marker(&mut self, start: usize, kind: TokenKind) -> Result<Token, Diagnostic> {
        let name_start = self.current;
        let name = self.collect_while(name_start, is_word_char);
        let span = SourceSpan::new(start, self.current);
        if name.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticKind::Lexer,
                format!("expected a name after `{}`", &self.source[start..start + 1]),
            )
            .with_span(span));
        }
        Ok(Token {
            kind,
            lexeme: name,
            span,
        })
    }

    fn string_literal(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let mut end = self.current;
        let mut value = String::new();
        while let Some((idx, ch)) = self.bump() {
            end = idx + ch.len_utf8();
            match ch {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::String,
                        lexeme: value,
                        span: SourceSpan { start, end },
                    });
                }
                '\\' => {
                    if let Some((_, esc)) = self.bump() {
                        end = idx + 1 + esc.len_utf8();
                        match esc {
                            'n' => value.push('\n'),
                            '"' => value.push('"'),
                            '\\' => value.push('\\'),
                            other => {
                                return Err(Diagnostic::new(
                                    DiagnosticKind::Lexer,
                                    format!("unexpected escaped character `{other}`"),
                                )
                                .with_span(SourceSpan::new(idx, end)));
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => value.push(ch),
            }
        }
        Err(
            Diagnostic::new(DiagnosticKind::Lexer, "unterminated string literal")
                .with_span(SourceSpan { start, end }),
        )
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        if self.source.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticKind::EmptySource,
                "cannot lex a zero-length source",
            ));
        }
        let mut tokens = Vec::new();
        while let Some((start, ch)) = self.bump() {
            let token = match ch {
                ch if ch.is_whitespace() => continue,
                '#' => {
                    self.skip_comment();
                    continue;
                }
                'a'..='z' | 'A'..='Z' | '_' => self.symbol(start),
                '0'..='9' | '.' | '-' => self.number_literal(start),
                ':' => self.marker(start, TokenKind::Label)?,
                '@' => self.marker(start, TokenKind::Jump)?,
                '"' => self.string_literal(start)?,
                other => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::Lexer,
                        format!("unexpected character `{other}`"),
                    )
                    .with_span(SourceSpan::new(start, self.current)));
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source).tokenize()
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
