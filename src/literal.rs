//! A deliberately small literal parser for hand-edited env values.
//!
//! Accepts booleans, base-10 integers, single- or double-quoted strings, and
//! bracketed (`[...]`) or parenthesised (`(...)`) sequences of those. Anything
//! else is rejected; there is no expression evaluation.

use thiserror::Error;

const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Literal>),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a literal at offset {offset}: {reason}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Parse `text` as a single literal. Surrounding whitespace is ignored;
/// trailing content is an error.
pub fn parse_literal(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        chars: text.char_indices().collect(),
        pos: 0,
        depth: 0,
    };
    let lit = parser.literal()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(lit)
}

/// Quote a string the way lists are written back to env files.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or_else(|| self.chars.last().map(|(i, c)| i + c.len_utf8()).unwrap_or(0))
    }

    fn error(&self, reason: &'static str) -> LiteralError {
        LiteralError {
            offset: self.offset(),
            reason,
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn literal(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("empty input")),
            Some('\'') | Some('"') => self.string(),
            Some('[') => self.sequence(']'),
            Some('(') => self.sequence(')'),
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.integer(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn string(&mut self) -> Result<Literal, LiteralError> {
        let Some(quote) = self.peek() else {
            return Err(self.error("expected a quote"));
        };
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Literal::Str(out));
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some(c @ ('\\' | '\'' | '"')) => c,
                        _ => return Err(self.error("unsupported escape")),
                    };
                    out.push(escaped);
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn sequence(&mut self, close: char) -> Result<Literal, LiteralError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let items = self.sequence_items(close);
        self.depth -= 1;
        items.map(Literal::List)
    }

    fn sequence_items(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.literal()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {}
                None => return Err(self.error("unterminated sequence")),
                Some(_) => return Err(self.error("expected ',' or end of sequence")),
            }
        }
    }

    fn integer(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        // `0x10`, `1.5`, `12abc` are all rejected here
        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '.') {
            return Err(self.error("not a base-10 integer"));
        }
        let digits: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
        digits
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| LiteralError {
                offset: self.chars[start].0,
                reason: "integer out of range",
            })
    }

    fn word(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
        match word.as_str() {
            "True" | "true" => Ok(Literal::Bool(true)),
            "False" | "false" => Ok(Literal::Bool(false)),
            _ => Err(LiteralError {
                offset: self.chars[start].0,
                reason: "bare words are not literals",
            }),
        }
    }
}
