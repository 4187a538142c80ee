//! `FUNCTION_CALL:` parsing
//!
//! The planning model answers with lines such as
//!
//! ```text
//! FUNCTION_CALL: get_coin_price(vs_currency="usd", coin_id="bitcoin")
//! ```
//!
//! This module extracts those lines and parses each one into a function
//! name plus a list of literal arguments. Nothing the model writes is ever
//! evaluated; only string, number, boolean and null literals are accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AgentError, Result};

/// Marker preceding every call line
pub const CALL_MARKER: &str = "FUNCTION_CALL:";

/// One argument: positional when `name` is `None`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: Value,
}

/// A syntactically valid call, not yet bound to a tool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedCall {
    pub name: String,
    pub args: Vec<CallArg>,
}

/// Collect the call expressions following each `FUNCTION_CALL:` marker.
pub fn extract_calls(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once(CALL_MARKER)?;
            let expr = rest.trim().trim_matches('`').trim();
            (!expr.is_empty()).then(|| expr.to_string())
        })
        .collect()
}

/// Parse `name(arg, key=value, ...)`.
pub fn parse_call(src: &str) -> Result<ParsedCall> {
    let mut parser = Parser::new(src);
    parser.skip_ws();
    let name = parser.identifier()?;
    parser.skip_ws();
    parser.expect('(')?;

    let mut args = Vec::new();
    loop {
        parser.skip_ws();
        if parser.eat(')') {
            break;
        }
        args.push(parser.argument()?);
        parser.skip_ws();
        if parser.eat(')') {
            break;
        }
        parser.expect(',')?;
    }

    parser.skip_ws();
    parser.eat(';');
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(&format!("unexpected trailing '{c}'")));
    }

    Ok(ParsedCall { name, args })
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, msg: &str) -> AgentError {
        AgentError::Parse(format!("{msg} at position {} in `{}`", self.pos, self.src))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            self.pos = start;
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn argument(&mut self) -> Result<CallArg> {
        // `key=value` when an identifier is directly followed by '='
        let start = self.pos;
        if let Ok(ident) = self.identifier() {
            self.skip_ws();
            if self.peek() == Some('=') {
                self.pos += 1;
                self.skip_ws();
                let value = self.literal()?;
                return Ok(CallArg {
                    name: Some(ident),
                    value,
                });
            }
        }
        self.pos = start;
        Ok(CallArg {
            name: None,
            value: self.literal()?,
        })
    }

    fn literal(&mut self) -> Result<Value> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.string(q).map(Value::String)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(_) => {
                let word = self.identifier()?;
                match word.as_str() {
                    "true" | "True" => Ok(Value::Bool(true)),
                    "false" | "False" => Ok(Value::Bool(false)),
                    "None" | "null" => Ok(Value::Null),
                    _ => Err(AgentError::Parse(format!(
                        "`{word}` is not a literal in `{}`",
                        self.src
                    ))),
                }
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();
        let raw = raw.trim_start_matches('+');

        if let Ok(int) = raw.parse::<i64>() {
            return Ok(Value::from(int));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(&format!("invalid number `{raw}`")))
    }
}
