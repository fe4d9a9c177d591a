//! Parser for the relaxed JSON / JavaScript literal syntax typed at the shell prompt.
//!
//! Accepts everything JSON does plus bare and single quoted keys, single quoted strings,
//! trailing commas, `undefined` and the constructor calls shells commonly print, such as
//! `ObjectId("...")`, `ISODate("...")` and `NumberLong(...)`.

use crate::value::{Document, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Error produced when argument text cannot be parsed
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

pub type Result<T, E = ParseError> = core::result::Result<T, E>;

/// Parse a single literal value; the whole text must be consumed.
///
/// # Errors
/// * If the text is not a valid literal
pub fn parse(text: &str) -> Result<Value> {
    let mut parser = Parser::new(text);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

/// Parse an object literal; blank text is an empty document.
///
/// # Errors
/// * If the text is not a valid object literal
pub fn parse_document(text: &str) -> Result<Document> {
    if text.trim().is_empty() {
        return Ok(Document::new());
    }
    match parse(text)? {
        Value::Map(document) => Ok(document),
        _ => Err(ParseError {
            message: "expected an object".to_string(),
            position: 0,
        }),
    }
}

/// Parse an array literal; blank text is an empty array.
///
/// # Errors
/// * If the text is not a valid array literal
pub fn parse_array(text: &str) -> Result<Vec<Value>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match parse(text)? {
        Value::Array(values) => Ok(values),
        _ => Err(ParseError {
            message: "expected an array".to_string(),
            position: 0,
        }),
    }
}

/// Parse an aggregation pipeline: an array of stage objects, or a single stage object.
///
/// # Errors
/// * If the text is not an object or an array of objects
pub fn parse_pipeline(text: &str) -> Result<Vec<Document>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match parse(text)? {
        Value::Map(stage) => Ok(vec![stage]),
        Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Map(stage) => Ok(stage),
                _ => Err(ParseError {
                    message: format!("pipeline stage {index} is not an object"),
                    position: 0,
                }),
            })
            .collect(),
        _ => Err(ParseError {
            message: "expected a pipeline array".to_string(),
            position: 0,
        }),
    }
}

/// Split text on whitespace that is outside quotes and outside `{}`, `[]` and `()` nesting.
#[must_use]
pub fn split_arguments(text: &str) -> Vec<String> {
    split_top_level(text, char::is_whitespace)
}

/// Split text on commas that are outside quotes and outside `{}`, `[]` and `()` nesting.
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    split_top_level(text, |c| c == ',')
}

fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '{' | '[' | '(' => {
                depth += 1;
                current.push(c);
            }
            '}' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if depth == 0 && is_separator(c) => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
            }
            c => current.push(c),
        }
    }

    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

/// Create a new object identifier: a 4 byte timestamp followed by 8 random bytes.
#[must_use]
pub fn new_object_id() -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4();
    let suffix: String = random.as_bytes()[..8]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();
    format!("{:08x}{suffix}", seconds & 0xFFFF_FFFF)
}

/// Returns true when the text is a 24 character hexadecimal object identifier.
#[must_use]
pub fn is_object_id(text: &str) -> bool {
    text.len() == 24 && text.chars().all(|c| c.is_ascii_hexdigit())
}

struct Parser {
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
        }
    }

    fn error<S: Into<String>>(&self, message: S) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.position,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => {
                self.position -= 1;
                Err(self.error(format!("expected '{expected}' but found '{c}'")))
            }
            None => Err(self.error(format!("expected '{expected}' but reached end of input"))),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_list(),
            Some('"' | '\'') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if is_identifier_start(c) => self.parse_identifier_value(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.expect('{')?;
        let mut document = Document::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.position += 1;
                break;
            }

            let key = self.parse_key()?;
            self.expect(':')?;
            let value = self.parse_value()?;
            document.insert(key, value);

            self.skip_whitespace();
            match self.next() {
                Some(',') => {}
                Some('}') => break,
                Some(c) => {
                    self.position -= 1;
                    return Err(self.error(format!("expected ',' or '}}' but found '{c}'")));
                }
                None => return Err(self.error("unterminated object")),
            }
        }

        Ok(Value::Map(document))
    }

    fn parse_key(&mut self) -> Result<String> {
        self.skip_whitespace();
        match self.peek() {
            Some('"' | '\'') => self.parse_string(),
            Some(c) if is_identifier_start(c) || c.is_ascii_digit() => {
                let start = self.position;
                while self
                    .peek()
                    .is_some_and(|c| is_identifier_part(c) || c == '.')
                {
                    self.position += 1;
                }
                Ok(self.chars[start..self.position].iter().collect())
            }
            Some(c) => Err(self.error(format!("expected a key but found '{c}'"))),
            None => Err(self.error("expected a key but reached end of input")),
        }
    }

    fn parse_list(&mut self) -> Result<Value> {
        self.expect('[')?;
        let mut values = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.position += 1;
                break;
            }

            values.push(self.parse_value()?);

            self.skip_whitespace();
            match self.next() {
                Some(',') => {}
                Some(']') => break,
                Some(c) => {
                    self.position -= 1;
                    return Err(self.error(format!("expected ',' or ']' but found '{c}'")));
                }
                None => return Err(self.error("unterminated array")),
            }
        }

        Ok(Value::Array(values))
    }

    fn parse_string(&mut self) -> Result<String> {
        let Some(quote) = self.next() else {
            return Err(self.error("expected a string"));
        };
        let mut value = String::new();

        loop {
            match self.next() {
                Some('\\') => {
                    let escaped = match self.next() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{0008}',
                        Some('f') => '\u{000c}',
                        Some('0') => '\0',
                        Some('u') => self.parse_unicode_escape()?,
                        Some(c) => c,
                        None => return Err(self.error("unterminated string")),
                    };
                    value.push(escaped);
                }
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let start = self.position;
        let end = start + 4;
        if end > self.chars.len() {
            return Err(self.error("invalid unicode escape"));
        }
        let hex: String = self.chars[start..end].iter().collect();
        self.position = end;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid unicode escape '\\u{hex}'")))
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.position;
        if matches!(self.peek(), Some('-' | '+')) {
            self.position += 1;
        }
        if self.peek().is_some_and(is_identifier_start) {
            let sign = if self.chars[start] == '-' { -1.0 } else { 1.0 };
            let identifier = self.parse_identifier();
            return match identifier.as_str() {
                "Infinity" => Ok(Value::F64(sign * f64::INFINITY)),
                _ => Err(self.error(format!("invalid number '{identifier}'"))),
            };
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    if matches!(self.chars.get(self.position + 1), Some('-' | '+')) {
                        self.position += 1;
                    }
                }
                _ => break,
            }
            self.position += 1;
        }

        let text: String = self.chars[start..self.position].iter().collect();
        let text = text.trim_start_matches('+');
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Value::I64(value));
            }
        }
        text.parse::<f64>()
            .map(Value::F64)
            .map_err(|_| ParseError {
                message: format!("invalid number '{text}'"),
                position: start,
            })
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.position;
        while self.peek().is_some_and(is_identifier_part) {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn parse_identifier_value(&mut self) -> Result<Value> {
        let start = self.position;
        let mut identifier = self.parse_identifier();

        if identifier == "new" {
            self.skip_whitespace();
            identifier = self.parse_identifier();
            if identifier.is_empty() {
                return Err(self.error("expected a constructor after 'new'"));
            }
        }

        match identifier.as_str() {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" | "undefined" => return Ok(Value::Null),
            "NaN" => return Ok(Value::F64(f64::NAN)),
            "Infinity" => return Ok(Value::F64(f64::INFINITY)),
            _ => {}
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Err(ParseError {
                message: format!("unexpected identifier '{identifier}'"),
                position: start,
            });
        }

        let argument = self.parse_constructor_argument()?;
        construct(&identifier, argument).map_err(|message| ParseError {
            message,
            position: start,
        })
    }

    fn parse_constructor_argument(&mut self) -> Result<Option<Value>> {
        self.expect('(')?;
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.position += 1;
            return Ok(None);
        }
        let value = self.parse_value()?;
        self.expect(')')?;
        Ok(Some(value))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn construct(name: &str, argument: Option<Value>) -> core::result::Result<Value, String> {
    match (name, argument) {
        ("ObjectId", None) => Ok(Value::ObjectId(new_object_id())),
        ("ObjectId", Some(Value::String(hex))) if is_object_id(&hex) => {
            Ok(Value::ObjectId(hex.to_lowercase()))
        }
        ("ObjectId", Some(value)) => Err(format!("invalid ObjectId '{value}'")),
        ("ISODate" | "Date", None) => Ok(Value::DateTime(Utc::now().naive_utc())),
        ("ISODate" | "Date", Some(Value::String(text))) => parse_date_time(&text)
            .map(Value::DateTime)
            .ok_or_else(|| format!("invalid date '{text}'")),
        ("ISODate" | "Date", Some(Value::I64(millis))) => DateTime::from_timestamp_millis(millis)
            .map(|date_time| Value::DateTime(date_time.naive_utc()))
            .ok_or_else(|| format!("invalid date '{millis}'")),
        ("NumberInt", Some(value)) => integer_argument(&value)
            .and_then(|value| i32::try_from(value).ok())
            .map(Value::I32)
            .ok_or_else(|| format!("invalid NumberInt '{value}'")),
        ("NumberLong", Some(value)) => integer_argument(&value)
            .map(Value::I64)
            .ok_or_else(|| format!("invalid NumberLong '{value}'")),
        ("NumberDecimal", Some(value)) => Decimal::from_str(&value.to_string())
            .map(Value::Decimal)
            .map_err(|_| format!("invalid NumberDecimal '{value}'")),
        ("UUID", None) => Ok(Value::Uuid(uuid::Uuid::new_v4())),
        ("UUID", Some(Value::String(text))) => uuid::Uuid::parse_str(&text)
            .map(Value::Uuid)
            .map_err(|_| format!("invalid UUID '{text}'")),
        (name, _) => Err(format!("unsupported constructor '{name}'")),
    }
}

fn integer_argument(value: &Value) -> Option<i64> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        value => value.as_i64(),
    }
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date_time);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
