//! Text program images: already-encoded words, written out by hand.
//!
//! ```text
//! # Fibonacci
//! 0x0000:
//!     0xA200 0x0000   ; LDV 2, 0x0000
//!     0xA300,0x0001   ; LDV 3, 0x0001
//! 0x0010:
//!     0b1111000000000000 0
//! ```
//!
//! `<addr>:` moves the write position forward; skipped words hold the halt
//! sentinel.

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Word, BANK_SIZE, HALT_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidNumber { radix: u32 },
    InvalidOrigin,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "program store has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse word with radix `{}`", radix)
            }
            ParseErrorKind::InvalidOrigin => f.write_str("invalid origin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Parses a word with an optional `0b`, `0o` or `0x` prefix. The error carries
/// the radix that was tried.
fn parse_number(token: &str) -> std::result::Result<Word, u32> {
    let (radix, offset) = match token.as_bytes() {
        [b'0', b'b', ..] => (2, 2),
        [b'0', b'o', ..] => (8, 2),
        [b'0', b'x', ..] | [b'0', b'X', ..] => (16, 2),
        _ => (10, 0),
    };

    Word::from_str_radix(&token[offset..], radix).map_err(|_| radix)
}

/// Parses a whole image, starting at address 0.
///
/// # Errors
///
/// Every bad line is reported, not just the first.
pub fn parse_image(data: &str) -> Result<Vec<Word>, Vec<ParseError>> {
    Parser::new(data).parse()
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    cursor: usize,
    words: Vec<Word>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data`.
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            cursor: 0,
            words: Vec::new(),
        }
    }

    /// Consumes `self` and tries to parse all lines into a word image.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Vec<Word>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(self.words)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. `None` once all lines are consumed.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        // everything after `#` or `;` is a comment
        let line = match line.find(|c: char| c == '#' || c == ';') {
            Some(start) => &line[..start],
            None => line,
        }
        .trim();

        if line.is_empty() {
            Some(Ok(()))
        } else if let Some(origin) = line.strip_suffix(':') {
            Some(self.parse_origin(origin.trim()))
        } else {
            Some(self.parse_words(line))
        }
    }

    /// Tries to parse an origin such as `0x0010`. The origin may not move
    /// backwards over words already written.
    fn parse_origin(&mut self, origin: &str) -> Result<()> {
        log::debug!("[{}] Found origin", self.line_nr);

        let address = parse_number(origin).map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidOrigin,
                format!("failed to parse `{}` as an address with radix `{}`", origin, radix),
                self.line_nr,
            )
        })? as usize;

        if address < self.cursor {
            return Err(ParseError::new(
                ParseErrorKind::InvalidOrigin,
                format!(
                    "origin 0x{:04x} is behind the current position 0x{:04x}",
                    address, self.cursor
                ),
                self.line_nr,
            ));
        }

        self.cursor = address;
        Ok(())
    }

    /// Tries to parse a line of words separated by whitespace or commas.
    fn parse_words(&mut self, line: &str) -> Result<()> {
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
        {
            let word = parse_number(token).map_err(|radix| {
                ParseError::new(
                    ParseErrorKind::InvalidNumber { radix },
                    format!("`{}` is not a 16-bit word", token),
                    self.line_nr,
                )
            })?;
            self.write_word(word)?;
        }

        Ok(())
    }

    /// Writes `word` at the cursor, filling any gap with the halt sentinel,
    /// then advances the cursor.
    fn write_word(&mut self, word: Word) -> Result<()> {
        if self.cursor >= BANK_SIZE {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: self.cursor,
                },
                "image is larger than the program store",
                self.line_nr,
            ));
        }

        if self.words.len() < self.cursor {
            self.words.resize(self.cursor, HALT_SENTINEL);
        }
        self.words.push(word);
        self.cursor += 1;

        Ok(())
    }
}
