//! Line-oriented text layer of the NDY format: `SECTION: NAME` delimiters,
//! `#` comments, whitespace separated values and `(x/y/z)` vector tuples.

use crate::shared::{LinearColor, Rotator, Vector2, Vector3};
use crate::{CndError, Result};
use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

pub struct TextWriter<W> {
    out: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W) -> Self {
        TextWriter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn io(source: std::io::Error) -> CndError {
        CndError::Io {
            stream: "ndy text".to_owned(),
            source,
        }
    }

    pub fn write_line(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.out, "{line}").map_err(Self::io)
    }

    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        self.write_line(format_args!("# {text}"))
    }

    pub fn write_eol(&mut self) -> Result<()> {
        writeln!(self.out).map_err(Self::io)
    }

    pub fn write_section(&mut self, name: &str) -> Result<()> {
        self.write_line(format_args!("SECTION: {name}"))?;
        self.write_eol()
    }

    pub fn write_key_value(&mut self, key: &str, value: impl Display) -> Result<()> {
        self.write_line(format_args!("{key} {value}"))
    }
}

/// Fixed-precision float column, `%.6f` unless noted otherwise.
pub fn flex(value: f32) -> String {
    format!("{value:.6}")
}

/// Geometry distances keep two more digits than everything else.
pub fn flex8(value: f32) -> String {
    format!("{value:.8}")
}

pub fn vec3(v: &Vector3) -> String {
    format!("({}/{}/{})", flex(v.x), flex(v.y), flex(v.z))
}

pub fn vec2(v: &Vector2) -> String {
    format!("({}/{})", flex(v.x), flex(v.y))
}

pub fn rot(r: &Rotator) -> String {
    format!("({}/{}/{})", flex(r.pitch), flex(r.yaw), flex(r.roll))
}

pub fn color(c: &LinearColor) -> String {
    format!("({}/{}/{}/{})", flex(c.r), flex(c.g), flex(c.b), flex(c.a))
}

pub struct TextReader<R> {
    lines: std::io::Lines<R>,
    tokens: VecDeque<String>,
    line_number: usize,
}

impl<R: BufRead> TextReader<R> {
    pub fn new(input: R) -> Self {
        TextReader {
            lines: input.lines(),
            tokens: VecDeque::new(),
            line_number: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> CndError {
        CndError::Format {
            function: "ndy::TextReader",
            message: format!("line {}: {}", self.line_number, message.into()),
        }
    }

    /// Loads the next non-empty, non-comment line into the token queue.
    fn fill(&mut self) -> Result<bool> {
        while self.tokens.is_empty() {
            let Some(line) = self.lines.next() else {
                return Ok(false);
            };
            self.line_number += 1;
            let line = line.map_err(|source| CndError::Io {
                stream: "ndy text".to_owned(),
                source,
            })?;
            let content = line.split('#').next().unwrap_or_default();
            self.tokens
                .extend(content.split_whitespace().map(str::to_owned));
        }
        Ok(true)
    }

    /// Reads one raw line, comments and all. Used by the copyright block.
    pub fn raw_line(&mut self) -> Result<String> {
        if !self.tokens.is_empty() {
            return Err(self.error("raw line read with tokens pending"));
        }
        self.line_number += 1;
        match self.lines.next() {
            Some(line) => line.map_err(|source| CndError::Io {
                stream: "ndy text".to_owned(),
                source,
            }),
            None => Err(self.error("unexpected end of file")),
        }
    }

    pub fn next_token(&mut self) -> Result<String> {
        if !self.fill()? {
            return Err(self.error("unexpected end of file"));
        }
        Ok(self.tokens.pop_front().expect("fill guarantees a token"))
    }

    pub fn peek_token(&mut self) -> Result<Option<&str>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.tokens.front().map(String::as_str))
    }

    /// All tokens of the next content line. `fill` loads one line at a time,
    /// so a fresh queue always holds exactly one line's tokens.
    pub fn line_tokens(&mut self) -> Result<Vec<String>> {
        if !self.fill()? {
            return Err(self.error("unexpected end of file"));
        }
        Ok(self.tokens.drain(..).collect())
    }

    pub fn at_end(&mut self) -> Result<bool> {
        Ok(!self.fill()?)
    }

    pub fn expect(&mut self, expected: &str) -> Result<()> {
        let token = self.next_token()?;
        if !token.eq_ignore_ascii_case(expected) {
            return Err(self.error(format!("expected '{expected}', found '{token}'")));
        }
        Ok(())
    }

    /// Consumes `SECTION: <name>`; multi-word section names are matched
    /// word by word.
    pub fn expect_section(&mut self, name: &str) -> Result<()> {
        self.expect("SECTION:")?;
        self.expect_key(name)
    }

    pub fn value<T: FromStr>(&mut self) -> Result<T> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| self.error(format!("can't parse value '{token}'")))
    }

    /// Parses a `0x` prefixed flags value.
    pub fn flags(&mut self) -> Result<u32> {
        let token = self.next_token()?;
        let digits = token
            .strip_prefix("0x")
            .ok_or_else(|| self.error(format!("expected hex flags, found '{token}'")))?;
        u32::from_str_radix(digits, 16)
            .map_err(|_| self.error(format!("can't parse flags '{token}'")))
    }

    /// Consumes a multi-word key, then leaves the cursor on its value.
    pub fn expect_key(&mut self, key: &str) -> Result<()> {
        for word in key.split_whitespace() {
            self.expect(word)?;
        }
        Ok(())
    }

    pub fn key_value<T: FromStr>(&mut self, key: &str) -> Result<T> {
        self.expect_key(key)?;
        self.value()
    }

    fn tuple<const N: usize>(&mut self) -> Result<[f32; N]> {
        let token = self.next_token()?;
        let inner = token
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| self.error(format!("expected tuple, found '{token}'")))?;
        let mut values = [0f32; N];
        let mut parts = inner.split('/');
        for value in values.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| self.error(format!("tuple '{token}' is too short")))?;
            *value = part
                .parse()
                .map_err(|_| self.error(format!("can't parse tuple element '{part}'")))?;
        }
        if parts.next().is_some() {
            return Err(self.error(format!("tuple '{token}' is too long")));
        }
        Ok(values)
    }

    pub fn vec3(&mut self) -> Result<Vector3> {
        let [x, y, z] = self.tuple::<3>()?;
        Ok(Vector3 { x, y, z })
    }

    pub fn vec2(&mut self) -> Result<Vector2> {
        let [x, y] = self.tuple::<2>()?;
        Ok(Vector2 { x, y })
    }

    pub fn rot(&mut self) -> Result<Rotator> {
        let [pitch, yaw, roll] = self.tuple::<3>()?;
        Ok(Rotator { pitch, yaw, roll })
    }

    pub fn color(&mut self) -> Result<LinearColor> {
        let [r, g, b, a] = self.tuple::<4>()?;
        Ok(LinearColor { r, g, b, a })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_skips_comments_and_blanks() {
        let text = "# header comment\n\nVersion 3\nWorld Gravity 4.000000 # trailing\n";
        let mut reader = TextReader::new(text.as_bytes());
        assert_eq!(reader.key_value::<u32>("Version").unwrap(), 3);
        assert_eq!(reader.key_value::<f32>("World Gravity").unwrap(), 4.0);
        assert!(reader.at_end().unwrap());
    }

    #[test]
    fn tuples_round_trip() {
        let v = Vector3 {
            x: 1.5,
            y: -2.25,
            z: 0.0,
        };
        let text = vec3(&v);
        let mut reader = TextReader::new(text.as_bytes());
        assert_eq!(reader.vec3().unwrap(), v);
    }

    #[test]
    fn flags_require_hex_prefix() {
        let mut reader = TextReader::new("0x40f 12".as_bytes());
        assert_eq!(reader.flags().unwrap(), 0x40f);
        assert!(reader.flags().is_err());
    }
}
