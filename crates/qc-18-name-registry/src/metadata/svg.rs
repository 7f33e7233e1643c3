//! # Image Renderer
//!
//! Deterministic SVG card for a record, plus a small structural validator
//! used when decoding documents received from elsewhere.

use crate::errors::CodecError;
use sha2::{Digest, Sha256};

/// Characters of `data` shown on the card.
pub const MAX_DATA_PREVIEW: usize = 32;

const FONT_FAMILY: &str = "Plus Jakarta Sans,DejaVu Sans,Noto Color Emoji,sans-serif";

// =============================================================================
// RENDERING
// =============================================================================

/// Gradient stop colours derived from `sha256(name)`.
#[must_use]
pub fn gradient_colours(name: &str) -> (String, String) {
    let digest = Sha256::digest(name.as_bytes());
    (
        format!("#{}", hex::encode(&digest[0..3])),
        format!("#{}", hex::encode(&digest[3..6])),
    )
}

/// Render the card for `name.tld` with a one-line preview of `data`.
#[must_use]
pub fn render_svg(name: &str, tld: &str, data: &str) -> String {
    let (from, to) = gradient_colours(name);
    let title = escape_xml(&format!("{name}.{tld}"));
    let preview: String = data.chars().take(MAX_DATA_PREVIEW).collect();
    let preview = escape_xml(&preview);

    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="270" height="270" fill="none">"##,
            r##"<defs><linearGradient id="bg" x1="0" y1="0" x2="270" y2="270" gradientUnits="userSpaceOnUse">"##,
            r##"<stop stop-color="{from}"/><stop offset="1" stop-color="{to}"/>"##,
            r##"</linearGradient></defs>"##,
            r##"<path fill="url(#bg)" d="M0 0h270v270H0z"/>"##,
            r##"<text x="32.5" y="222" font-size="27" fill="#fff" font-family="{font}" font-weight="bold">{title}</text>"##,
            r##"<text x="32.5" y="248" font-size="12" fill="#fff" font-family="{font}">{preview}</text>"##,
            r##"</svg>"##,
        ),
        from = from,
        to = to,
        font = FONT_FAMILY,
        title = title,
        preview = preview,
    )
}

/// Escape the five XML special characters. Characters XML 1.0 cannot carry
/// at all (C0 controls other than tab, LF and CR, U+FFFE, U+FFFF) become
/// U+FFFD.
#[must_use]
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other if is_xml_char(other) => out.push(other),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    out
}

/// The XML 1.0 `Char` production.
#[must_use]
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t'
            | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Check that `svg` is a single well-formed `<svg>` element.
///
/// Accepts an optional XML prolog and comments. Rejects characters outside
/// the XML character set, unbalanced or mismatched tags, unquoted
/// attributes, unknown entities and any content outside the root element.
///
/// # Errors
///
/// `MalformedImage` with the byte offset of the first problem.
pub fn check_well_formed(svg: &str) -> Result<(), CodecError> {
    if let Some((offset, c)) = svg.char_indices().find(|&(_, c)| !is_xml_char(c)) {
        return Err(CodecError::MalformedImage {
            offset,
            reason: format!("non-XML character {c:?}"),
        });
    }

    let mut scanner = Scanner::new(svg);
    scanner.skip_whitespace();
    if scanner.starts_with("<?xml") {
        scanner.skip_past("?>")?;
    }

    let mut open: Vec<&str> = Vec::new();
    let mut root_seen = false;

    loop {
        if open.is_empty() {
            scanner.skip_whitespace();
        }
        let Some(byte) = scanner.peek() else {
            break;
        };
        match byte {
            b'<' if scanner.starts_with("<!--") => scanner.skip_past("-->")?,
            b'<' if scanner.starts_with("</") => {
                scanner.pos += 2;
                let name = scanner.name()?;
                scanner.skip_whitespace();
                scanner.expect(b'>')?;
                match open.pop() {
                    Some(expected) if expected == name => {}
                    Some(expected) => {
                        return Err(scanner.error(format!(
                            "closing </{name}> does not match <{expected}>"
                        )))
                    }
                    None => return Err(scanner.error(format!("unexpected </{name}>"))),
                }
            }
            b'<' => {
                if open.is_empty() && root_seen {
                    return Err(scanner.error("content after the root element"));
                }
                scanner.pos += 1;
                let name = scanner.name()?;
                if open.is_empty() && name != "svg" {
                    return Err(scanner.error(format!("root element is <{name}>, expected <svg>")));
                }
                root_seen = true;
                let self_closing = scanner.attributes()?;
                if !self_closing {
                    open.push(name);
                }
            }
            _ if open.is_empty() => return Err(scanner.error("text outside the root element")),
            b'&' => scanner.entity()?,
            _ => scanner.pos += 1,
        }
    }

    if !root_seen {
        return Err(scanner.error("no root element"));
    }
    if let Some(unclosed) = open.last() {
        return Err(scanner.error(format!("unclosed <{unclosed}>")));
    }
    Ok(())
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.bytes[self.pos..].starts_with(pattern.as_bytes())
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::MalformedImage {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), CodecError> {
        if self.peek() != Some(byte) {
            return Err(self.error(format!("expected '{}'", byte as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_past(&mut self, terminator: &str) -> Result<(), CodecError> {
        let rest = &self.bytes[self.pos..];
        let found = rest
            .windows(terminator.len())
            .position(|window| window == terminator.as_bytes());
        match found {
            Some(index) => {
                self.pos += index + terminator.len();
                Ok(())
            }
            None => Err(self.error(format!("missing '{terminator}'"))),
        }
    }

    fn name(&mut self) -> Result<&'a str, CodecError> {
        let bytes: &'a [u8] = self.bytes;
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, b':' | b'_' | b'-' | b'.')
        ) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        std::str::from_utf8(&bytes[start..self.pos]).map_err(|_| self.error("name is not ascii"))
    }

    /// Parse attributes up to the end of a start tag. Returns true if the
    /// tag was self-closing.
    fn attributes(&mut self) -> Result<bool, CodecError> {
        loop {
            let before = self.pos;
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated tag")),
                Some(b'>') => {
                    self.pos += 1;
                    return Ok(false);
                }
                Some(b'/') => {
                    if !self.starts_with("/>") {
                        return Err(self.error("expected '/>'"));
                    }
                    self.pos += 2;
                    return Ok(true);
                }
                Some(_) => {
                    if self.pos == before {
                        return Err(self.error("expected whitespace before attribute"));
                    }
                    self.name()?;
                    self.skip_whitespace();
                    self.expect(b'=')?;
                    self.skip_whitespace();
                    self.quoted_value()?;
                }
            }
        }
    }

    fn quoted_value(&mut self) -> Result<(), CodecError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error("attribute value must be quoted")),
        };
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated attribute value")),
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'<') => return Err(self.error("'<' in attribute value")),
                Some(b'&') => self.entity()?,
                Some(_) => self.pos += 1,
            }
        }
    }

    fn entity(&mut self) -> Result<(), CodecError> {
        let rest = &self.bytes[self.pos + 1..];
        let Some(end) = rest.iter().position(|&b| b == b';') else {
            return Err(self.error("unterminated entity"));
        };
        let known = match &rest[..end] {
            b"amp" | b"lt" | b"gt" | b"quot" | b"apos" => true,
            [b'#', b'x', digits @ ..] => char_reference(digits, 16),
            [b'#', digits @ ..] => char_reference(digits, 10),
            _ => false,
        };
        if !known {
            return Err(self.error("unknown entity or non-XML character reference"));
        }
        self.pos += end + 2;
        Ok(())
    }
}

/// True if `digits` is a numeric reference to a legal XML character.
fn char_reference(digits: &[u8], radix: u32) -> bool {
    std::str::from_utf8(digits)
        .ok()
        .filter(|text| !text.is_empty() && !text.starts_with('+'))
        .and_then(|text| u32::from_str_radix(text, radix).ok())
        .and_then(char::from_u32)
        .is_some_and(is_xml_char)
}
