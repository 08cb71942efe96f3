//! BibTeX parsing and source generation.
//!
//! Only the subset of BibTeX that appears in method bibliographies is
//! supported: `@type{key, field = {value}, ...}` entries with braced, quoted,
//! or bare values and `#` concatenation. `@comment`, `@preamble` and
//! `@string` blocks are skipped; string macros are not expanded.

use crate::error::{LciaError, Result};
use crate::ids::make_uuid;
use crate::schema::{Source, Stamp};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

static ENTRY_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@\s*([A-Za-z]+)\s*([{(])").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// A single bibliography entry.
#[derive(Clone, Debug, PartialEq)]
pub struct BibEntry {
    /// Lower-cased entry type, e.g. "article".
    pub entry_type: String,
    pub key: String,
    /// Lower-cased field name -> cleaned value.
    pub fields: IndexMap<String, String>,
}

impl BibEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Publication year, if a four-digit year can be found.
    pub fn year(&self) -> Option<i32> {
        let year = self.field("year")?;
        YEAR.find(year).and_then(|m| m.as_str().parse().ok())
    }

    /// Citation text in the form "Authors (Year). Title. Journal Volume(Number), Pages."
    pub fn citation(&self) -> String {
        let mut text = String::new();

        let authors = self
            .field("author")
            .map(format_authors)
            .or_else(|| self.field("organization").map(str::to_string))
            .or_else(|| self.field("institution").map(str::to_string));
        if let Some(authors) = authors {
            text.push_str(&authors);
        }
        if let Some(year) = self.field("year") {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&format!("({})", year));
        }
        if !text.is_empty() {
            text.push_str(". ");
        }
        if let Some(title) = self.field("title") {
            text.push_str(title.trim_end_matches('.'));
            text.push_str(". ");
        }

        let venue = self
            .field("journal")
            .or_else(|| self.field("booktitle"))
            .or_else(|| self.field("publisher"));
        if let Some(venue) = venue {
            let mut part = venue.to_string();
            if let Some(volume) = self.field("volume") {
                part.push(' ');
                part.push_str(volume);
                if let Some(number) = self.field("number") {
                    part.push_str(&format!("({})", number));
                }
            }
            if let Some(pages) = self.field("pages") {
                part.push_str(", ");
                part.push_str(&pages.replace("--", "-"));
            }
            text.push_str(&part);
            text.push('.');
        }

        text.trim().to_string()
    }
}

fn format_authors(raw: &str) -> String {
    let authors: Vec<&str> = raw.split(" and ").map(str::trim).collect();
    match authors.len() {
        0 | 1 => raw.trim().to_string(),
        2 => format!("{} and {}", authors[0], authors[1]),
        n if n > 5 => format!("{} et al.", authors[0]),
        n => format!("{}, and {}", authors[..n - 1].join(", "), authors[n - 1]),
    }
}

/// Remove grouping braces and collapse whitespace.
fn clean_value(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| *c != '{' && *c != '}').collect();
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

struct Parser<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.text.len())
    }

    fn line(&self) -> usize {
        self.text[..self.byte_offset()].matches('\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> LciaError {
        LciaError::Bibliography {
            line: self.line(),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Read a braced group; the cursor must be on the opening brace.
    fn read_braced(&mut self) -> Result<String> {
        let mut depth = 0usize;
        let start = self.pos + 1;
        while let Some(c) = self.peek() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let value: String =
                            self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
                        self.pos += 1;
                        return Ok(value);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unterminated braced value"))
    }

    fn read_quoted(&mut self) -> Result<String> {
        self.pos += 1;
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '"' if depth == 0 => {
                    let value: String =
                        self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
                    self.pos += 1;
                    return Ok(value);
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unterminated quoted value"))
    }

    fn read_bare(&mut self, close: char) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == close || c == '#' || c.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().map(|(_, c)| *c).collect()
    }

    fn read_value(&mut self, close: char) -> Result<String> {
        let mut value = String::new();
        loop {
            self.skip_whitespace();
            let part = match self.peek() {
                Some('{') => self.read_braced()?,
                Some('"') => self.read_quoted()?,
                Some(_) => self.read_bare(close),
                None => return Err(self.error("unexpected end of input in field value")),
            };
            value.push_str(&part);
            self.skip_whitespace();
            if self.peek() == Some('#') {
                self.pos += 1;
            } else {
                return Ok(value);
            }
        }
    }

    fn read_until(&mut self, stop: &[char]) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stop.contains(&c) {
                let s: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
                return Some(s);
            }
            self.pos += 1;
        }
        None
    }

    fn parse_entry(&mut self, entry_type: String, close: char) -> Result<BibEntry> {
        let key = self
            .read_until(&[',', close])
            .ok_or_else(|| self.error("unterminated entry key"))?
            .trim()
            .to_string();
        let mut fields = IndexMap::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
                None => return Err(self.error(format!("unterminated entry '{}'", key))),
            }

            let name = self
                .read_until(&['=', close])
                .ok_or_else(|| self.error(format!("unterminated entry '{}'", key)))?
                .trim()
                .to_lowercase();
            if self.peek() != Some('=') {
                return Err(self.error(format!("field '{}' has no value", name)));
            }
            self.pos += 1;
            let value = self.read_value(close)?;
            fields.insert(name, clean_value(&value));
        }

        Ok(BibEntry {
            entry_type,
            key,
            fields,
        })
    }

    fn parse(mut self) -> Result<Vec<BibEntry>> {
        let mut entries = Vec::new();
        while self.pos < self.chars.len() {
            if self.peek() != Some('@') {
                self.pos += 1;
                continue;
            }

            let offset = self.byte_offset();
            let Some(caps) = ENTRY_START.captures(&self.text[offset..]) else {
                self.pos += 1;
                continue;
            };
            let entry_type = caps[1].to_lowercase();
            let open = caps[2].chars().next().unwrap_or('{');
            let close = if open == '(' { ')' } else { '}' };
            let header_len = caps[0].chars().count();

            if matches!(entry_type.as_str(), "comment" | "preamble" | "string") {
                // Skip the whole block, keeping the opening delimiter under the cursor
                self.pos += header_len - 1;
                if open == '{' {
                    self.read_braced()?;
                } else {
                    self.read_until(&[')']);
                    self.pos += 1;
                }
                continue;
            }

            self.pos += header_len;
            entries.push(self.parse_entry(entry_type, close)?);
        }
        Ok(entries)
    }
}

/// Parse every entry of a BibTeX document.
pub fn parse_bibtex(text: &str) -> Result<Vec<BibEntry>> {
    Parser::new(text).parse()
}

/// Build the source entity of a bibliography entry, named after its method.
pub fn to_source(entry: &BibEntry, method_name: &str, stamp: &Stamp) -> Source {
    let citation = entry.citation();
    Source {
        model_type: "Source".to_string(),
        id: make_uuid(&[entry.key.as_str()]),
        name: method_name.to_string(),
        description: entry.field("note").map(str::to_string),
        text_reference: if citation.is_empty() {
            None
        } else {
            Some(citation)
        },
        year: entry.year(),
        url: entry.field("url").map(str::to_string),
        version: stamp.version.clone(),
        last_change: stamp.last_change.clone(),
    }
}

/// Generate sources for exactly the bibliography keys in `bib_ids`.
///
/// `bib_ids` maps bibliography key -> method name. Sources are yielded in
/// bibliography file order; keys absent from the file are logged and skipped.
pub fn generate_sources<'a>(
    path: &Path,
    bib_ids: &'a IndexMap<String, String>,
    stamp: &'a Stamp,
) -> Result<impl Iterator<Item = Source> + 'a> {
    let entries = if bib_ids.is_empty() {
        Vec::new()
    } else {
        let content = std::fs::read_to_string(path)?;
        parse_bibtex(&content)?
    };

    let found: HashSet<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    for key in bib_ids.keys() {
        if !found.contains(key.as_str()) {
            tracing::warn!("Bibliography key '{}' not found in {}", key, path.display());
        }
    }

    Ok(entries
        .into_iter()
        .filter(move |e| bib_ids.contains_key(&e.key))
        .map(move |e| to_source(&e, &bib_ids[&e.key], stamp)))
}
