//! BibTeX parser.
//!
//! A nom-based parser for the entry grammar: `@kind{key, name = value, ...}`
//! with braced values (nested braces allowed), quoted values, bare
//! numbers, `@string` abbreviation references, and `#` concatenation.
//! `@comment` blocks and `%` line comments are skipped. Unlike lenient
//! reference managers, a malformed entry is a hard error here: a paper
//! compile should not proceed with a bibliography it cannot fully read.

use std::collections::HashMap;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
};

use crate::BibtexError;
use crate::entry::{Entry, EntryKind};

/// Parse all entries from BibTeX source text.
///
/// `@string` definitions are accumulated and substituted into later
/// field values; they do not appear in the returned entry list.
pub fn parse_entries(input: &str) -> Result<Vec<Entry>, BibtexError> {
    let mut entries = Vec::new();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut remaining = input;

    loop {
        remaining = skip_to_entry(remaining);
        if remaining.is_empty() {
            break;
        }

        let line = line_number(input, remaining);
        match parse_at_block(remaining, &strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Entry(entry) => entries.push(entry),
                    AtBlock::Abbrev(key, value) => {
                        strings.insert(key, value);
                    }
                    AtBlock::Skipped => {}
                }
                remaining = rest;
            }
            Err(_) => {
                return Err(BibtexError::Malformed {
                    line,
                    message: "unparseable @ block".to_string(),
                });
            }
        }
    }

    Ok(entries)
}

/// One parsed `@...` block.
enum AtBlock {
    Entry(Entry),
    Abbrev(String, String),
    Skipped,
}

/// Skip whitespace, `%` line comments, and any stray text before the
/// next `@`.
fn skip_to_entry(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix('%') {
            match after.find('\n') {
                Some(pos) => rest = &after[pos + 1..],
                None => return "",
            }
            continue;
        }
        if trimmed.starts_with('@') {
            return trimmed;
        }
        // Inter-entry junk is ignored, as BibTeX itself does.
        return match trimmed.find('@') {
            Some(pos) => &trimmed[pos..],
            None => "",
        };
    }
}

/// 1-based line number of `tail` within `full`.
fn line_number(full: &str, tail: &str) -> usize {
    let consumed = full.len() - tail.len();
    full[..consumed].matches('\n').count() + 1
}

fn parse_at_block<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, kind_name) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match kind_name.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_abbrev(rest, strings)?;
            Ok((rest, AtBlock::Abbrev(key, value)))
        }
        "comment" | "preamble" => {
            let (rest, _) = skip_braced_block(rest)?;
            Ok((rest, AtBlock::Skipped))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, kind_name, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

/// Parse `{ key = value }` after `@string`.
fn parse_abbrev<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = field_name(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (key.to_string(), value)))
}

/// Skip a balanced `{...}` block (for `@comment` / `@preamble`).
fn skip_braced_block(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = braced_content(rest)?;
    Ok((rest, ()))
}

/// Parse `{key, name = value, ...}` after the entry kind.
fn parse_entry_body<'a>(
    input: &'a str,
    kind_name: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Entry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let mut entry = Entry::new(key, EntryKind::parse(kind_name));
    let mut remaining = rest;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('}') {
            return Ok((stripped, entry));
        }

        let (rest, name) = field_name(rest)?;
        let (rest, _) = multispace0(rest)?;
        let (rest, _) = char('=')(rest)?;
        let (rest, value) = field_value(rest, strings)?;
        entry.push_field(name, value);

        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
    }
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// Parse a field value: braced, quoted, bare number, or abbreviation
/// reference, with `#` concatenation between parts.
fn field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            braced_value,
            quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(field_name, |name| {
                strings.get(name).cloned().unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

/// Parse `{...}`, returning the content without the outer braces.
/// Inner braces are preserved (they carry meaning in LaTeX).
fn braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = braced_content(input)?;
    Ok((rest, content[1..content.len() - 1].to_string()))
}

/// Scan a balanced braced block, honoring `\{`-style escapes.
fn braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom_error(input));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }
    Err(nom_error(input))
}

/// Parse `"..."`, allowing braced groups (and braced quotes) inside.
fn quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom_error(input));
    }

    let bytes = input.as_bytes();
    let mut result = String::new();
    let mut depth = 0usize;
    let mut pos = 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if depth == 0 => return Ok((&input[pos + 1..], result)),
            b'{' => {
                depth += 1;
                result.push('{');
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                result.push('}');
            }
            b'\\' if pos + 1 < bytes.len() => {
                result.push('\\');
                pos += 1;
                result.push(bytes[pos] as char);
            }
            c => result.push(c as char),
        }
        pos += 1;
    }
    Err(nom_error(input))
}

fn nom_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}
