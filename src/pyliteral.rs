// SPDX-License-Identifier: EUPL-1.2
// Copyright (c) 2026 Benjamin Küttner <benjamin.kuettner@icloud.com>
// Patent Pending — DE Gebrauchsmuster, filed 2026-02-23

//! Reader for Python literal syntax.
//!
//! Two feeds publish data as Python rather than JSON: the OONI fingerprint
//! table lives in a `.py` module as a dict assignment, and the Citizen Lab
//! CSVs store list columns as `repr()` output (`['citizenlab']`). Both are
//! read into [`serde_json::Value`] so the adapters can deserialize them with
//! serde like any other document.
//!
//! Supported: dicts with string keys, lists, tuples (read as arrays),
//! single/double-quoted strings with escapes, adjacent string concatenation,
//! integers, floats, `True`/`False`/`None`, `#` comments, trailing commas.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{char, digit1, multispace1},
    combinator::{map, map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, many0_count, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    Err as NomErr, IResult,
};
use serde_json::{Map, Number, Value};

use crate::error::RegistryError;

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Parse a complete literal. Anything but whitespace or comments after the
/// value is an error.
pub fn parse_literal(input: &str) -> Result<Value, RegistryError> {
    let (rest, parsed) = literal(input).map_err(|e| literal_error(input, e))?;
    let (rest, _) = blank(rest).map_err(|e| literal_error(input, e))?;
    if !rest.is_empty() {
        return Err(RegistryError::Literal(format!(
            "unexpected trailing input at offset {}",
            input.len() - rest.len()
        )));
    }
    Ok(parsed)
}

/// Parse the value assigned to `name` in Python source text.
///
/// The first line starting with `name` is taken as the assignment; exactly
/// one literal is read after its `=` and the rest of the module is ignored.
pub fn extract_assignment(source: &str, name: &str) -> Result<Value, RegistryError> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if line.starts_with(name) {
            let after_name = &source[offset + name.len()..];
            let assigned: IResult<&str, char> = preceded(blank, char('='))(after_name);
            if let Ok((rhs, _)) = assigned {
                let (_, parsed) = literal(rhs).map_err(|e| literal_error(rhs, e))?;
                return Ok(parsed);
            }
        }
        offset += line.len();
    }
    Err(RegistryError::Literal(format!("no assignment to '{name}' found")))
}

/// Parse a list or tuple of strings such as `['citizenlab', 'ooni']`.
///
/// Empty text is read as an empty list.
pub fn parse_str_list(input: &str) -> Result<Vec<String>, RegistryError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    match parse_literal(input)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(RegistryError::Literal(format!(
                    "expected a list of strings, found element {other}"
                ))),
            })
            .collect(),
        other => Err(RegistryError::Literal(format!("expected a list, found {other}"))),
    }
}

fn literal_error(input: &str, err: NomErr<Error<&str>>) -> RegistryError {
    match err {
        NomErr::Error(e) | NomErr::Failure(e) => RegistryError::Literal(format!(
            "{:?} at offset {}",
            e.code,
            input.len() - e.input.len()
        )),
        NomErr::Incomplete(_) => RegistryError::Literal("truncated input".into()),
    }
}

// =============================================================================
// GRAMMAR
// =============================================================================

/// Whitespace and `#` comments.
fn blank(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(char('#'), take_till(|c| c == '\n'))),
        ))),
    )(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    preceded(
        blank,
        alt((
            dict,
            list,
            tuple_literal,
            map(string, Value::String),
            keyword,
            number,
        )),
    )(input)
}

fn keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("True")),
        value(Value::Bool(false), tag("False")),
        value(Value::Null, tag("None")),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |text: &str| -> Result<Value, ()> {
            if let Ok(int) = text.parse::<i64>() {
                return Ok(Value::Number(int.into()));
            }
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or(())
        },
    )(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    preceded(blank, char(','))(input)
}

fn items(input: &str) -> IResult<&str, Vec<Value>> {
    terminated(separated_list0(comma, literal), opt(comma))(input)
}

fn list(input: &str) -> IResult<&str, Value> {
    map(delimited(char('['), items, preceded(blank, char(']'))), Value::Array)(input)
}

fn tuple_literal(input: &str) -> IResult<&str, Value> {
    map(delimited(char('('), items, preceded(blank, char(')'))), Value::Array)(input)
}

fn dict(input: &str) -> IResult<&str, Value> {
    let entry = separated_pair(
        preceded(blank, string),
        preceded(blank, char(':')),
        literal,
    );
    map(
        delimited(
            char('{'),
            terminated(separated_list0(comma, entry), opt(comma)),
            preceded(blank, char('}')),
        ),
        |entries: Vec<(String, Value)>| Value::Object(entries.into_iter().collect::<Map<_, _>>()),
    )(input)
}

/// One string, or several adjacent ones concatenated (`"a" "b"`).
fn string(input: &str) -> IResult<&str, String> {
    let (rest, first) = quoted(input)?;
    let (rest, more) = many0(preceded(blank, quoted))(rest)?;
    Ok((rest, more.into_iter().fold(first, |acc, s| acc + &s)))
}

/// A single- or double-quoted string with Python escapes.
fn quoted(input: &str) -> IResult<&str, String> {
    let quote = match input.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(NomErr::Error(Error::new(input, ErrorKind::Char))),
    };
    let mut out = String::new();
    let mut chars = input.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&input[idx + c.len_utf8()..], out)),
            '\n' => break,
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                match esc {
                    '\n' => {}
                    '\\' | '\'' | '"' => out.push(esc),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'v' => out.push('\u{0b}'),
                    'f' => out.push('\u{0c}'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    first @ '0'..='7' => {
                        // Up to three octal digits.
                        let mut code = octal_digit(first);
                        for _ in 0..2 {
                            match chars.peek() {
                                Some(&(_, next @ '0'..='7')) => {
                                    code = code * 8 + octal_digit(next);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        match char::from_u32(code) {
                            Some(ch) => out.push(ch),
                            None => return Err(NomErr::Failure(Error::new(input, ErrorKind::Escaped))),
                        }
                    }
                    'x' | 'u' | 'U' => {
                        let width = match esc {
                            'x' => 2,
                            'u' => 4,
                            _ => 8,
                        };
                        let digits: String = chars.by_ref().take(width).map(|(_, d)| d).collect();
                        let decoded = u32::from_str_radix(&digits, 16)
                            .ok()
                            .filter(|_| digits.len() == width)
                            .and_then(char::from_u32);
                        match decoded {
                            Some(ch) => out.push(ch),
                            None => return Err(NomErr::Failure(Error::new(input, ErrorKind::Escaped))),
                        }
                    }
                    // Python keeps unknown escapes verbatim.
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            c => out.push(c),
        }
    }
    Err(NomErr::Failure(Error::new(input, ErrorKind::Char)))
}

fn octal_digit(c: char) -> u32 {
    c as u32 - '0' as u32
}
