//! Dependency-free recursive-descent decoder for the manifest subset.
//!
//! Accepts block mappings and block sequences nested by two-space steps,
//! with scalar values resolved by [`lexer::resolve_scalar`]. Flow
//! collections, anchors, tags, multi-document streams, block scalars, and
//! tab indentation are rejected, so every document accepted here decodes to
//! the same tree under a YAML library.

use lessonforge_common::error::{ForgeError, Result};
use serde_json::{Map, Value};

use super::ManifestDecoder;
use super::lexer::{self, Line, LineKind};

/// Nested blocks are indented exactly this many spaces past their introducer.
const INDENT_STEP: usize = 2;

/// Built-in decoder used when no YAML library is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDecoder;

impl ManifestDecoder for FallbackDecoder {
    fn decode(&self, text: &str) -> Result<Value> {
        decode_block_text(text)
    }
}

/// Cursor over significant lines for recursive-descent block parsing.
struct LineCursor<'a> {
    lines: &'a [Line<'a>],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    const fn new(lines: &'a [Line<'a>]) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&Line<'a>> {
        self.lines.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

/// Block being assembled at one indentation depth.
enum Block {
    Empty,
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
}

impl Block {
    /// Returns the sequence under construction, starting one if the block is empty.
    fn as_sequence(&mut self) -> Option<&mut Vec<Value>> {
        if matches!(self, Self::Empty) {
            *self = Self::Sequence(Vec::new());
        }
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mapping under construction, starting one if the block is empty.
    fn as_mapping(&mut self) -> Option<&mut Map<String, Value>> {
        if matches!(self, Self::Empty) {
            *self = Self::Mapping(Map::new());
        }
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Mapping(map) => Value::Object(map),
            Self::Sequence(items) => Value::Array(items),
        }
    }
}

fn decode_err(line: &Line<'_>, message: impl Into<String>) -> ForgeError {
    ForgeError::Decode {
        line: line.number,
        message: message.into(),
    }
}

/// Decodes block-structured text into a value tree.
///
/// # Errors
///
/// Returns [`ForgeError::Decode`] naming the offending line when a line is
/// indented with tabs, when a block mixes mapping and sequence entries, when
/// indentation increases without an introducer, when a mapping repeats a
/// key, when a scalar uses unsupported syntax, or when a line is neither a
/// sequence item nor a `key: value` entry.
pub fn decode_block_text(text: &str) -> Result<Value> {
    tracing::debug!("decoding manifest with built-in decoder");
    let lines = lexer::significant_lines(text);
    if let Some(line) = lines.iter().find(|line| line.tab_indented) {
        return Err(decode_err(line, "tabs are not allowed in indentation"));
    }
    let mut cursor = LineCursor::new(&lines);
    let value = parse_block(&mut cursor, 0, Block::Empty)?;
    if let Some(line) = cursor.peek() {
        return Err(decode_err(line, "unexpected trailing content"));
    }
    Ok(value)
}

/// Consumes the lines at exactly `indent`, continuing `block`.
fn parse_block(cursor: &mut LineCursor<'_>, indent: usize, mut block: Block) -> Result<Value> {
    while let Some(line) = cursor.peek().copied() {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(decode_err(
                &line,
                format!(
                    "unexpected indentation of {} (expected {indent})",
                    line.indent
                ),
            ));
        }

        match lexer::classify(line.content) {
            Some(LineKind::Item(item)) => {
                let Some(items) = block.as_sequence() else {
                    return Err(decode_err(
                        &line,
                        "cannot mix mapping and sequence entries in one block",
                    ));
                };
                cursor.advance();
                items.push(parse_item(cursor, &line, item, indent)?);
            }
            Some(LineKind::Entry { key, value }) => {
                let Some(map) = block.as_mapping() else {
                    return Err(decode_err(
                        &line,
                        "cannot mix mapping and sequence entries in one block",
                    ));
                };
                let key = lexer::resolve_key(key).map_err(|message| decode_err(&line, message))?;
                if map.contains_key(&key) {
                    return Err(decode_err(&line, format!("duplicate key \"{key}\"")));
                }
                cursor.advance();
                let parsed = parse_entry_value(cursor, &line, value, indent)?;
                let _ = map.insert(key, parsed);
            }
            None => {
                return Err(decode_err(
                    &line,
                    format!("expected \"- item\" or \"key: value\", got \"{}\"", line.content),
                ));
            }
        }
    }

    Ok(block.into_value())
}

/// Parses the value of an entry whose key sits at `indent`.
fn parse_entry_value(
    cursor: &mut LineCursor<'_>,
    line: &Line<'_>,
    value: &str,
    indent: usize,
) -> Result<Value> {
    if value.is_empty() {
        return parse_block(cursor, indent + INDENT_STEP, Block::Empty);
    }
    lexer::resolve_scalar(value).map_err(|message| decode_err(line, message))
}

/// Parses the remainder of a `- ...` line.
///
/// A bare dash opens a nested block. A `key: value` or `key:` item starts a
/// mapping whose further entries line up with the key, two columns past the
/// dash.
fn parse_item(
    cursor: &mut LineCursor<'_>,
    line: &Line<'_>,
    item: &str,
    indent: usize,
) -> Result<Value> {
    if item.is_empty() {
        return parse_block(cursor, indent + INDENT_STEP, Block::Empty);
    }
    if !lexer::is_quoted(item) {
        if let Some((key, value)) = lexer::entry(item) {
            let column = indent + INDENT_STEP;
            let key = lexer::resolve_key(key).map_err(|message| decode_err(line, message))?;
            let first = parse_entry_value(cursor, line, value, column)?;
            let mut map = Map::new();
            let _ = map.insert(key, first);
            return parse_block(cursor, column, Block::Mapping(map));
        }
    }
    lexer::resolve_scalar(item).map_err(|message| decode_err(line, message))
}
