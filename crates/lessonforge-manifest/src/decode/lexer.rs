//! Line splitting, line classification, and scalar resolution using `nom`.
//!
//! The fallback decoder works line by line: every significant line is either
//! a sequence item (`- ...`) or a mapping entry (`key: ...`). Blank lines and
//! `#` comment lines are discarded before classification. Plain scalars
//! resolve under the YAML 1.2 core schema; syntax outside the supported
//! subset is rejected rather than read as text.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, hex_digit1, oct_digit1, one_of, space0},
    combinator::{all_consuming, opt, value},
    error::{Error as NomError, ErrorKind},
    sequence::preceded,
};
use serde_json::{Number, Value};

/// Leading characters of YAML constructs the built-in decoder does not read:
/// flow collections, anchors, aliases, tags, block scalars, and directives.
const UNSUPPORTED_LEADERS: [char; 13] = ['[', ']', '{', '}', '&', '*', '!', '|', '>', '%', '@', '`', ','];

/// A significant (non-blank, non-comment) source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the original text.
    pub number: usize,
    /// Width of the leading whitespace.
    pub indent: usize,
    /// Whether the leading whitespace contains a tab.
    pub tab_indented: bool,
    /// Trimmed content with any trailing comment removed.
    pub content: &'a str,
}

/// Shape of a significant line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `- item`; the item is empty for a bare `-`.
    Item(&'a str),
    /// `key: value`; the value is empty when the entry opens a nested block.
    Entry {
        /// Raw key text, quotes included; see [`resolve_key`].
        key: &'a str,
        /// Raw value text.
        value: &'a str,
    },
}

/// Splits text into significant lines, recording indentation.
pub fn significant_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let leading = &raw[..raw.len() - raw.trim_start().len()];
            Some(Line {
                number: idx + 1,
                indent: leading.len(),
                tab_indented: leading.contains('\t'),
                content: strip_trailing_comment(trimmed),
            })
        })
        .collect()
}

/// Byte length of the quoted scalar opening `input`, quotes included.
///
/// Inside double quotes a backslash escapes the next character; inside
/// single quotes `''` stands for one quote. Returns `None` when `input` does
/// not start with a quote or the quote is never closed.
fn quoted_len(input: &str) -> Option<usize> {
    let quote = input.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut chars = input.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            let _ = chars.next();
        } else if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                let _ = chars.next();
                continue;
            }
            return Some(idx + 1);
        }
    }
    None
}

/// Removes a ` # comment` tail that is not inside a quoted scalar.
///
/// A quote only opens a quoted region at the start of the line or after
/// whitespace, so apostrophes inside plain words do not hide comments.
fn strip_trailing_comment(content: &str) -> &str {
    let mut idx = 0;
    let mut after_space = true;
    while let Some(c) = content[idx..].chars().next() {
        if after_space {
            if c == '#' && idx > 0 {
                return content[..idx].trim_end();
            }
            if let Some(len) = quoted_len(&content[idx..]) {
                idx += len;
                after_space = false;
                continue;
            }
        }
        after_space = c.is_whitespace();
        idx += c.len_utf8();
    }
    content
}

/// Classifies a line, or returns `None` when it is neither shape.
pub fn classify(content: &str) -> Option<LineKind<'_>> {
    if let Ok((_, item)) = sequence_item(content) {
        return Some(LineKind::Item(item));
    }
    entry(content).map(|(key, value)| LineKind::Entry { key, value })
}

/// Splits `key: value` (or `key:`) into raw key and trimmed value.
pub fn entry(content: &str) -> Option<(&str, &str)> {
    alt((quoted_entry, plain_entry))
        .parse(content)
        .ok()
        .map(|(_, pair)| pair)
}

fn sequence_item(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('-')(input)?;
    if input.is_empty() {
        return Ok((input, ""));
    }
    let (item, _) = char(' ')(input)?;
    Ok(("", item.trim()))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    match quoted_len(input) {
        Some(len) => Ok((&input[len..], &input[..len])),
        None => Err(nom::Err::Error(NomError::new(input, ErrorKind::Char))),
    }
}

fn quoted_entry(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, key) = quoted(input)?;
    let (rest, _) = (space0, char(':')).parse(rest)?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return Err(nom::Err::Error(NomError::new(rest, ErrorKind::Space)));
    }
    Ok(("", (key, rest.trim())))
}

fn plain_entry(input: &str) -> IResult<&str, (&str, &str)> {
    if let Some(idx) = input.find(": ") {
        return Ok(("", (input[..idx].trim(), input[idx + 2..].trim())));
    }
    match input.strip_suffix(':') {
        Some(key) => Ok(("", (key.trim(), ""))),
        None => Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag))),
    }
}

/// Whether `raw` is exactly one quoted scalar.
pub fn is_quoted(raw: &str) -> bool {
    quoted_len(raw) == Some(raw.len())
}

/// Resolves a raw mapping key to its text.
///
/// Quoted keys are unescaped; plain keys are taken verbatim, never typed.
pub fn resolve_key(raw: &str) -> Result<String, String> {
    if raw.starts_with(['"', '\'']) {
        return unquote(raw);
    }
    if raw.is_empty() {
        return Err("empty mapping key".to_owned());
    }
    check_plain(raw)?;
    Ok(raw.to_owned())
}

/// Resolves raw scalar text into a typed value.
///
/// Quoted scalars are strings. Plain scalars resolve in the order null,
/// boolean, integer, float, string, accepting only the core-schema
/// spellings: `null`/`Null`/`NULL`/`~`, `true`/`True`/`TRUE` (and the
/// `false` forms), decimal, `0x`, `0o` and `0b` integers, and floats
/// including `.inf` and `.nan`. Digit strings with a leading zero stay text.
/// Infinite and NaN floats become null, as in a JSON value tree.
///
/// # Errors
///
/// Returns a message when the text is a malformed quoted scalar, uses
/// unsupported syntax, or is an integer outside the 64-bit range.
pub fn resolve_scalar(raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.starts_with(['"', '\'']) {
        return unquote(raw).map(Value::String);
    }
    check_plain(raw)?;
    resolve_plain(raw)
}

fn check_plain(raw: &str) -> Result<(), String> {
    if raw.starts_with(UNSUPPORTED_LEADERS) {
        return Err(format!(
            "unsupported syntax \"{raw}\": flow collections, anchors, tags, and block scalars are not supported"
        ));
    }
    if matches!(raw, "-" | "?") || raw.starts_with("- ") || raw.starts_with("? ") {
        return Err(format!("unexpected indicator in \"{raw}\""));
    }
    if raw.contains(": ") || raw.ends_with(':') {
        return Err(format!("unexpected mapping inside plain scalar \"{raw}\""));
    }
    Ok(())
}

fn resolve_plain(raw: &str) -> Result<Value, String> {
    if all_consuming(null).parse(raw).is_ok() {
        return Ok(Value::Null);
    }
    if let Ok((_, flag)) = all_consuming(boolean).parse(raw) {
        return Ok(Value::Bool(flag));
    }
    if let Ok((_, (negative, radix, digits))) = all_consuming(integer).parse(raw) {
        if radix == 10 && digits.len() > 1 && digits.starts_with('0') {
            return Ok(Value::String(raw.to_owned()));
        }
        return integer_value(negative, radix, digits)
            .ok_or_else(|| format!("integer \"{raw}\" does not fit in 64 bits"));
    }
    if let Some(f) = float(raw) {
        return Ok(Number::from_f64(f).map_or(Value::Null, Value::Number));
    }
    Ok(Value::String(raw.to_owned()))
}

fn null(input: &str) -> IResult<&str, ()> {
    value((), alt((tag("null"), tag("Null"), tag("NULL"), tag("~")))).parse(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, alt((tag("true"), tag("True"), tag("TRUE")))),
        value(false, alt((tag("false"), tag("False"), tag("FALSE")))),
    ))
    .parse(input)
}

/// Sign, radix, and digits of an integer literal.
fn integer(input: &str) -> IResult<&str, (bool, u32, &str)> {
    let (input, sign) = opt(one_of("+-")).parse(input)?;
    let (input, (radix, digits)) = alt((
        preceded(tag("0x"), hex_digit1).map(|d| (16_u32, d)),
        preceded(tag("0o"), oct_digit1).map(|d| (8, d)),
        preceded(tag("0b"), take_while1(|c: char| c == '0' || c == '1')).map(|d| (2, d)),
        digit1.map(|d| (10, d)),
    ))
    .parse(input)?;
    Ok((input, (sign == Some('-'), radix, digits)))
}

fn integer_value(negative: bool, radix: u32, digits: &str) -> Option<Value> {
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if !negative {
        return Some(Value::from(magnitude));
    }
    i64::try_from(-i128::from(magnitude)).ok().map(Value::from)
}

fn float(raw: &str) -> Option<f64> {
    let unsigned = match raw.strip_prefix('+') {
        Some(rest) if rest.starts_with(['+', '-']) => return None,
        Some(rest) => rest,
        None => raw,
    };
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return Some(f64::INFINITY);
    }
    match raw {
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => unsigned.parse::<f64>().ok().filter(|f| f.is_finite()),
    }
}

/// Removes the quotes of a complete quoted scalar and resolves its escapes.
fn unquote(raw: &str) -> Result<String, String> {
    if !is_quoted(raw) {
        return Err(format!("malformed quoted scalar {raw}"));
    }
    let inner = &raw[1..raw.len() - 1];
    if raw.starts_with('\'') {
        return Ok(inner.replace("''", "'"));
    }
    unescape_double(inner)
}

fn unescape_double(inner: &str) -> Result<String, String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next() {
            Some('0') => '\0',
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('t' | '\t') => '\t',
            Some('n') => '\n',
            Some('v') => '\u{b}',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some('e') => '\u{1b}',
            Some(' ') => ' ',
            Some('"') => '"',
            Some('/') => '/',
            Some('\\') => '\\',
            Some('N') => '\u{85}',
            Some('_') => '\u{a0}',
            Some('L') => '\u{2028}',
            Some('P') => '\u{2029}',
            Some('x') => hex_escape(&mut chars, 2)?,
            Some('u') => hex_escape(&mut chars, 4)?,
            Some('U') => hex_escape(&mut chars, 8)?,
            Some(other) => return Err(format!("unknown escape \\{other}")),
            None => return Err("dangling backslash in quoted scalar".to_owned()),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, width: usize) -> Result<char, String> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.len() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("escape needs {width} hex digits, got \"{digits}\""));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("escape \"{digits}\" is not a character"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scalar(raw: &str) -> Value {
        resolve_scalar(raw).expect("scalar")
    }

    #[test]
    fn significant_lines_skip_blanks_and_comments() {
        let text = "# header\n\nroot:\n  # inner\n  child: value\n";
        let lines = significant_lines(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[1].number, 5);
        assert_eq!(lines[1].indent, 2);
        assert_eq!(lines[1].content, "child: value");
        assert!(!lines[1].tab_indented);
    }

    #[test]
    fn significant_lines_flag_tab_indentation() {
        let lines = significant_lines("root:\n\tchild: value\n");
        assert!(lines[1].tab_indented);
    }

    #[test]
    fn trailing_comment_removed_outside_quotes() {
        assert_eq!(strip_trailing_comment("cpu: 4 # cores"), "cpu: 4");
        assert_eq!(
            strip_trailing_comment(r#"title: "C# basics # not a comment""#),
            r#"title: "C# basics # not a comment""#
        );
        assert_eq!(strip_trailing_comment("note: don't # trim"), "note: don't");
        assert_eq!(strip_trailing_comment("channel: #general"), "channel:");
        assert_eq!(strip_trailing_comment("tag: v1#2"), "tag: v1#2");
    }

    #[test]
    fn trailing_comment_respects_escaped_quotes() {
        assert_eq!(
            strip_trailing_comment(r#"say: "a \" # b" # c"#),
            r#"say: "a \" # b""#
        );
        assert_eq!(strip_trailing_comment("say: 'it''s # x' # c"), "say: 'it''s # x'");
    }

    #[test]
    fn classify_sequence_items() {
        assert_eq!(classify("- redis"), Some(LineKind::Item("redis")));
        assert_eq!(classify("-"), Some(LineKind::Item("")));
        assert_eq!(classify("- name: redis"), Some(LineKind::Item("name: redis")));
    }

    #[test]
    fn classify_mapping_entries() {
        assert_eq!(
            classify("url: https://example.com/repo.git"),
            Some(LineKind::Entry {
                key: "url",
                value: "https://example.com/repo.git"
            })
        );
        assert_eq!(
            classify("settings:"),
            Some(LineKind::Entry {
                key: "settings",
                value: ""
            })
        );
        assert_eq!(
            classify(r#""ghcr.io/devcontainers/features/node:1":"#),
            Some(LineKind::Entry {
                key: r#""ghcr.io/devcontainers/features/node:1""#,
                value: ""
            })
        );
        assert_eq!(
            classify("image:tag: v1"),
            Some(LineKind::Entry {
                key: "image:tag",
                value: "v1"
            })
        );
    }

    #[test]
    fn classify_rejects_bare_words() {
        assert_eq!(classify("just words"), None);
        assert_eq!(classify("-redis"), None);
        assert_eq!(classify("a:b"), None);
    }

    #[test]
    fn resolve_key_unescapes_quotes() {
        assert_eq!(resolve_key("'it''s'").expect("key"), "it's");
        assert_eq!(resolve_key(r#""a\tb""#).expect("key"), "a\tb");
        assert_eq!(resolve_key("8080").expect("key"), "8080");
        assert!(resolve_key("").is_err());
        assert!(resolve_key("[a]").is_err());
    }

    #[test]
    fn resolve_scalar_core_schema() {
        assert_eq!(scalar(r#""4""#), json!("4"));
        assert_eq!(scalar("'true'"), json!("true"));
        assert_eq!(scalar("true"), json!(true));
        assert_eq!(scalar("False"), json!(false));
        assert_eq!(scalar("tRuE"), json!("tRuE"));
        assert_eq!(scalar("~"), Value::Null);
        assert_eq!(scalar("NULL"), Value::Null);
        assert_eq!(scalar("nUlL"), json!("nUlL"));
        assert_eq!(scalar("42"), json!(42));
        assert_eq!(scalar("-7"), json!(-7));
        assert_eq!(scalar("+7"), json!(7));
        assert_eq!(scalar("4.5"), json!(4.5));
        assert_eq!(scalar("1e3"), json!(1000.0));
        assert_eq!(scalar("ubuntu-24.04"), json!("ubuntu-24.04"));
        assert_eq!(scalar("8gb"), json!("8gb"));
    }

    #[test]
    fn resolve_scalar_leading_zero_stays_text() {
        assert_eq!(scalar("01"), json!("01"));
        assert_eq!(scalar("-007"), json!("-007"));
        assert_eq!(scalar("0"), json!(0));
        assert_eq!(scalar("01.5"), json!(1.5));
    }

    #[test]
    fn resolve_scalar_radix_integers() {
        assert_eq!(scalar("0x1F"), json!(31));
        assert_eq!(scalar("-0x1F"), json!(-31));
        assert_eq!(scalar("0o17"), json!(15));
        assert_eq!(scalar("0b101"), json!(5));
        assert_eq!(scalar("0x"), json!("0x"));
        assert_eq!(scalar("0X1F"), json!("0X1F"));
    }

    #[test]
    fn resolve_scalar_full_integer_range() {
        assert_eq!(scalar("18446744073709551615"), json!(u64::MAX));
        assert_eq!(scalar("-9223372036854775808"), json!(i64::MIN));
        assert!(resolve_scalar("18446744073709551616").is_err());
        assert!(resolve_scalar("-9223372036854775809").is_err());
    }

    #[test]
    fn resolve_scalar_special_floats() {
        assert_eq!(scalar(".inf"), Value::Null);
        assert_eq!(scalar("-.Inf"), Value::Null);
        assert_eq!(scalar(".NaN"), Value::Null);
        assert_eq!(scalar("nan"), json!("nan"));
        assert_eq!(scalar("inf"), json!("inf"));
    }

    #[test]
    fn resolve_scalar_quote_escapes() {
        assert_eq!(scalar("'it''s'"), json!("it's"));
        assert_eq!(scalar(r#""a\tb""#), json!("a\tb"));
        assert_eq!(scalar(r#""say \"hi\"""#), json!("say \"hi\""));
        assert_eq!(scalar(r#""\u00e9\x41""#), json!("\u{e9}A"));
        assert_eq!(scalar(r#""C:\\tmp""#), json!("C:\\tmp"));
        assert!(resolve_scalar(r#""\q""#).is_err());
        assert!(resolve_scalar(r#""\u00""#).is_err());
        assert!(resolve_scalar(r#""open"#).is_err());
        assert!(resolve_scalar("'a' b").is_err());
    }

    #[test]
    fn resolve_scalar_rejects_unsupported_syntax() {
        for raw in ["[a, b]", "{a: 1}", "&anchor", "*alias", "!tag x", "|", ">", "- a", "-", "a: b", "b:"] {
            assert!(resolve_scalar(raw).is_err(), "accepted {raw}");
        }
        assert_eq!(scalar("-5"), json!(-5));
        assert_eq!(scalar("a-b"), json!("a-b"));
    }
}
