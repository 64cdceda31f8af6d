//! Quoted-string processing
//!
//! The lexer hands over string literals still delimited and escaped; this
//! module turns them into the words they denote.

use std::str::Chars;

/// Unquote a double-quoted or backtick string literal.
///
/// Backtick strings are taken verbatim (carriage returns dropped).
/// Double-quoted strings accept `\a \b \f \n \r \t \v \\ \"`, `\xHH`,
/// three-digit octal `\OOO`, `\uHHHH` and `\UHHHHHHHH`. Byte escapes may
/// combine into multi-byte characters, but the result must be valid UTF-8.
pub fn unquote(literal: &str) -> Result<String, String> {
    if let Some(body) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Ok(body.replace('\r', ""));
    }

    let body = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| "string is not quoted".to_string())?;

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescape(&mut chars, &mut out)?,
            '"' => return Err("unescaped quote".to_string()),
            '\n' => return Err("newline in string".to_string()),
            c => push_char(&mut out, c),
        }
    }

    String::from_utf8(out).map_err(|_| "escapes do not form valid UTF-8".to_string())
}

/// Decode one escape sequence; the backslash is already consumed.
fn unescape(chars: &mut Chars<'_>, out: &mut Vec<u8>) -> Result<(), String> {
    let esc = chars
        .next()
        .ok_or_else(|| "backslash at end of string".to_string())?;
    match esc {
        'a' => out.push(0x07),
        'b' => out.push(0x08),
        'f' => out.push(0x0c),
        'n' => out.push(b'\n'),
        'r' => out.push(b'\r'),
        't' => out.push(b'\t'),
        'v' => out.push(0x0b),
        '\\' => out.push(b'\\'),
        '"' => out.push(b'"'),
        'x' => {
            let byte = take_digits(chars, 2, 16)?;
            out.push(byte as u8);
        }
        '0'..='7' => {
            let rest = take_digits(chars, 2, 8)?;
            let value = (esc as u32 - '0' as u32) * 64 + rest;
            if value > 0xff {
                return Err(format!("octal escape \\{esc}.. is out of range"));
            }
            out.push(value as u8);
        }
        'u' => push_code_point(out, take_digits(chars, 4, 16)?)?,
        'U' => push_code_point(out, take_digits(chars, 8, 16)?)?,
        other => return Err(format!("unknown escape sequence \\{other}")),
    }
    Ok(())
}

fn take_digits(chars: &mut Chars<'_>, count: usize, radix: u32) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| format!("escape needs {count} base-{radix} digits"))?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn push_code_point(out: &mut Vec<u8>, code: u32) -> Result<(), String> {
    let c = char::from_u32(code).ok_or_else(|| format!("invalid code point U+{code:04X}"))?;
    push_char(out, c);
    Ok(())
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_strings_are_verbatim() {
        assert_eq!(unquote("`a\\n b`").unwrap(), "a\\n b");
        assert_eq!(unquote("`line1\r\nline2`").unwrap(), "line1\nline2");
        assert_eq!(unquote("``").unwrap(), "");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unquote(r#""x y\t""#).unwrap(), "x y\t");
        assert_eq!(unquote(r#""x\"y\t\"""#).unwrap(), "x\"y\t\"");
        assert_eq!(unquote(r#""a\\b""#).unwrap(), "a\\b");
        assert_eq!(unquote(r#""\a\b\f\v""#).unwrap(), "\u{7}\u{8}\u{c}\u{b}");
        assert_eq!(unquote(r#""""#).unwrap(), "");
    }

    #[test]
    fn test_numeric_escapes() {
        assert_eq!(unquote(r#""\x41\102""#).unwrap(), "AB");
        assert_eq!(unquote(r#""é\U0001F600""#).unwrap(), "é😀");
        // UTF-8 spelled out byte by byte
        assert_eq!(unquote(r#""\xc3\xa9""#).unwrap(), "é");
    }

    #[test]
    fn test_invalid_strings() {
        assert!(unquote(r#""\q""#).unwrap_err().contains("unknown escape"));
        assert!(unquote(r#""\x4""#).unwrap_err().contains("digits"));
        assert!(unquote(r#""\777""#).unwrap_err().contains("out of range"));
        assert!(unquote(r#""\ud800""#).unwrap_err().contains("code point"));
        assert!(unquote(r#""\xff""#).unwrap_err().contains("UTF-8"));
        assert!(unquote("plain").is_err());
    }
}
