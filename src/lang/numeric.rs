use crate::lang::tokenizing::NumberType;

/// Map one of the fixed backslash escapes recognized by string/character literals (spec §4.6's
/// escape table) to its character.  Unknown escapes pass the character through unchanged.
fn map_escape(escape: char) -> char {
    match escape {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'e' => '\u{1b}',
        'f' => '\u{0c}',
        'n' => '\n',
        'r' => '\r',
        's' => ' ',
        't' => '\t',
        'v' => '\u{0b}',
        'z' | '0' => '\u{00}',
        '?' => '\u{7f}',
        other => other,
    }
}

/// Parse a word's text as a number, honoring the Forth-2012 radix prefixes (`$` hex, `#` decimal,
/// `%` binary, `0x`/`0X` hex, and a leading `0` followed by a digit or `-` for octal) as well as
/// the interpreter's current BASE, before falling back to the supplied default radix.  Also
/// recognizes the `'c'`/`'\c'` character literal forms, which return the character's ordinal
/// value immediately.  Returns None if the text does not parse as a number under the selected
/// radix, in which case the caller should treat it as a word lookup instead.
///
/// A single trailing `.` forces the result to be a floating point value, matching the convention
/// used by `tokenizing::is_number` for plain base-10 literals.  Underscores may be used anywhere
/// in the digit run as a visual separator and are stripped before parsing.
pub fn parse_number(text: &str, default_radix: u32) -> Option<NumberType> {
    if text.is_empty() {
        return None;
    }

    if let Some(value) = parse_char_literal(text) {
        return Some(value);
    }

    let bytes = text.as_bytes();

    let (radix, without_prefix) = match bytes[0] {
        b'$' => (16, &text[1..]),
        b'#' => (10, &text[1..]),
        b'%' => (2, &text[1..]),

        b'0' if bytes.len() > 1 && (bytes[1] == b'x' || bytes[1] == b'X') => (16, &text[2..]),

        b'0' if bytes.len() > 1 && (bytes[1].is_ascii_digit() || bytes[1] == b'-') => {
            (8, &text[1..])
        }

        _ => (default_radix, text),
    };

    if without_prefix.is_empty() {
        return None;
    }

    parse_with_radix(without_prefix, radix)
}

/// Recognize the `'c'` (exactly 3 bytes) and `'\c'` (exactly 4 bytes) character literal forms.
fn parse_char_literal(text: &str) -> Option<NumberType> {
    let bytes = text.as_bytes();

    if bytes.len() == 3 && bytes[0] == b'\'' && bytes[2] == b'\'' {
        return Some(NumberType::Int(bytes[1] as i64));
    }

    if bytes.len() == 4 && bytes[0] == b'\'' && bytes[1] == b'\\' && bytes[3] == b'\'' {
        return Some(NumberType::Int(map_escape(bytes[2] as char) as i64));
    }

    None
}

fn parse_with_radix(text: &str, radix: u32) -> Option<NumberType> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if text.is_empty() {
        return None;
    }

    let cleaned: String = text.chars().filter(|character| *character != '_').collect();

    // Base 10 literals are allowed a decimal point or scientific notation (1E3, 2.5e-1), turning
    // the literal into a float.  Other radixes have no standard floating point notation; `e`/`E`
    // there is just a normal digit (hex's 14), so only `.` is special to them, and even that just
    // fails to parse rather than being treated as a float marker.
    let looks_like_float =
        radix == 10 && cleaned.chars().any(|character| matches!(character, '.' | 'e' | 'E'));

    if looks_like_float {
        return cleaned.parse::<f64>().ok().map(|value| {
            NumberType::Float(if negative { -value } else { value })
        });
    }

    i64::from_str_radix(&cleaned, radix)
        .ok()
        .map(|value| NumberType::Int(if negative { -value } else { value }))
}
