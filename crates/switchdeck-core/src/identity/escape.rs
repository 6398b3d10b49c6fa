//! Reversible escaping of control characters in window titles.
//!
//! Control characters (0x00-0x1F, 0x7F) become literal `\xNN` tokens. A
//! backslash that would otherwise read as the start of such a token is
//! written as `\x5c`, so unescaping restores any input exactly.

const BACKSLASH_CODE: u32 = 0x5c;

fn is_control(code: u32) -> bool {
    code < 0x20 || code == 0x7f
}

/// Parse the two hex digits following a `\x` at `bytes[i]`, if present.
fn token_at(bytes: &[u8], i: usize) -> Option<u32> {
    if bytes.get(i) != Some(&b'\\') || bytes.get(i + 1) != Some(&b'x') {
        return None;
    }
    let hex = bytes.get(i + 2..i + 4)?;
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let hex = std::str::from_utf8(hex).ok()?;
    u32::from_str_radix(hex, 16).ok()
}

fn is_decodable(code: u32) -> bool {
    is_control(code) || code == BACKSLASH_CODE
}

pub fn escape_title(title: &str) -> String {
    let bytes = title.as_bytes();
    let mut out = String::with_capacity(title.len());
    for (i, ch) in title.char_indices() {
        let code = ch as u32;
        if is_control(code) {
            out.push_str(&format!("\\x{code:02x}"));
        } else if ch == '\\' && token_at(bytes, i).is_some_and(is_decodable) {
            out.push_str("\\x5c");
        } else {
            out.push(ch);
        }
    }
    out
}

/// Turn `\xNN` tokens for control characters (and `\x5c`) back into characters.
/// Any other text passes through unchanged.
pub fn unescape_title(escaped: &str) -> String {
    let bytes = escaped.as_bytes();
    let mut out = String::with_capacity(escaped.len());
    let mut i = 0;
    while i < bytes.len() {
        if let Some(code) = token_at(bytes, i).filter(|&c| is_decodable(c))
            && let Some(ch) = char::from_u32(code)
        {
            out.push(ch);
            i += 4;
            continue;
        }
        // Copy one full UTF-8 character.
        let ch_len = escaped[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&escaped[i..i + ch_len]);
        i += ch_len;
    }
    out
}
