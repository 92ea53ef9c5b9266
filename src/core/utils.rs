use chrono::{DateTime, Utc};

/// Escapes special characters for Telegram's MarkdownV2 format.
///
/// MarkdownV2 requires escaping of:
/// `_`, `*`, `[`, `]`, `(`, `)`, `~`, `` ` ``, `>`, `#`, `+`, `-`, `=`, `|`, `{`, `}`, `.`, `!`
/// and the backslash itself.
///
/// # Example
///
/// ```
/// use steamdb_bot::core::utils::escape_markdown_v2;
///
/// let escaped = escape_markdown_v2("Hello. World!");
/// assert_eq!(escaped, "Hello\\. World\\!");
/// ```
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}'
            | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Escapes text placed inside a MarkdownV2 inline link target `(...)` or a
/// `` `code` `` span, where only `)`/`` ` `` and `\` are special.
pub fn escape_markdown_v2_entity(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 4);

    for c in text.chars() {
        if matches!(c, '\\' | ')' | '`') {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Truncates `text` to at most `max_len` UTF-16 code units, appending "..."
/// when it was cut. Telegram measures message length in UTF-16 units, so a
/// character outside the BMP counts twice.
pub fn truncate_utf16(text: &str, max_len: usize) -> String {
    if text.encode_utf16().count() <= max_len {
        return text.to_string();
    }

    let budget = max_len.saturating_sub(3);
    let mut used = 0;
    let mut result = String::new();
    for c in text.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        result.push(c);
    }
    result.push_str("...");
    result
}

/// Current time as unix seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Formats a unix timestamp as `YYYY-MM-DD HH:MM:SS` UTC.
pub fn format_unix_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown_v2_special_chars() {
        assert_eq!(escape_markdown_v2("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_markdown_v2("[x](y)"), "\\[x\\]\\(y\\)");
        assert_eq!(escape_markdown_v2("1.5-2!"), "1\\.5\\-2\\!");
        assert_eq!(escape_markdown_v2("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_escape_markdown_v2_leaves_plain_text() {
        assert_eq!(escape_markdown_v2("Gabe Newell 76561197960287930"), "Gabe Newell 76561197960287930");
        assert_eq!(escape_markdown_v2("Привет"), "Привет");
    }

    #[test]
    fn test_escape_entity_only_touches_closing_paren_and_backtick() {
        assert_eq!(
            escape_markdown_v2_entity("https://steamcommunity.com/id/x_(y)/"),
            "https://steamcommunity.com/id/x_(y\\)/"
        );
        assert_eq!(escape_markdown_v2_entity("a`b"), "a\\`b");
    }

    #[test]
    fn test_truncate_utf16() {
        assert_eq!(truncate_utf16("short", 10), "short");
        assert_eq!(truncate_utf16("abcdefghij", 8), "abcde...");
        // multibyte characters are counted, not bytes
        assert_eq!(truncate_utf16("ááááá", 4), "á...");
    }

    #[test]
    fn test_truncate_utf16_counts_surrogate_pairs() {
        // each emoji is two UTF-16 units
        assert_eq!(truncate_utf16("😀😀😀😀", 6), "😀...");

        let long = "😀".repeat(3000);
        assert_eq!(long.chars().count(), 3000);
        let cut = truncate_utf16(&long, 4096);
        assert!(cut.encode_utf16().count() <= 4096);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_format_unix_timestamp() {
        assert_eq!(format_unix_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_unix_timestamp(1_600_000_000), "2020-09-13 12:26:40");
    }
}
