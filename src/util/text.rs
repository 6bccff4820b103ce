use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of `s` in terminal columns (CJK and emoji count double).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// Widths of three columns or less have no room for the ellipsis, so the
/// text is cut without one. Returns `Cow::Borrowed` when `s` already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let width = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        end = idx + c.len_utf8();
    }
    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

fn is_control(c: char) -> bool {
    c == '\x7f' || (c < '\x20' && !matches!(c, '\t' | '\n' | '\r'))
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Category and topic names come from the forum and end up on the terminal,
/// so CSI (`ESC [` ... final byte) and OSC (`ESC ]` ... BEL or `ESC \`)
/// sequences are dropped whole. Tab, newline and carriage return survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_control(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert!(matches!(truncate_to_width("News", 10), Cow::Borrowed(_)));
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_to_width("Engineering Security", 11), "Engineer...");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character is two columns.
        assert_eq!(truncate_to_width("日本語ニュース", 7), "日本...");
        assert_eq!(truncate_to_width("日本", 3), "日");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_strip_clean_text_is_borrowed() {
        let input = "Engineering\tSecurity\n";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_ansi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mNews\x1b[0m"), "News");
        assert_eq!(
            strip_control_chars("\x1b]0;pwned\x07Security"),
            "Security"
        );
        assert_eq!(
            strip_control_chars("\x1b]0;pwned\x1b\\Security"),
            "Security"
        );
    }

    #[test]
    fn test_strip_plain_controls() {
        assert_eq!(strip_control_chars("Ne\x00ws\x7f\x1b"), "News");
    }

    #[test]
    fn test_strip_keeps_unicode() {
        assert_eq!(strip_control_chars("日本\x1b[1m語"), "日本語");
    }
}
