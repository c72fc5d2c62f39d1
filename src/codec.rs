//! String escaping for JSON string literals
//!
//! Only seven characters are handled: `"`, `\`, `/`, backspace, form-feed,
//! newline and tab. Unicode escapes (`\uXXXX`) are never produced nor
//! interpreted; they pass through both directions as literal text.

/// Escape sequences applied by [`serialize`], in application order.
///
/// The reverse solidus must come first so backslashes inserted by later
/// replacements are not escaped twice.
const ESCAPES: [(&str, &str); 7] = [
    ("\\", "\\\\"),
    ("\"", "\\\""),
    ("/", "\\/"),
    ("\u{8}", "\\b"),
    ("\u{c}", "\\f"),
    ("\n", "\\n"),
    ("\t", "\\t"),
];

/// Escape `text` so it can be embedded between double quotes in JSON
pub fn serialize(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (raw, escaped)| acc.replace(raw, escaped))
}

/// Undo [`serialize`]
///
/// Scans left to right so that an escaped backslash is never re-read as the
/// start of another escape (`\\n` decodes to backslash + `n`, not to a
/// newline). Unknown sequences such as `\u0065` are kept verbatim.
pub fn deserialize(escaped: &str) -> String {
    let mut text = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some(next) => match unescape(next) {
                Some(raw) => text.push(raw),
                None => {
                    text.push('\\');
                    text.push(next);
                }
            },
            None => text.push('\\'),
        }
    }

    text
}

/// Map the character following a backslash back to the raw character
fn unescape(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        '"' => Some('"'),
        '/' => Some('/'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        't' => Some('\t'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotation_mark() {
        assert_eq!(serialize("\""), "\\\"");
        assert_eq!(deserialize("\\\""), "\"");
        assert_eq!(deserialize(&serialize("\"")), "\"");
    }

    #[test]
    fn test_reverse_solidus() {
        assert_eq!(serialize("\\"), "\\\\");
        assert_eq!(deserialize("\\\\"), "\\");
        assert_eq!(deserialize(&serialize("\\")), "\\");
    }

    #[test]
    fn test_solidus() {
        assert_eq!(serialize("/"), "\\/");
        assert_eq!(deserialize("\\/"), "/");
        assert_eq!(deserialize(&serialize("/")), "/");
    }

    #[test]
    fn test_backspace() {
        assert_eq!(serialize("\u{8}"), "\\b");
        assert_eq!(deserialize("\\b"), "\u{8}");
        assert_eq!(deserialize(&serialize("\u{8}")), "\u{8}");
    }

    #[test]
    fn test_form_feed() {
        assert_eq!(serialize("\u{c}"), "\\f");
        assert_eq!(deserialize("\\f"), "\u{c}");
        assert_eq!(deserialize(&serialize("\u{c}")), "\u{c}");
    }

    #[test]
    fn test_newline() {
        assert_eq!(serialize("\n"), "\\n");
        assert_eq!(deserialize("\\n"), "\n");
        assert_eq!(deserialize(&serialize("\n")), "\n");
    }

    #[test]
    fn test_horizontal_tab() {
        assert_eq!(serialize("\t"), "\\t");
        assert_eq!(deserialize("\\t"), "\t");
        assert_eq!(deserialize(&serialize("\t")), "\t");
    }

    #[test]
    fn test_unicode_escape_left_untouched() {
        let unicode = "\\u0065";

        assert_eq!(deserialize(unicode), unicode);
        assert_eq!(deserialize(&serialize(unicode)), unicode);
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(serialize("com.example.typeA, 42 é"), "com.example.typeA, 42 é");
    }

    #[test]
    fn test_escaped_backslash_is_not_reread() {
        assert_eq!(deserialize("\\\\n"), "\\n");
        assert_eq!(deserialize(&serialize("C:\\path\\to\\file")), "C:\\path\\to\\file");
    }

    #[test]
    fn test_trailing_backslash_kept() {
        assert_eq!(deserialize("end\\"), "end\\");
    }

    #[test]
    fn test_mixed_round_trip() {
        let samples = [
            "say \"hi\"\n\tthen/leave",
            "C:\\path\\to\\file",
            "\u{8}\u{c}\"\\/\n\t",
            "line one\nline two, with comma",
            "",
        ];

        for sample in samples {
            assert_eq!(deserialize(&serialize(sample)), sample, "sample: {:?}", sample);
        }
    }
}
