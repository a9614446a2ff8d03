use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside RFC 3986's "unreserved" set gets percent-encoded
const URI_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escapes the five HTML-significant characters
///
/// `&`, `<`, `>`, `"`, and `'` become `&amp;`, `&lt;`, `&gt;`, `&#34;`, and
/// `&#39;`. Everything else passes through unchanged, so escaping an
/// already-escaped string double-escapes its ampersands.
pub fn html_escape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&#34;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Percent-encodes everything outside RFC 3986's unreserved set
pub fn uri_escape(input: &str) -> String {
    utf8_percent_encode(input, URI_ESCAPE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_five_entities() {
        assert_eq!(html_escape("&<>\"'"), "&amp;&lt;&gt;&#34;&#39;");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_escape("hello, world"), "hello, world");
        assert_eq!(html_escape(""), "");
    }

    // A second pass over escaped output re-escapes the ampersands the first
    // pass introduced.
    #[test]
    fn escaping_is_not_idempotent_over_escaped_input() {
        let once = html_escape("<a&b>");
        assert_eq!(once, "&lt;a&amp;b&gt;");
        assert_eq!(html_escape(&once), "&amp;lt;a&amp;amp;b&amp;gt;");

        // Escaped input with no source characters left is a fixed point.
        assert_eq!(html_escape("plain text 123"), "plain text 123");
    }

    #[test]
    fn uri_escape_keeps_the_unreserved_set() {
        assert_eq!(uri_escape("AZaz09-._~"), "AZaz09-._~");
        assert_eq!(uri_escape("a b&c"), "a%20b%26c");
        assert_eq!(uri_escape("/path?q=1"), "%2Fpath%3Fq%3D1");
    }

    #[test]
    fn uri_escape_encodes_multibyte_input_per_byte() {
        assert_eq!(uri_escape("é"), "%C3%A9");
    }
}
