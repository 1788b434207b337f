// src/ingest/extract.rs
//! Pulls the embedded publications array out of the product index page.
//!
//! The page ships the records as the last bracketed array inside inline
//! script. This is a heuristic, not a parser: if the upstream markup changes
//! shape, swap the `PayloadExtractor` implementation rather than callers.

pub trait PayloadExtractor: Send + Sync {
    /// Returns the candidate payload, or `""` when none can be located.
    fn extract<'a>(&self, text: &'a str) -> &'a str;
}

/// Last `[` through last `]`, inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketExtractor;

impl PayloadExtractor for BracketExtractor {
    fn extract<'a>(&self, text: &'a str) -> &'a str {
        extract_last_array(text)
    }
}

pub fn extract_last_array(text: &str) -> &str {
    // Both brackets are ASCII, so the byte offsets are char boundaries.
    match (text.rfind('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_noise() {
        assert_eq!(extract_last_array(r#"noise[{"PubID":1}]"#), r#"[{"PubID":1}]"#);
    }

    #[test]
    fn picks_last_opening_bracket() {
        // earlier arrays on the page are ignored
        let page = r#"var a = [1]; var pubs = [{"PubID":"AFI1"}];</script>"#;
        assert_eq!(extract_last_array(page), r#"[{"PubID":"AFI1"}]"#);
    }

    #[test]
    fn no_opening_bracket_is_degenerate() {
        assert_eq!(extract_last_array("<html>no payload]</html>"), "");
        assert_eq!(extract_last_array(""), "");
    }

    #[test]
    fn closing_before_opening_is_degenerate() {
        assert_eq!(extract_last_array("] then ["), "");
    }

    #[test]
    fn idempotent_on_extracted_array() {
        for raw in [
            r#"x[{"PubID":1}]y"#,
            r#"[{"PubID":1},{"PubID":2}]"#,
            "[]",
        ] {
            let once = extract_last_array(raw);
            assert_eq!(extract_last_array(once), once);
        }
    }

    #[test]
    fn handles_multibyte_text_around_payload() {
        let page = "Übersicht — [{\"PubID\":\"é\"}] ✓";
        assert_eq!(extract_last_array(page), "[{\"PubID\":\"é\"}]");
    }
}
