// src/ingest/validate.rs
/// Field every publication record carries.
pub const PUB_ID_MARKER: &str = "PubID";

/// Literal start of a well-formed record array.
pub const RECORD_ARRAY_PREFIX: &str = r#"[{"PubID""#;

/// How strictly an extracted payload is checked before it may overwrite a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Payload must start with `[{"PubID"`.
    #[default]
    Prefix,
    /// Payload must mention `PubID` anywhere.
    Contains,
}

impl ValidationPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" | "strict" => Some(Self::Prefix),
            "contains" | "permissive" => Some(Self::Contains),
            _ => None,
        }
    }

    pub fn is_valid(self, text: &str) -> bool {
        match self {
            Self::Prefix => text.starts_with(RECORD_ARRAY_PREFIX),
            Self::Contains => text.contains(PUB_ID_MARKER),
        }
    }
}

/// Bounded excerpt of a rejected payload for logs and errors.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_accepts_record_array() {
        assert!(ValidationPolicy::Prefix.is_valid(r#"[{"PubID":1}]"#));
    }

    #[test]
    fn prefix_rejects_marker_deep_in_content() {
        let text = r#"[{"title":"x","PubID":1}]"#;
        assert!(!ValidationPolicy::Prefix.is_valid(text));
        assert!(ValidationPolicy::Contains.is_valid(text));
    }

    #[test]
    fn both_reject_missing_marker() {
        for p in [ValidationPolicy::Prefix, ValidationPolicy::Contains] {
            assert!(!p.is_valid(""));
            assert!(!p.is_valid("[]"));
            assert!(!p.is_valid(r#"[{"id":1}]"#));
        }
    }

    #[test]
    fn prefix_is_not_whitespace_tolerant() {
        assert!(!ValidationPolicy::Prefix.is_valid(r#" [{"PubID":1}]"#));
    }

    #[test]
    fn policy_parse_accepts_aliases() {
        assert_eq!(ValidationPolicy::parse("PREFIX"), Some(ValidationPolicy::Prefix));
        assert_eq!(ValidationPolicy::parse("permissive"), Some(ValidationPolicy::Contains));
        assert_eq!(ValidationPolicy::parse("nope"), None);
        assert_eq!(ValidationPolicy::default(), ValidationPolicy::Prefix);
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("abc", 10), "abc");
        assert_eq!(snippet("ééééé", 2), "éé…");
    }
}
