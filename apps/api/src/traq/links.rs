use regex::Regex;

use crate::error::{AppError, AppResult};

const UUID_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

/// Finds file ids embedded in message text as `<web base>/files/<uuid>` links.
#[derive(Debug, Clone)]
pub struct FileLinkMatcher {
    base: String,
    pattern: Regex,
}

impl FileLinkMatcher {
    /// `web_base` is e.g. `https://q.trap.jp`; links are matched over http and https.
    pub fn new(web_base: &str) -> AppResult<Self> {
        let base = web_base.trim_end_matches('/').to_string();
        let host = base
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&base);

        let pattern = Regex::new(&format!(
            r"https?://{}/files/({})",
            regex::escape(host),
            UUID_PATTERN
        ))
        .map_err(|e| AppError::Internal(format!("invalid file link pattern: {}", e)))?;

        Ok(Self { base, pattern })
    }

    /// File ids in order of appearance. Repeats are kept.
    pub fn extract(&self, content: &str) -> Vec<String> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base, file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const B: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn matcher() -> FileLinkMatcher {
        FileLinkMatcher::new("https://q.trap.jp").unwrap()
    }

    #[test]
    fn test_extract_none() {
        assert!(matcher().extract("no links here").is_empty());
        assert!(matcher().extract("").is_empty());
    }

    #[test]
    fn test_extract_single() {
        let content = format!("see https://q.trap.jp/files/{}", A);
        assert_eq!(matcher().extract(&content), vec![A]);
    }

    #[test]
    fn test_extract_pair_in_order() {
        let content = format!(
            "https://q.trap.jp/files/{} and http://q.trap.jp/files/{}",
            B, A
        );
        assert_eq!(matcher().extract(&content), vec![B, A]);
    }

    #[test]
    fn test_extract_keeps_repeats() {
        let content = format!(
            "https://q.trap.jp/files/{a} https://q.trap.jp/files/{a}",
            a = A
        );
        assert_eq!(matcher().extract(&content), vec![A, A]);
    }

    #[test]
    fn test_malformed_uuid_is_not_matched() {
        assert!(matcher()
            .extract("https://q.trap.jp/files/550e840-e29b-41d4-a716-446655440000")
            .is_empty());
        assert!(matcher()
            .extract("https://q.trap.jp/files/not-a-uuid")
            .is_empty());
    }

    #[test]
    fn test_other_hosts_are_ignored() {
        let content = format!("https://example.com/files/{}", A);
        assert!(matcher().extract(&content).is_empty());
        let lookalike = format!("https://qxtrap.jp/files/{}", A);
        assert!(matcher().extract(&lookalike).is_empty());
    }

    #[test]
    fn test_file_url_trims_trailing_slash() {
        let matcher = FileLinkMatcher::new("https://q.trap.jp/").unwrap();
        assert_eq!(
            matcher.file_url(A),
            format!("https://q.trap.jp/files/{}", A)
        );
    }
}
