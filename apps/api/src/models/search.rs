use serde::Deserialize;

/// Query for the platform's `GET /messages` search. Unset fields are omitted.
///
/// `after`/`before` are passed through untouched; the platform validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageSearchParams {
    pub word: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    /// Channel id.
    pub in_channel: Option<String>,
    pub to: Vec<String>,
    pub from: Vec<String>,
    /// Message id.
    pub citation: Option<String>,
    pub bot: Option<bool>,
    pub has_url: Option<bool>,
    pub has_attachments: Option<bool>,
    pub has_image: Option<bool>,
    pub has_video: Option<bool>,
    pub has_audio: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `createdAt`, `-createdAt`, `updatedAt` or `-updatedAt`.
    pub sort: Option<String>,
}

impl MessageSearchParams {
    /// Query pairs in a fixed key order; repeated keys for `to`/`from`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let text = [
            ("word", &self.word),
            ("after", &self.after),
            ("before", &self.before),
            ("in", &self.in_channel),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }

        for (key, values) in [("to", &self.to), ("from", &self.from)] {
            for v in values.iter().filter(|v| !v.is_empty()) {
                pairs.push((key, v.clone()));
            }
        }

        if let Some(v) = self.citation.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("citation", v.to_string()));
        }

        let flags = [
            ("bot", self.bot),
            ("hasURL", self.has_url),
            ("hasAttachments", self.has_attachments),
            ("hasImage", self.has_image),
            ("hasVideo", self.has_video),
            ("hasAudio", self.has_audio),
        ];
        for (key, value) in flags {
            if let Some(b) = value {
                pairs.push((key, b.to_string()));
            }
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(v) = self.sort.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("sort", v.to_string()));
        }

        pairs
    }
}

/// Raw search query as received from the client.
#[derive(Debug, Default, Deserialize)]
pub struct MessageSearchQuery {
    pub word: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    #[serde(rename = "in")]
    pub in_channel: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub from: Vec<String>,
    pub citation: Option<String>,
    pub bot: Option<String>,
    #[serde(rename = "hasURL")]
    pub has_url: Option<String>,
    #[serde(rename = "hasAttachments")]
    pub has_attachments: Option<String>,
    #[serde(rename = "hasImage")]
    pub has_image: Option<String>,
    #[serde(rename = "hasVideo")]
    pub has_video: Option<String>,
    #[serde(rename = "hasAudio")]
    pub has_audio: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort: Option<String>,
}

/// `true`/`1` is true, any other non-empty value false, empty is unset.
fn query_flag(value: &Option<String>) -> Option<bool> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v == "true" || v == "1")
}

fn query_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<MessageSearchQuery> for MessageSearchParams {
    fn from(query: MessageSearchQuery) -> Self {
        Self {
            bot: query_flag(&query.bot),
            has_url: query_flag(&query.has_url),
            has_attachments: query_flag(&query.has_attachments),
            has_image: query_flag(&query.has_image),
            has_video: query_flag(&query.has_video),
            has_audio: query_flag(&query.has_audio),
            limit: query_int(&query.limit),
            offset: query_int(&query.offset),
            word: non_empty(query.word),
            after: non_empty(query.after),
            before: non_empty(query.before),
            in_channel: non_empty(query.in_channel),
            to: query.to,
            from: query.from,
            citation: non_empty(query.citation),
            sort: non_empty(query.sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_produce_no_pairs() {
        assert!(MessageSearchParams::default().to_query_pairs().is_empty());
    }

    #[test]
    fn test_pairs_follow_fixed_key_order() {
        let params = MessageSearchParams {
            word: Some("cat".into()),
            to: vec!["u1".into(), "u2".into()],
            from: vec!["f1".into()],
            has_image: Some(true),
            bot: Some(false),
            limit: Some(5),
            sort: Some("createdAt".into()),
            ..Default::default()
        };

        let pairs = params.to_query_pairs();
        let expected: Vec<(&str, String)> = vec![
            ("word", "cat".into()),
            ("to", "u1".into()),
            ("to", "u2".into()),
            ("from", "f1".into()),
            ("bot", "false".into()),
            ("hasImage", "true".into()),
            ("limit", "5".into()),
            ("sort", "createdAt".into()),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_blank_values_are_omitted() {
        let params = MessageSearchParams {
            word: Some(String::new()),
            to: vec![String::new(), "u1".into()],
            citation: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.to_query_pairs(), vec![("to", "u1".to_string())]);
    }

    #[test]
    fn test_every_key_is_emitted() {
        let params = MessageSearchParams {
            word: Some("w".into()),
            after: Some("2024-01-01T00:00:00Z".into()),
            before: Some("2024-02-01T00:00:00Z".into()),
            in_channel: Some("c".into()),
            to: vec!["t".into()],
            from: vec!["f".into()],
            citation: Some("m".into()),
            bot: Some(true),
            has_url: Some(true),
            has_attachments: Some(false),
            has_image: Some(true),
            has_video: Some(false),
            has_audio: Some(true),
            limit: Some(10),
            offset: Some(20),
            sort: Some("-createdAt".into()),
        };

        let keys: Vec<&str> = params.to_query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "word",
                "after",
                "before",
                "in",
                "to",
                "from",
                "citation",
                "bot",
                "hasURL",
                "hasAttachments",
                "hasImage",
                "hasVideo",
                "hasAudio",
                "limit",
                "offset",
                "sort",
            ]
        );
    }

    #[test]
    fn test_query_conversion_parses_flags_and_numbers() {
        let query = MessageSearchQuery {
            bot: Some("1".into()),
            has_url: Some("yes".into()),
            has_video: Some(String::new()),
            limit: Some("abc".into()),
            offset: Some("40".into()),
            word: Some(String::new()),
            ..Default::default()
        };

        let params = MessageSearchParams::from(query);
        assert_eq!(params.bot, Some(true));
        assert_eq!(params.has_url, Some(false));
        assert_eq!(params.has_video, None);
        assert_eq!(params.limit, None);
        assert_eq!(params.offset, Some(40));
        assert_eq!(params.word, None);
    }
}
