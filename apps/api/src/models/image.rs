use serde::Serialize;

/// File ids mined from a message search, in hit order and not de-duplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReferences {
    pub total_hits: i64,
    pub hits: Vec<String>,
}
