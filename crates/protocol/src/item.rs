use serde::{Deserialize, Deserializer, Serialize};

/// Raw text and metadata handed over by the ingestion collaborator.
///
/// The engine never mutates it. Missing or `null` fields deserialize as empty strings,
/// which every component treats as "no signal".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateText {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub body: String,
    #[serde(default, alias = "source", deserialize_with = "nullable_string")]
    pub source_name: String,
    #[serde(default, alias = "published_at", deserialize_with = "nullable_string")]
    pub published_date: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    /// Language hint from the crawler (`zh`, `en`, ...). Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CandidateText {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Title and body joined by a newline; empty parts are skipped.
    #[must_use]
    pub fn combined(&self) -> String {
        let title = self.title.trim();
        let body = self.body.trim();
        match (title.is_empty(), body.is_empty()) {
            (true, true) => String::new(),
            (false, true) => title.to_string(),
            (true, false) => body.to_string(),
            (false, false) => format!("{title}\n{body}"),
        }
    }
}

/// Threshold profile selector for the density gate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Event,
    #[default]
    Signal,
    Corp,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Event, ContentKind::Signal, ContentKind::Corp];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Event => "event",
            ContentKind::Signal => "signal",
            ContentKind::Corp => "corp",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "event" => Some(ContentKind::Event),
            "signal" => Some(ContentKind::Signal),
            "corp" => Some(ContentKind::Corp),
            _ => None,
        }
    }
}

/// One news card: the candidate text plus the structured list fields a report needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    /// Stable identity from the collaborator. When absent the engine derives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub text: CandidateText,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default, deserialize_with = "nullable_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub facts: Vec<String>,
    /// Source material for action bullets.
    #[serde(default, deserialize_with = "nullable_list")]
    pub observations: Vec<String>,
    /// Source material for risk bullets.
    #[serde(default, deserialize_with = "nullable_list")]
    pub effects: Vec<String>,
    /// Sentences pre-drafted by an LLM collaborator. Untrusted until vetted.
    #[serde(default, deserialize_with = "nullable_list")]
    pub drafts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

impl NewsItem {
    #[must_use]
    pub fn from_text(text: CandidateText) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_and_missing_fields_degrade_to_empty() {
        let raw = r#"{"title":null,"body":"Body text","facts":[null,"fact"],"published_at":"2025-01-02"}"#;
        let item: NewsItem = serde_json::from_str(raw).expect("item");
        assert_eq!(item.text.title, "");
        assert_eq!(item.text.body, "Body text");
        assert_eq!(item.text.published_date, "2025-01-02");
        assert_eq!(item.facts, vec!["fact".to_string()]);
        assert_eq!(item.kind, ContentKind::Signal);
        assert!(item.observations.is_empty());
    }

    #[test]
    fn combined_skips_empty_parts() {
        assert_eq!(CandidateText::new("", "  body ").combined(), "body");
        assert_eq!(CandidateText::new("Title", "").combined(), "Title");
        assert_eq!(CandidateText::new("Title", "Body").combined(), "Title\nBody");
        assert_eq!(CandidateText::new(" ", " ").combined(), "");
    }

    #[test]
    fn content_kind_parses_case_insensitively() {
        assert_eq!(ContentKind::parse("EVENT"), Some(ContentKind::Event));
        assert_eq!(ContentKind::parse(" corp "), Some(ContentKind::Corp));
        assert_eq!(ContentKind::parse("news"), None);
    }
}
