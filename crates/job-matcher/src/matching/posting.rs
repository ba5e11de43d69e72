use super::error::ParseError;
use super::normalize::{description_text, extract_years, normalize_text};
use super::resume::matched_names;
use crate::config::SkillVocabulary;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier wrapper for postings; ordering drives ranking tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub String);

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A posting record as fetched from an ATS board or read back from the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        alias = "location_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Source-specific fields (team, department, ...) kept for the cache.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawPosting {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Trimmed identifier, if one is present.
    pub fn posting_id(&self) -> Option<PostingId> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(PostingId::from)
    }

    /// Body text, preferring `content` over `description`.
    pub fn body(&self) -> &str {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or("")
    }

    pub fn has_body(&self) -> bool {
        !self.body().trim().is_empty()
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(id)) => Some(id),
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// Display metadata carried alongside a normalised posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDetails {
    pub source: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub posted_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Normalised posting with skills partitioned into required and preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    pub title: String,
    pub description: String,
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    pub years_required: Option<u32>,
    pub details: PostingDetails,
}

impl JobPosting {
    pub fn from_raw(raw: &RawPosting, vocabulary: &SkillVocabulary) -> Result<Self, ParseError> {
        let id = raw.posting_id().ok_or(ParseError::MissingPostingId)?;
        let title = raw.title.trim().to_string();
        let description = description_text(raw.body());

        if title.is_empty() && description.is_empty() {
            return Err(ParseError::EmptyPosting { id: id.0 });
        }

        let normalized = normalize_text(&format!("{title} {description}"));
        let required_skills = matched_names(&normalized, vocabulary.required.iter());
        let preferred_skills = matched_names(&normalized, vocabulary.preferred.iter());
        let years_required = extract_years(&normalize_text(&description));

        let created_at = raw.created_at.clone();
        let updated_at = raw.updated_at.clone();
        let posted_at = raw
            .posted_at
            .clone()
            .or_else(|| created_at.clone())
            .or_else(|| updated_at.clone());

        Ok(Self {
            id,
            title,
            description,
            required_skills,
            preferred_skills,
            years_required,
            details: PostingDetails {
                source: trimmed(raw.source.as_deref()),
                company: trimmed(raw.company.as_deref()),
                location: trimmed(raw.location.as_deref()),
                url: trimmed(raw.url.as_deref()),
                posted_at,
                created_at,
                updated_at,
            },
        })
    }

    pub fn from_json(
        value: serde_json::Value,
        vocabulary: &SkillVocabulary,
    ) -> Result<Self, ParseError> {
        Self::from_raw(&RawPosting::from_json(value)?, vocabulary)
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyTerm;
    use serde_json::json;

    fn vocabulary() -> SkillVocabulary {
        SkillVocabulary {
            required: vec![VocabularyTerm::new("python"), VocabularyTerm::new("sql")],
            preferred: vec![VocabularyTerm::new("go"), VocabularyTerm::new("airflow")],
            titles: Vec::new(),
        }
    }

    #[test]
    fn from_json_partitions_skills_and_reads_html_content() {
        let posting = JobPosting::from_json(
            json!({
                "id": 4012,
                "title": "Data Engineer",
                "content": "&lt;p&gt;5+ years of Python and SQL. Airflow is a plus.&lt;/p&gt;",
                "company": " acme ",
                "created_at": "2025-01-02T00:00:00Z"
            }),
            &vocabulary(),
        )
        .expect("posting parses");

        assert_eq!(posting.id, PostingId::from("4012"));
        assert_eq!(
            posting.description,
            "5+ years of Python and SQL. Airflow is a plus."
        );
        assert_eq!(
            posting.required_skills.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["python", "sql"]
        );
        assert_eq!(
            posting.preferred_skills.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["airflow"]
        );
        assert_eq!(posting.years_required, Some(5));
        assert_eq!(posting.details.company, "acme");
        assert_eq!(
            posting.details.posted_at.as_deref(),
            Some("2025-01-02T00:00:00Z")
        );
    }

    #[test]
    fn description_field_is_used_when_content_missing() {
        let posting = JobPosting::from_json(
            json!({ "id": "lever-1", "title": "Engineer", "description": "Go services" }),
            &vocabulary(),
        )
        .expect("posting parses");
        assert!(posting.preferred_skills.contains("go"));
        assert!(posting.required_skills.is_empty());
        assert_eq!(posting.years_required, None);
    }

    #[test]
    fn missing_identifier_is_a_parse_error() {
        let err = JobPosting::from_json(json!({ "title": "Engineer" }), &vocabulary())
            .expect_err("no id");
        assert!(matches!(err, ParseError::MissingPostingId));

        let err = JobPosting::from_json(json!({ "id": "  ", "title": "Engineer" }), &vocabulary())
            .expect_err("blank id");
        assert!(matches!(err, ParseError::MissingPostingId));
    }

    #[test]
    fn empty_posting_is_a_parse_error() {
        let err = JobPosting::from_json(
            json!({ "id": "7", "title": " ", "content": "<p> </p>" }),
            &vocabulary(),
        )
        .expect_err("empty");
        match err {
            ParseError::EmptyPosting { id } => assert_eq!(id, "7"),
            other => panic!("expected empty posting error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = JobPosting::from_json(json!({ "id": "1", "title": 42 }), &vocabulary())
            .expect_err("title must be a string");
        assert!(matches!(err, ParseError::InvalidPosting { .. }));
    }

    #[test]
    fn raw_posting_keeps_source_specific_fields() {
        let raw = RawPosting::from_json(json!({
            "id": "abc",
            "title": "Engineer",
            "team": "Platform",
            "content": "",
            "description": "Fallback body"
        }))
        .expect("raw parses");

        assert_eq!(raw.body(), "Fallback body");
        assert_eq!(raw.extra.get("team"), Some(&json!("Platform")));

        let round_trip = serde_json::to_value(&raw).expect("serializes");
        assert_eq!(round_trip["team"], json!("Platform"));
    }
}
