//! Greenhouse job board: list endpoint plus per-job detail with delta reuse.

use super::{AtsKind, BoardClient, SourceError};
use crate::matching::RawPosting;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{info, warn};

fn job_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)/jobs/(\d+)").expect("valid job path pattern"))
}

#[derive(Debug, Default, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSummary {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub absolute_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl JobSummary {
    fn url(&self) -> String {
        first_non_empty(&[self.absolute_url.as_deref(), self.url.as_deref()])
    }

    fn title(&self) -> String {
        first_non_empty(&[self.title.as_deref()])
    }

    /// Board id, else the numeric id in the job URL, else a composite key.
    pub fn stable_id(&self, company: &str) -> String {
        match &self.id {
            Some(Value::Number(id)) => return id.to_string(),
            Some(Value::String(id)) if !id.trim().is_empty() => return id.trim().to_string(),
            _ => {}
        }

        let url = self.url();
        if let Some(caps) = job_path_pattern().captures(&url) {
            return caps[1].to_string();
        }
        format!("{company}:{}:{url}", self.title())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDetail {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl JobDetail {
    /// Location is either a plain string or `{ "name": ... }`.
    fn location(&self) -> String {
        match &self.location {
            Some(Value::String(name)) => name.trim().to_string(),
            Some(Value::Object(fields)) => fields
                .get("name")
                .and_then(Value::as_str)
                .map(|name| name.trim().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

fn first_non_empty(values: &[Option<&str>]) -> String {
    values
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// A cached record can stand in for the detail call when nothing changed upstream.
pub fn reusable(cached: Option<&RawPosting>, listed_updated_at: Option<&str>) -> bool {
    cached.is_some_and(|posting| {
        posting.updated_at.as_deref() == listed_updated_at
            && posting
                .content
                .as_deref()
                .is_some_and(|content| !content.trim().is_empty())
    })
}

/// Builds the cache record from a list entry and its detail payload.
pub fn to_raw_posting(company: &str, summary: &JobSummary, detail: &JobDetail) -> RawPosting {
    let listed_updated_at = summary.updated_at.clone();

    RawPosting {
        id: Some(summary.stable_id(company)),
        source: Some(AtsKind::Greenhouse.to_string()),
        company: Some(company.to_string()),
        title: summary.title(),
        location: Some(detail.location()),
        content: Some(detail.content.clone().unwrap_or_default()),
        description: None,
        url: Some(summary.url()),
        posted_at: detail
            .created_at
            .clone()
            .or_else(|| listed_updated_at.clone()),
        created_at: detail.created_at.clone(),
        updated_at: detail.updated_at.clone().or(listed_updated_at),
        extra: BTreeMap::new(),
    }
}

/// Fetches a board, reusing `cached` records whose `updated_at` is unchanged.
///
/// A missing board yields an empty list. Detail failures skip only that job.
pub async fn fetch(
    client: &BoardClient,
    company: &str,
    cached: &BTreeMap<String, RawPosting>,
) -> Result<Vec<RawPosting>, SourceError> {
    let list_url = client.greenhouse_jobs_url(company);
    let Some(list) = client.get_json::<JobList>(&list_url).await? else {
        warn!(company, "no greenhouse board found");
        return Ok(Vec::new());
    };

    let mut postings = Vec::with_capacity(list.jobs.len());
    let mut reused = 0usize;

    for summary in &list.jobs {
        let job_id = summary.stable_id(company);
        let existing = cached.get(&job_id);

        if reusable(existing, summary.updated_at.as_deref()) {
            if let Some(existing) = existing {
                postings.push(existing.clone());
                reused += 1;
                continue;
            }
        }

        let detail_url = client.greenhouse_job_url(company, &job_id);
        match client.get_json::<JobDetail>(&detail_url).await {
            Ok(Some(detail)) => postings.push(to_raw_posting(company, summary, &detail)),
            Ok(None) => {
                warn!(company, posting_id = %job_id, url = %summary.url(), "greenhouse detail not found");
            }
            Err(err) => {
                warn!(company, posting_id = %job_id, error = %err, "greenhouse detail fetch failed");
            }
        }
    }

    info!(
        company,
        listed = list.jobs.len(),
        reused,
        fetched = postings.len() - reused,
        "greenhouse board fetched"
    );
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(value: Value) -> JobSummary {
        serde_json::from_value(value).expect("summary parses")
    }

    #[test]
    fn stable_id_prefers_board_id_then_url() {
        assert_eq!(summary(json!({ "id": 4012 })).stable_id("acme"), "4012");
        assert_eq!(
            summary(json!({ "absolute_url": "https://boards.greenhouse.io/acme/Jobs/778?gh_src=x" }))
                .stable_id("acme"),
            "778"
        );
        assert_eq!(
            summary(json!({ "title": " Data Engineer ", "absolute_url": "https://acme.io/careers" }))
                .stable_id("acme"),
            "acme:Data Engineer:https://acme.io/careers"
        );
    }

    #[test]
    fn detail_location_accepts_string_or_object() {
        let object: JobDetail =
            serde_json::from_value(json!({ "location": { "name": " Remote - US " } }))
                .expect("detail parses");
        let plain: JobDetail =
            serde_json::from_value(json!({ "location": "Denver, CO" })).expect("detail parses");
        assert_eq!(object.location(), "Remote - US");
        assert_eq!(plain.location(), "Denver, CO");
        assert_eq!(JobDetail::default().location(), "");
    }

    #[test]
    fn raw_posting_falls_back_to_listed_timestamps() {
        let summary = summary(json!({
            "id": 9,
            "title": "Platform Engineer",
            "absolute_url": "https://boards.greenhouse.io/acme/jobs/9",
            "updated_at": "2025-03-01T10:00:00-05:00"
        }));
        let detail: JobDetail = serde_json::from_value(json!({
            "content": "&lt;p&gt;Rust&lt;/p&gt;",
            "location": { "name": "Remote" }
        }))
        .expect("detail parses");

        let raw = to_raw_posting("acme", &summary, &detail);

        assert_eq!(raw.id.as_deref(), Some("9"));
        assert_eq!(raw.source.as_deref(), Some("greenhouse"));
        assert_eq!(raw.location.as_deref(), Some("Remote"));
        assert_eq!(raw.created_at, None);
        assert_eq!(raw.updated_at.as_deref(), Some("2025-03-01T10:00:00-05:00"));
        assert_eq!(raw.posted_at.as_deref(), Some("2025-03-01T10:00:00-05:00"));
    }

    #[test]
    fn reuse_requires_same_timestamp_and_content() {
        let cached = RawPosting {
            id: Some("1".to_string()),
            content: Some("<p>Body</p>".to_string()),
            updated_at: Some("2025-01-01".to_string()),
            ..RawPosting::default()
        };
        assert!(reusable(Some(&cached), Some("2025-01-01")));
        assert!(!reusable(Some(&cached), Some("2025-02-01")));
        assert!(!reusable(None, Some("2025-01-01")));

        let empty = RawPosting {
            content: Some("  ".to_string()),
            ..cached
        };
        assert!(!reusable(Some(&empty), Some("2025-01-01")));
    }
}
