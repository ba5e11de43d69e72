//! Lever postings API: one call per company, normalised into cache records.

use super::{AtsKind, BoardClient, SourceError};
use crate::matching::{contains_phrase, is_remote, normalize_text, RawPosting};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverPosting {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub hosted_url: Option<String>,
    #[serde(default)]
    pub categories: Option<Categories>,
    #[serde(default)]
    pub workplace_type: Option<String>,
    #[serde(default)]
    pub description_plain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub commitment: Option<String>,
}

fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Epoch milliseconds (number or numeric string) as an RFC 3339 UTC timestamp.
pub fn millis_to_rfc3339(value: Option<&Value>) -> Option<String> {
    let millis = match value? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if millis <= 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis).map(|timestamp| timestamp.to_rfc3339())
}

/// Joins non-empty parts with ` | `, dropping case-insensitive repeats.
fn join_unique(parts: &[String]) -> String {
    let mut seen = BTreeSet::new();
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty() && seen.insert(part.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Converts one API posting into a cache record.
pub fn to_raw_posting(company: &str, posting: &LeverPosting) -> RawPosting {
    let categories = posting.categories.clone().unwrap_or_default();
    let category_location = clean(categories.location.as_deref());
    let workplace_type = clean(posting.workplace_type.as_deref());
    let commitment = clean(categories.commitment.as_deref());
    let title = clean(posting.text.as_deref());
    let plain = clean(posting.description_plain.as_deref());
    let html = clean(posting.description.as_deref());

    let mut parts = vec![
        category_location.clone(),
        workplace_type.clone(),
        commitment.clone(),
    ];

    let signals = normalize_text(&[
        category_location.as_str(),
        workplace_type.as_str(),
        commitment.as_str(),
        title.as_str(),
        plain.as_str(),
        html.as_str(),
    ]
    .join(" "));

    let joined = parts.join(" ").to_lowercase();
    if is_remote(&signals) && !joined.contains("remote") {
        parts.push("remote".to_string());
    }
    if contains_phrase(&signals, "hybrid") && !joined.contains("hybrid") {
        parts.push("hybrid".to_string());
    }

    let location = join_unique(&parts);
    let content = if plain.is_empty() { html } else { plain };
    let created_at = millis_to_rfc3339(posting.created_at.as_ref());

    let mut extra = BTreeMap::new();
    extra.insert("team".to_string(), Value::String(clean(categories.team.as_deref())));
    extra.insert(
        "department".to_string(),
        Value::String(clean(categories.department.as_deref())),
    );
    extra.insert("commitment".to_string(), Value::String(commitment));

    RawPosting {
        id: Some(clean(posting.id.as_deref())),
        source: Some(AtsKind::Lever.to_string()),
        company: Some(company.to_string()),
        title,
        location: Some(location),
        content: Some(content.clone()),
        description: Some(content),
        url: Some(clean(posting.hosted_url.as_deref())),
        posted_at: created_at.clone(),
        created_at,
        updated_at: millis_to_rfc3339(posting.updated_at.as_ref()),
        extra,
    }
}

/// Decodes the postings array, skipping entries that are not objects.
pub fn parse_postings(company: &str, payload: Value) -> Vec<RawPosting> {
    let Value::Array(entries) = payload else {
        warn!(company, "lever payload is not an array");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<LeverPosting>(entry) {
            Ok(posting) => Some(to_raw_posting(company, &posting)),
            Err(err) => {
                warn!(company, error = %err, "skipping malformed lever posting");
                None
            }
        })
        .collect()
}

pub async fn fetch(client: &BoardClient, company: &str) -> Result<Vec<RawPosting>, SourceError> {
    let url = client.lever_postings_url(company);
    let Some(payload) = client.get_json::<Value>(&url).await? else {
        warn!(company, "no lever board found");
        return Ok(Vec::new());
    };

    let postings = parse_postings(company, payload);
    info!(company, fetched = postings.len(), "lever board fetched");
    Ok(postings)
}
