use super::OutputError;
use crate::matching::{MatchRecord, ScoreComponent, SubScores};
use serde::Serialize;
use std::io::Write;

/// One entry of `results.json`.
#[derive(Debug, Serialize)]
pub struct JsonRecord<'a> {
    pub id: &'a str,
    pub score_percent: f64,
    pub source: &'a str,
    pub company: &'a str,
    pub title: &'a str,
    pub location: &'a str,
    pub url: &'a str,
    pub posted_at: Option<&'a str>,
    pub created_at: Option<&'a str>,
    pub updated_at: Option<&'a str>,
    pub required_hit: &'a [String],
    pub required_miss: &'a [String],
    pub preferred_hit: &'a [String],
    pub keywords_hit: &'a [String],
    pub title_hit: bool,
    pub snippet: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Breakdown<'a> {
    pub sub_scores: &'a SubScores,
    pub components: &'a [ScoreComponent],
}

impl<'a> JsonRecord<'a> {
    pub fn new(record: &'a MatchRecord, explain: bool) -> Self {
        let result = &record.result;
        let details = &record.details;

        Self {
            id: &result.posting_id.0,
            score_percent: result.score,
            source: &details.source,
            company: &details.company,
            title: &record.title,
            location: &details.location,
            url: &details.url,
            posted_at: details.posted_at.as_deref(),
            created_at: details.created_at.as_deref(),
            updated_at: details.updated_at.as_deref(),
            required_hit: &result.matched_required,
            required_miss: &result.missing_required,
            preferred_hit: &result.matched_preferred,
            keywords_hit: &result.keywords_hit,
            title_hit: result.title_hit(),
            snippet: &record.snippet,
            breakdown: explain.then_some(Breakdown {
                sub_scores: &result.sub_scores,
                components: &result.components,
            }),
        }
    }
}

/// Writes the records as a pretty-printed JSON array, in the order given.
pub fn write_json<W: Write>(
    writer: W,
    records: &[MatchRecord],
    explain: bool,
) -> Result<(), OutputError> {
    let rows: Vec<JsonRecord<'_>> = records
        .iter()
        .map(|record| JsonRecord::new(record, explain))
        .collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
