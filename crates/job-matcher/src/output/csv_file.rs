use super::OutputError;
use crate::matching::MatchRecord;
use serde::Serialize;
use std::io::Write;

pub const CSV_HEADERS: [&str; 14] = [
    "score_percent",
    "company",
    "location",
    "title",
    "url",
    "posted_at",
    "created_at",
    "updated_at",
    "required_hit",
    "required_miss",
    "preferred_hit",
    "keywords_hit",
    "title_hit",
    "snippet",
];

/// One line of `results.csv`; list columns are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow {
    pub score_percent: f64,
    pub company: String,
    pub location: String,
    pub title: String,
    pub url: String,
    pub posted_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub required_hit: String,
    pub required_miss: String,
    pub preferred_hit: String,
    pub keywords_hit: String,
    pub title_hit: bool,
    pub snippet: String,
}

impl From<&MatchRecord> for CsvRow {
    fn from(record: &MatchRecord) -> Self {
        let result = &record.result;
        let details = &record.details;

        Self {
            score_percent: result.score,
            company: details.company.clone(),
            location: details.location.clone(),
            title: record.title.clone(),
            url: details.url.clone(),
            posted_at: details.posted_at.clone().unwrap_or_default(),
            created_at: details.created_at.clone().unwrap_or_default(),
            updated_at: details.updated_at.clone().unwrap_or_default(),
            required_hit: result.matched_required.join(", "),
            required_miss: result.missing_required.join(", "),
            preferred_hit: result.matched_preferred.join(", "),
            keywords_hit: result.keywords_hit.join(", "),
            title_hit: result.title_hit(),
            snippet: record.snippet.clone(),
        }
    }
}

/// Writes a header row followed by one row per record. An empty slice still gets the header.
pub fn write_csv<W: Write>(writer: W, records: &[MatchRecord]) -> Result<(), OutputError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS)?;
    for record in records {
        csv_writer.serialize(CsvRow::from(record))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{PostingDetails, PostingId, ScoreResult, SubScores};

    fn record() -> MatchRecord {
        MatchRecord {
            title: "Data Engineer".to_string(),
            details: PostingDetails {
                source: "greenhouse".to_string(),
                company: "acme".to_string(),
                location: "Remote, US".to_string(),
                url: "https://boards.greenhouse.io/acme/jobs/1".to_string(),
                posted_at: Some("2025-01-02".to_string()),
                created_at: None,
                updated_at: None,
            },
            snippet: "Build \"pipelines\"".to_string(),
            result: ScoreResult {
                posting_id: PostingId::from("1"),
                score: 46.67,
                sub_scores: SubScores {
                    required_ratio: 2.0 / 3.0,
                    preferred_ratio: 0.0,
                    title_match: 0.0,
                    experience_ratio: 1.0,
                },
                matched_required: vec!["python".to_string(), "sql".to_string()],
                missing_required: vec!["go".to_string()],
                matched_preferred: Vec::new(),
                missing_preferred: Vec::new(),
                keywords_hit: Vec::new(),
                components: Vec::new(),
            },
        }
    }

    #[test]
    fn rows_join_lists_and_quote_text() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[record()]).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(CSV_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some(
                "46.67,acme,\"Remote, US\",Data Engineer,https://boards.greenhouse.io/acme/jobs/1,2025-01-02,,,\"python, sql\",go,,,false,\"Build \"\"pipelines\"\"\""
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_results_still_have_a_header() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[]).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.trim_end(), CSV_HEADERS.join(","));
    }
}
