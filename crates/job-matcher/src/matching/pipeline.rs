use super::error::ParseError;
use super::filters::{Exclusion, ExclusionReason, PostingFilter};
use super::normalize::snippet;
use super::posting::{JobPosting, PostingDetails, PostingId, RawPosting};
use super::ranker::top_n;
use super::resume::ResumeProfile;
use super::scoring::ScoreResult;
use super::MatchEngine;
use crate::config::{ConfigError, MatcherConfig, SkillVocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A ranked posting: its score breakdown plus what is needed to display it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub title: String,
    #[serde(flatten)]
    pub details: PostingDetails,
    pub snippet: String,
    pub result: ScoreResult,
}

impl MatchRecord {
    fn new(posting: &JobPosting, result: ScoreResult) -> Self {
        Self {
            title: posting.title.clone(),
            details: posting.details.clone(),
            snippet: snippet(&posting.description),
            result,
        }
    }

    pub fn posting_id(&self) -> &PostingId {
        &self.result.posting_id
    }

    pub fn score(&self) -> f64 {
        self.result.score
    }
}

impl AsRef<ScoreResult> for MatchRecord {
    fn as_ref(&self) -> &ScoreResult {
        &self.result
    }
}

/// Outcome of one match run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub resume: ResumeProfile,
    /// Ranked best first, at most `output.top_n` long.
    pub records: Vec<MatchRecord>,
    pub exclusions: Vec<Exclusion>,
    /// Postings seen, including excluded ones.
    pub considered: usize,
    /// Postings that passed every filter but fell beyond `top_n`.
    pub truncated: usize,
}

/// Resume parsing, posting normalisation, filtering, scoring and ranking in one pass.
#[derive(Debug, Clone)]
pub struct MatchPipeline {
    vocabulary: SkillVocabulary,
    engine: MatchEngine,
    filter: PostingFilter,
    top_n: usize,
}

impl MatchPipeline {
    /// Validates both configuration inputs before anything is scored.
    pub fn new(config: &MatcherConfig, vocabulary: SkillVocabulary) -> Result<Self, ConfigError> {
        config.validate()?;
        vocabulary.validate()?;

        Ok(Self {
            vocabulary,
            engine: MatchEngine::new(config.scoring.weights)
                .with_keywords(config.filters.keywords.clone()),
            filter: PostingFilter::from_config(config),
            top_n: config.output.top_n,
        })
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Runs over posting JSON records. Records that do not deserialize are excluded.
    pub fn run<I>(&self, resume_text: &str, postings: I) -> Result<MatchReport, ParseError>
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        let resume = ResumeProfile::parse(resume_text, &self.vocabulary)?;
        Ok(self.evaluate(
            resume,
            postings.into_iter().map(RawPosting::from_json),
        ))
    }

    pub fn run_raw<I>(&self, resume_text: &str, postings: I) -> Result<MatchReport, ParseError>
    where
        I: IntoIterator<Item = RawPosting>,
    {
        let resume = ResumeProfile::parse(resume_text, &self.vocabulary)?;
        Ok(self.evaluate(resume, postings.into_iter().map(Ok)))
    }

    /// Scores already-parsed postings against an already-parsed resume.
    pub fn evaluate<I>(&self, resume: ResumeProfile, postings: I) -> MatchReport
    where
        I: IntoIterator<Item = Result<RawPosting, ParseError>>,
    {
        let mut seen: BTreeSet<PostingId> = BTreeSet::new();
        let mut records = Vec::new();
        let mut exclusions = Vec::new();
        let mut considered = 0usize;

        for raw in postings {
            considered += 1;

            let raw = match raw {
                Ok(raw) => raw,
                Err(err) => {
                    exclude(&mut exclusions, None, unparseable(&err));
                    continue;
                }
            };

            let raw_id = raw.posting_id();
            if raw_id.as_ref().is_some_and(|id| seen.contains(id)) {
                exclude(&mut exclusions, raw_id, ExclusionReason::DuplicateId);
                continue;
            }

            // Only a parsed posting claims its id.
            let posting = match JobPosting::from_raw(&raw, &self.vocabulary) {
                Ok(posting) => posting,
                Err(err) => {
                    exclude(&mut exclusions, raw_id, unparseable(&err));
                    continue;
                }
            };
            seen.insert(posting.id.clone());

            if let Err(reason) = self.filter.check(&posting) {
                exclude(&mut exclusions, Some(posting.id), reason);
                continue;
            }

            let result = self.engine.score(&resume, &posting);
            if let Err(reason) = self.filter.check_score(result.score) {
                exclude(&mut exclusions, Some(posting.id), reason);
                continue;
            }

            records.push(MatchRecord::new(&posting, result));
        }

        let truncated = records.len().saturating_sub(self.top_n);
        let records = top_n(records, self.top_n);

        info!(
            considered,
            ranked = records.len(),
            excluded = exclusions.len(),
            truncated,
            "match run complete"
        );

        MatchReport {
            resume,
            records,
            exclusions,
            considered,
            truncated,
        }
    }
}

fn unparseable(err: &ParseError) -> ExclusionReason {
    ExclusionReason::Unparseable {
        detail: err.to_string(),
    }
}

fn exclude(exclusions: &mut Vec<Exclusion>, posting_id: Option<PostingId>, reason: ExclusionReason) {
    let id = posting_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string());

    match &reason {
        ExclusionReason::Unparseable { .. } => {
            warn!(posting_id = %id, reason = %reason.summary(), "posting excluded");
        }
        _ => {
            debug!(posting_id = %id, reason = %reason.summary(), "posting excluded");
        }
    }

    exclusions.push(Exclusion { posting_id, reason });
}
