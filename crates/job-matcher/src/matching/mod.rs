mod error;
mod filters;
mod location;
mod normalize;
mod pipeline;
mod posting;
mod ranker;
mod resume;
mod scoring;

pub use error::ParseError;
pub use filters::{Exclusion, ExclusionReason, PostingFilter};
pub use location::{is_remote, looks_like_us_location, LocationPolicy};
pub use normalize::{contains_phrase, description_text, html_to_text, normalize_text, snippet};
pub use pipeline::{MatchPipeline, MatchRecord, MatchReport};
pub use posting::{JobPosting, PostingDetails, PostingId, RawPosting};
pub use ranker::{rank, ranking_order, top_n};
pub use resume::{load_resume_text, ResumeProfile};
pub use scoring::{score, score_with_keywords, ScoreComponent, ScoreFactor, ScoreResult, SubScores};

use crate::config::MatchWeights;

/// Stateless scorer that applies a weight set to resume/posting pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEngine {
    weights: MatchWeights,
    keywords: Vec<String>,
}

impl MatchEngine {
    pub fn new(weights: MatchWeights) -> Self {
        Self {
            weights,
            keywords: Vec::new(),
        }
    }

    /// Keywords reported per posting as `keywords_hit`. They never affect the score.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    pub fn score(&self, resume: &ResumeProfile, posting: &JobPosting) -> ScoreResult {
        score_with_keywords(resume, posting, &self.weights, &self.keywords)
    }
}
