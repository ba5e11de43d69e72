use super::location::LocationPolicy;
use super::posting::{JobPosting, PostingId};
use crate::config::MatcherConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a posting was left out of the ranked results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    Unparseable { detail: String },
    DuplicateId,
    CompanyNotAllowed { company: String },
    TitleNotIncluded,
    TitleExcluded { keyword: String },
    LocationRejected { location: String },
    BelowMinimumScore { score: f64, minimum: f64 },
}

impl ExclusionReason {
    pub fn summary(&self) -> String {
        match self {
            ExclusionReason::Unparseable { detail } => format!("unparseable posting: {detail}"),
            ExclusionReason::DuplicateId => "duplicate posting id".to_string(),
            ExclusionReason::CompanyNotAllowed { company } => {
                format!("company '{company}' is not in the greenhouse allowlist")
            }
            ExclusionReason::TitleNotIncluded => {
                "title matches none of the include keywords".to_string()
            }
            ExclusionReason::TitleExcluded { keyword } => {
                format!("title contains excluded keyword '{keyword}'")
            }
            ExclusionReason::LocationRejected { location } => {
                if location.is_empty() {
                    "no usable location for the location policy".to_string()
                } else {
                    format!("location '{location}' rejected by location policy")
                }
            }
            ExclusionReason::BelowMinimumScore { score, minimum } => {
                format!("score {score:.2} below minimum {minimum:.2}")
            }
        }
    }
}

/// A posting that was dropped, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub posting_id: Option<PostingId>,
    pub reason: ExclusionReason,
}

/// Pre-scoring filters compiled from configuration. Applied in declaration order.
#[derive(Debug, Clone)]
pub struct PostingFilter {
    allowed_greenhouse_companies: BTreeSet<String>,
    include_title_keywords: Vec<String>,
    exclude_title_keywords: Vec<String>,
    location: LocationPolicy,
    min_score: f64,
}

impl PostingFilter {
    pub fn from_config(config: &MatcherConfig) -> Self {
        let location = match &config.location_filters {
            Some(filters) => LocationPolicy::structured(filters),
            None => LocationPolicy::legacy(&config.filters.locations, config.filters.remote_only),
        };

        Self {
            allowed_greenhouse_companies: config.sources.greenhouse.slugs().collect(),
            include_title_keywords: lowercase_all(&config.filters.include_title_keywords),
            exclude_title_keywords: lowercase_all(&config.filters.exclude_title_keywords),
            location,
            min_score: config.filters.min_match_percent,
        }
    }

    /// A filter that lets every posting through.
    pub fn permissive() -> Self {
        Self {
            allowed_greenhouse_companies: BTreeSet::new(),
            include_title_keywords: Vec::new(),
            exclude_title_keywords: Vec::new(),
            location: LocationPolicy::legacy(&[], false),
            min_score: 0.0,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Checks everything that can be decided before scoring.
    pub fn check(&self, posting: &JobPosting) -> Result<(), ExclusionReason> {
        let details = &posting.details;

        if details.source.eq_ignore_ascii_case("greenhouse")
            && !self.allowed_greenhouse_companies.is_empty()
            && !self
                .allowed_greenhouse_companies
                .contains(&details.company.to_lowercase())
        {
            return Err(ExclusionReason::CompanyNotAllowed {
                company: details.company.clone(),
            });
        }

        let title = posting.title.to_lowercase();
        if !self.include_title_keywords.is_empty()
            && !self
                .include_title_keywords
                .iter()
                .any(|keyword| title.contains(keyword.as_str()))
        {
            return Err(ExclusionReason::TitleNotIncluded);
        }

        if let Some(keyword) = self
            .exclude_title_keywords
            .iter()
            .find(|keyword| title.contains(keyword.as_str()))
        {
            return Err(ExclusionReason::TitleExcluded {
                keyword: keyword.clone(),
            });
        }

        let location = location_text(posting);
        if !self.location.allows(location) {
            return Err(ExclusionReason::LocationRejected {
                location: location.to_string(),
            });
        }

        Ok(())
    }

    pub fn check_score(&self, score: f64) -> Result<(), ExclusionReason> {
        if score < self.min_score {
            return Err(ExclusionReason::BelowMinimumScore {
                score,
                minimum: self.min_score,
            });
        }
        Ok(())
    }
}

/// Location field, or the title as a weak remote hint when it is missing.
fn location_text(posting: &JobPosting) -> &str {
    let location = posting.details.location.trim();
    if location.is_empty() {
        posting.title.trim()
    } else {
        location
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
