use super::normalize::{contains_phrase, normalize_text};
use super::posting::{JobPosting, PostingId};
use super::resume::ResumeProfile;
use crate::config::MatchWeights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sub-scores contributing to the final match percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    RequiredSkills,
    PreferredSkills,
    TitleMatch,
    Experience,
}

impl ScoreFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::RequiredSkills => "required skills",
            Self::PreferredSkills => "preferred skills",
            Self::TitleMatch => "title match",
            Self::Experience => "experience",
        }
    }
}

/// Discrete contribution to a score, kept for explainable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub ratio: f64,
    pub weight: f64,
    /// `100 × weight × ratio`, before rounding of the total.
    pub points: f64,
    pub notes: String,
}

/// Per-category ratios, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub required_ratio: f64,
    pub preferred_ratio: f64,
    pub title_match: f64,
    pub experience_ratio: f64,
}

/// Scoring output for a single posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub posting_id: PostingId,
    /// Weighted percentage in `[0, 100]`, rounded to two decimals.
    pub score: f64,
    pub sub_scores: SubScores,
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub matched_preferred: Vec<String>,
    pub missing_preferred: Vec<String>,
    pub keywords_hit: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl ScoreResult {
    pub fn title_hit(&self) -> bool {
        self.sub_scores.title_match > 0.0
    }
}

impl AsRef<ScoreResult> for ScoreResult {
    fn as_ref(&self) -> &ScoreResult {
        self
    }
}

/// Scores a posting against a resume. Pure: identical inputs give identical results.
pub fn score(resume: &ResumeProfile, posting: &JobPosting, weights: &MatchWeights) -> ScoreResult {
    score_with_keywords(resume, posting, weights, &[])
}

/// As [`score`], additionally reporting which of `keywords` appear in the posting.
pub fn score_with_keywords(
    resume: &ResumeProfile,
    posting: &JobPosting,
    weights: &MatchWeights,
    keywords: &[String],
) -> ScoreResult {
    let (matched_required, missing_required) = partition(&posting.required_skills, &resume.skills);
    let (matched_preferred, missing_preferred) =
        partition(&posting.preferred_skills, &resume.skills);

    // A posting without required skills cannot penalise the candidate.
    let required_ratio = ratio(matched_required.len(), posting.required_skills.len(), 1.0);
    let preferred_ratio = ratio(matched_preferred.len(), posting.preferred_skills.len(), 0.0);

    let posting_title = normalize_text(&posting.title);
    let matched_title = resume
        .titles
        .iter()
        .find(|title| !title.is_empty() && posting_title.contains(title.as_str()));
    let title_match = if matched_title.is_some() { 1.0 } else { 0.0 };

    let experience_ratio = match posting.years_required {
        Some(required) if required > 0 => {
            (f64::from(resume.years_experience) / f64::from(required)).min(1.0)
        }
        _ => 1.0,
    };

    let components = vec![
        component(
            ScoreFactor::RequiredSkills,
            required_ratio,
            weights.required_skills,
            coverage_note(&matched_required, posting.required_skills.len(), "required"),
        ),
        component(
            ScoreFactor::PreferredSkills,
            preferred_ratio,
            weights.preferred_skills,
            coverage_note(&matched_preferred, posting.preferred_skills.len(), "preferred"),
        ),
        component(
            ScoreFactor::TitleMatch,
            title_match,
            weights.title_similarity,
            match matched_title {
                Some(title) => format!("resume title '{title}' appears in '{}'", posting.title),
                None => "no resume title appears in the posting title".to_string(),
            },
        ),
        component(
            ScoreFactor::Experience,
            experience_ratio,
            weights.experience,
            match posting.years_required {
                Some(required) if required > 0 => format!(
                    "{} of {} required years",
                    resume.years_experience, required
                ),
                _ => "no experience requirement stated".to_string(),
            },
        ),
    ];

    let total: f64 = components.iter().map(|component| component.points).sum();
    let score = round2(total.clamp(0.0, 100.0));

    let normalized_body = normalize_text(&format!("{} {}", posting.title, posting.description));
    let keywords_hit = keywords
        .iter()
        .map(|keyword| normalize_text(keyword))
        .filter(|keyword| contains_phrase(&normalized_body, keyword))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ScoreResult {
        posting_id: posting.id.clone(),
        score,
        sub_scores: SubScores {
            required_ratio,
            preferred_ratio,
            title_match,
            experience_ratio,
        },
        matched_required,
        missing_required,
        matched_preferred,
        missing_preferred,
        keywords_hit,
        components,
    }
}

fn partition(wanted: &BTreeSet<String>, held: &BTreeSet<String>) -> (Vec<String>, Vec<String>) {
    wanted
        .iter()
        .cloned()
        .partition(|skill| held.contains(skill))
}

fn ratio(hits: usize, total: usize, when_empty: f64) -> f64 {
    if total == 0 {
        when_empty
    } else {
        hits as f64 / total as f64
    }
}

fn component(factor: ScoreFactor, ratio: f64, weight: f64, notes: String) -> ScoreComponent {
    ScoreComponent {
        factor,
        ratio,
        weight,
        points: 100.0 * weight * ratio,
        notes,
    }
}

fn coverage_note(matched: &[String], total: usize, kind: &str) -> String {
    if total == 0 {
        return format!("posting lists no {kind} skills");
    }
    format!(
        "{} of {} {kind} skills matched{}",
        matched.len(),
        total,
        if matched.is_empty() {
            String::new()
        } else {
            format!(" ({})", matched.join(", "))
        }
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
