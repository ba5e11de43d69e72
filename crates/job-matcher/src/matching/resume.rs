use super::error::ParseError;
use super::normalize::{contains_phrase, extract_years, normalize_text};
use crate::config::{SkillVocabulary, VocabularyTerm};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Normalised view of the candidate: recognised skills, titles held, and tenure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub skills: BTreeSet<String>,
    pub titles: BTreeSet<String>,
    pub years_experience: u32,
}

impl ResumeProfile {
    pub fn new<S, T>(skills: S, titles: T, years_experience: u32) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            skills: normalized_set(skills),
            titles: normalized_set(titles),
            years_experience,
        }
    }

    /// Extracts skills and titles by matching the vocabulary against the resume text.
    pub fn parse(text: &str, vocabulary: &SkillVocabulary) -> Result<Self, ParseError> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Err(ParseError::EmptyResume);
        }

        let skills = matched_names(&normalized, vocabulary.skills());
        let titles = matched_names(&normalized, vocabulary.titles.iter());
        let years_experience = extract_years(&normalized).unwrap_or(0);

        Ok(Self {
            skills,
            titles,
            years_experience,
        })
    }
}

pub(crate) fn matched_names<'a, I>(normalized: &str, terms: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a VocabularyTerm>,
{
    terms
        .into_iter()
        .filter(|term| {
            term.patterns
                .iter()
                .any(|pattern| contains_phrase(normalized, pattern))
        })
        .map(|term| term.name.clone())
        .collect()
}

fn normalized_set<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| normalize_text(value.as_ref()))
        .filter(|value| !value.is_empty())
        .collect()
}

/// Reads resume text from disk. PDF files are text-extracted, anything else is read as UTF-8.
pub fn load_resume_text(path: &Path) -> Result<String, ParseError> {
    let unreadable = |reason: String| ParseError::UnreadableResume {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(unreadable("file not found".to_string()));
    }

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        pdf_extract::extract_text(path).map_err(|err| unreadable(err.to_string()))
    } else {
        std::fs::read_to_string(path).map_err(|err| unreadable(err.to_string()))
    }
}
