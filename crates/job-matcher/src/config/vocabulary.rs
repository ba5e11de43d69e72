use super::{read_yaml, ConfigError};
use crate::matching::normalize_text;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// A recognised skill or title: a canonical name plus the phrases that
/// count as a mention of it. All strings are already normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyTerm {
    pub name: String,
    pub patterns: Vec<String>,
}

impl VocabularyTerm {
    pub fn new(name: &str) -> Self {
        Self::with_aliases(name, std::iter::empty::<&str>())
    }

    pub fn with_aliases<'a, I>(name: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let name = normalize_text(name);
        let mut patterns = vec![name.clone()];
        for alias in aliases {
            let alias = normalize_text(alias);
            if !alias.is_empty() && !patterns.contains(&alias) {
                patterns.push(alias);
            }
        }
        Self { name, patterns }
    }
}

/// Skill and title vocabulary loaded from `skills.yaml`.
///
/// `required` and `preferred` partition the skill vocabulary for postings;
/// their union is the vocabulary matched against the resume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillVocabulary {
    pub required: Vec<VocabularyTerm>,
    pub preferred: Vec<VocabularyTerm>,
    pub titles: Vec<VocabularyTerm>,
}

impl SkillVocabulary {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: RawVocabulary = read_yaml(path)?;
        let vocabulary = Self::from(raw);
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawVocabulary =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
                path: "<inline>".into(),
                source,
            })?;
        let vocabulary = Self::from(raw);
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required.is_empty() && self.preferred.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        Ok(())
    }

    /// Every skill term, required first, without duplicate names.
    pub fn skills(&self) -> impl Iterator<Item = &VocabularyTerm> {
        let mut seen = HashSet::new();
        self.required
            .iter()
            .chain(self.preferred.iter())
            .filter(move |term| seen.insert(term.name.as_str()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawVocabulary {
    #[serde(default)]
    required: Vec<RawTerm>,
    #[serde(default)]
    preferred: Vec<RawTerm>,
    #[serde(default)]
    titles: Vec<RawTerm>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTerm {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        aliases: Vec<String>,
    },
}

impl From<RawVocabulary> for SkillVocabulary {
    fn from(raw: RawVocabulary) -> Self {
        Self {
            required: build_terms(raw.required),
            preferred: build_terms(raw.preferred),
            titles: build_terms(raw.titles),
        }
    }
}

fn build_terms(raw: Vec<RawTerm>) -> Vec<VocabularyTerm> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|term| match term {
            RawTerm::Name(name) => VocabularyTerm::new(&name),
            RawTerm::Detailed { name, aliases } => {
                VocabularyTerm::with_aliases(&name, aliases.iter().map(String::as_str))
            }
        })
        .filter(|term| !term.name.is_empty() && seen.insert(term.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_aliased_entries() {
        let vocabulary = SkillVocabulary::from_yaml_str(
            "required:\n  - Python\n  - name: Kubernetes\n    aliases: [K8s, k8s]\npreferred:\n  - go\ntitles:\n  - Software Engineer\n",
        )
        .expect("vocabulary parses");

        assert_eq!(vocabulary.required.len(), 2);
        assert_eq!(vocabulary.required[0].name, "python");
        assert_eq!(vocabulary.required[1].patterns, vec!["kubernetes", "k8s"]);
        assert_eq!(vocabulary.titles[0].name, "software engineer");
    }

    #[test]
    fn drops_blank_and_duplicate_entries() {
        let vocabulary =
            SkillVocabulary::from_yaml_str("required: [SQL, ' sql ', '', Rust]\n").expect("parses");
        let names: Vec<_> = vocabulary.required.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["sql", "rust"]);
    }

    #[test]
    fn empty_skill_lists_are_rejected() {
        let err = SkillVocabulary::from_yaml_str("titles: [engineer]\n").expect_err("no skills");
        assert!(matches!(err, ConfigError::EmptyVocabulary));
    }

    #[test]
    fn skills_iterates_union_without_duplicates() {
        let vocabulary =
            SkillVocabulary::from_yaml_str("required: [python, sql]\npreferred: [sql, go]\n")
                .expect("parses");
        let names: Vec<_> = vocabulary.skills().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["python", "sql", "go"]);
    }
}
