use super::{read_yaml, ConfigError, MatchWeights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Matcher settings loaded from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub resume: ResumeSource,
    #[serde(default)]
    pub filters: FilterConfig,
    /// When present, replaces the legacy `filters.locations`/`remote_only` policy.
    #[serde(default)]
    pub location_filters: Option<LocationFilters>,
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl MatcherConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = read_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.weights.validate()?;
        if self.output.top_n == 0 {
            return Err(ConfigError::InvalidTopN);
        }
        let minimum = self.filters.min_match_percent;
        if !(0.0..=100.0).contains(&minimum) {
            return Err(ConfigError::InvalidMinScore { value: minimum });
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSource {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub min_match_percent: f64,
    #[serde(default)]
    pub include_title_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_title_keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            remote_only: false,
            min_match_percent: 0.0,
            include_title_keywords: Vec::new(),
            exclude_title_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilters {
    #[serde(default = "default_allow_remote")]
    pub allow_remote: bool,
    #[serde(default)]
    pub allowed_countries: Vec<String>,
    #[serde(default)]
    pub allowed_states: Vec<String>,
    #[serde(default)]
    pub allowed_cities: Vec<String>,
}

impl Default for LocationFilters {
    fn default() -> Self {
        Self {
            allow_remote: true,
            allowed_countries: Vec::new(),
            allowed_states: Vec::new(),
            allowed_cities: Vec::new(),
        }
    }
}

fn default_allow_remote() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: MatchWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_explain")]
    pub explain: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            explain: default_explain(),
        }
    }
}

fn default_top_n() -> usize {
    20_000
}

fn default_explain() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub greenhouse: CompanyList,
    #[serde(default)]
    pub lever: CompanyList,
}

impl SourcesConfig {
    pub fn is_empty(&self) -> bool {
        self.greenhouse.slugs().next().is_none() && self.lever.slugs().next().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyList {
    #[serde(default)]
    pub companies: Vec<String>,
}

impl CompanyList {
    /// Board slugs trimmed and lowercased, blanks skipped.
    pub fn slugs(&self) -> impl Iterator<Item = String> + '_ {
        self.companies
            .iter()
            .map(|company| company.trim().to_ascii_lowercase())
            .filter(|company| !company.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "resume:\n  path: resume.txt\nscoring:\n  weights:\n    required_skills: 0.7\n    preferred_skills: 0.2\n    title_similarity: 0.1\n";

    #[test]
    fn minimal_config_applies_defaults() {
        let config: MatcherConfig = serde_yaml::from_str(MINIMAL).expect("parses");
        config.validate().expect("valid");

        assert_eq!(config.version, 1);
        assert_eq!(config.resume.path, PathBuf::from("resume.txt"));
        assert_eq!(config.filters, FilterConfig::default());
        assert!(config.location_filters.is_none());
        assert_eq!(config.output.top_n, 20_000);
        assert!(config.output.explain);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn location_filters_default_to_allowing_remote() {
        let raw = format!("{MINIMAL}location_filters:\n  allowed_countries: [United States]\n");
        let config: MatcherConfig = serde_yaml::from_str(&raw).expect("parses");
        let filters = config.location_filters.expect("present");
        assert!(filters.allow_remote);
        assert_eq!(filters.allowed_countries, vec!["United States"]);
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let raw = format!("{MINIMAL}output:\n  top_n: 0\n");
        let config: MatcherConfig = serde_yaml::from_str(&raw).expect("parses");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTopN)));
    }

    #[test]
    fn min_match_percent_must_be_a_percentage() {
        for value in ["-5", "100.5", ".nan"] {
            let raw = format!("{MINIMAL}filters:\n  min_match_percent: {value}\n");
            let config: MatcherConfig = serde_yaml::from_str(&raw).expect("parses");
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidMinScore { .. })),
                "{value} accepted"
            );
        }

        let raw = format!("{MINIMAL}filters:\n  min_match_percent: 100\n");
        let config: MatcherConfig = serde_yaml::from_str(&raw).expect("parses");
        config.validate().expect("100 is a valid minimum");
    }

    #[test]
    fn company_slugs_are_normalized() {
        let list = CompanyList {
            companies: vec![" Stripe ".to_string(), "".to_string(), "airbnb".to_string()],
        };
        assert_eq!(list.slugs().collect::<Vec<_>>(), vec!["stripe", "airbnb"]);
    }
}
