mod matcher;
mod vocabulary;
mod weights;

pub use matcher::{
    CompanyList, FilterConfig, LocationFilters, MatcherConfig, OutputConfig, ResumeSource,
    ScoringConfig, SourcesConfig,
};
pub use vocabulary::{SkillVocabulary, VocabularyTerm};
pub use weights::MatchWeights;

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log filter used when `APP_LOG_LEVEL` is unset.
    pub fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Test => "warn",
            Self::Production => "info",
        }
    }
}

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub paths: PathConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let config_path = env::var("APP_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/config.yaml"));
        let data_dir = env::var("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let log_level = env::var("APP_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        Ok(Self {
            environment,
            paths: PathConfig {
                config_path,
                data_dir,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Filesystem locations for configuration, cached postings, and results.
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

impl PathConfig {
    /// `skills.yaml` lives next to the matcher config file.
    pub fn skills_path(&self) -> PathBuf {
        skills_path_for(&self.config_path)
    }

    pub fn raw_jobs_dir(&self) -> PathBuf {
        self.data_dir.join("raw_jobs")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.data_dir.join("results")
    }
}

pub fn skills_path_for(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("skills.yaml"))
        .unwrap_or_else(|| PathBuf::from("skills.yaml"))
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    WeightSum {
        total: f64,
    },
    NegativeWeight {
        name: &'static str,
        value: f64,
    },
    EmptyVocabulary,
    InvalidTopN,
    InvalidMinScore {
        value: f64,
    },
    NoCompanies,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, .. } => {
                write!(f, "unable to read config file {}", path.display())
            }
            ConfigError::Yaml { path, source } => {
                write!(f, "invalid YAML in {}: {}", path.display(), source)
            }
            ConfigError::WeightSum { total } => {
                write!(f, "scoring weights must sum to 1.0 (got {:.4})", total)
            }
            ConfigError::NegativeWeight { name, value } => {
                write!(
                    f,
                    "scoring weight '{}' must be a finite non-negative number (got {})",
                    name, value
                )
            }
            ConfigError::EmptyVocabulary => write!(
                f,
                "skill vocabulary must declare at least one required or preferred skill"
            ),
            ConfigError::InvalidTopN => write!(f, "output.top_n must be greater than zero"),
            ConfigError::InvalidMinScore { value } => write!(
                f,
                "filters.min_match_percent must be between 0 and 100 (got {})",
                value
            ),
            ConfigError::NoCompanies => write!(
                f,
                "no companies configured under sources.greenhouse or sources.lever"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Yaml { source, .. } => Some(source),
            ConfigError::WeightSum { .. }
            | ConfigError::NegativeWeight { .. }
            | ConfigError::EmptyVocabulary
            | ConfigError::InvalidTopN
            | ConfigError::InvalidMinScore { .. }
            | ConfigError::NoCompanies => None,
        }
    }
}

pub(crate) fn read_yaml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
