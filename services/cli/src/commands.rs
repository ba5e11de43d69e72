use crate::render::{render_match_report, render_refresh, render_validation, ValidationSummary};
use clap::Args;
use job_matcher::config::{skills_path_for, AppConfig, ConfigError, MatcherConfig, SkillVocabulary};
use job_matcher::error::AppError;
use job_matcher::matching::{load_resume_text, MatchPipeline};
use job_matcher::output::write_results;
use job_matcher::sources::{cache, refresh_all, BoardClient};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_SHOWN: usize = 10;

#[derive(Args, Debug, Default)]
pub(crate) struct MatchArgs {
    /// Matcher config file (defaults to APP_CONFIG_PATH or config/config.yaml)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Skill vocabulary file (defaults to skills.yaml next to the config)
    #[arg(long)]
    pub(crate) skills: Option<PathBuf>,
    /// Resume file, .pdf or plain text (overrides resume.path)
    #[arg(long)]
    pub(crate) resume: Option<PathBuf>,
    /// Directory of cached raw postings
    #[arg(long)]
    pub(crate) raw_dir: Option<PathBuf>,
    /// Directory that receives results.json and results.csv
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
    /// Keep at most this many ranked postings (overrides output.top_n)
    #[arg(long, value_parser = parse_top_n)]
    pub(crate) top_n: Option<usize>,
    /// Minimum score percentage (overrides filters.min_match_percent)
    #[arg(long, value_parser = parse_percent)]
    pub(crate) min_score: Option<f64>,
    /// Number of ranked postings to print
    #[arg(long)]
    pub(crate) show: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RefreshArgs {
    /// Matcher config file listing the boards to fetch
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Directory of cached raw postings
    #[arg(long)]
    pub(crate) raw_dir: Option<PathBuf>,
    /// Print the per-company outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ValidateArgs {
    /// Matcher config file
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Skill vocabulary file
    #[arg(long)]
    pub(crate) skills: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn parse_top_n(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("top-n must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(format!("invalid top-n '{value}': {err}")),
    }
}

pub(crate) fn parse_percent(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(percent) if (0.0..=100.0).contains(&percent) => Ok(percent),
        Ok(_) => Err("min-score must be between 0 and 100".to_string()),
        Err(err) => Err(format!("invalid min-score '{value}': {err}")),
    }
}

fn config_path(app: &AppConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| app.paths.config_path.clone())
}

fn load_inputs(
    config_path: &Path,
    skills: Option<PathBuf>,
) -> Result<(MatcherConfig, SkillVocabulary, PathBuf), ConfigError> {
    let config = MatcherConfig::load(config_path)?;
    let skills_path = skills.unwrap_or_else(|| skills_path_for(config_path));
    let vocabulary = SkillVocabulary::load(&skills_path)?;
    Ok((config, vocabulary, skills_path))
}

pub(crate) fn run_match(app: &AppConfig, args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        config,
        skills,
        resume,
        raw_dir,
        out_dir,
        top_n,
        min_score,
        show,
    } = args;

    let config_path = config_path(app, config);
    let (mut config, vocabulary, _) = load_inputs(&config_path, skills)?;
    if let Some(top_n) = top_n {
        config.output.top_n = top_n;
    }
    if let Some(min_score) = min_score {
        config.filters.min_match_percent = min_score;
    }

    let pipeline = MatchPipeline::new(&config, vocabulary)?;

    let resume_path = resume.unwrap_or_else(|| config.resume.path.clone());
    let resume_text = load_resume_text(&resume_path)?;

    let raw_dir = raw_dir.unwrap_or_else(|| app.paths.raw_jobs_dir());
    let postings = cache::load_raw_postings(&raw_dir)?;
    info!(
        resume = %resume_path.display(),
        raw_dir = %raw_dir.display(),
        postings = postings.len(),
        "running matcher"
    );

    let report = pipeline.run(&resume_text, postings)?;

    let out_dir = out_dir.unwrap_or_else(|| app.paths.results_dir());
    let written = write_results(&out_dir, &report, config.output.explain)?;

    render_match_report(&report, &written, show.unwrap_or(DEFAULT_SHOWN));
    Ok(())
}

pub(crate) async fn run_refresh(app: &AppConfig, args: RefreshArgs) -> Result<(), AppError> {
    let RefreshArgs {
        config,
        raw_dir,
        json,
    } = args;

    let config = MatcherConfig::load(&config_path(app, config))?;
    if config.sources.is_empty() {
        return Err(ConfigError::NoCompanies.into());
    }

    let raw_dir = raw_dir.unwrap_or_else(|| app.paths.raw_jobs_dir());
    let client = BoardClient::new()?;
    let outcomes = refresh_all(&client, &config.sources, &raw_dir).await?;

    render_refresh(&outcomes, &raw_dir, json)?;
    Ok(())
}

pub(crate) fn run_validate(app: &AppConfig, args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs {
        config,
        skills,
        json,
    } = args;

    let config_path = config_path(app, config);
    let (config, vocabulary, skills_path) = load_inputs(&config_path, skills)?;

    let summary = ValidationSummary::new(&config_path, &skills_path, &config, &vocabulary);
    render_validation(&summary, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_must_be_positive() {
        assert_eq!(parse_top_n("15"), Ok(15));
        assert!(parse_top_n("0").is_err());
        assert!(parse_top_n("ten").is_err());
    }

    #[test]
    fn min_score_is_a_percentage() {
        assert_eq!(parse_percent(" 70 "), Ok(70.0));
        assert!(parse_percent("100.5").is_err());
        assert!(parse_percent("-1").is_err());
        assert!(parse_percent("NaN").is_err());
    }
}
