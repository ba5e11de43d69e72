use chrono::Local;
use job_matcher::config::{MatchWeights, MatcherConfig, SkillVocabulary};
use job_matcher::matching::{MatchRecord, MatchReport};
use job_matcher::output::{OutputError, WrittenResults};
use job_matcher::sources::{CompanyRefresh, RefreshStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub(crate) fn render_match_report(report: &MatchReport, written: &WrittenResults, shown: usize) {
    println!(
        "Match run ({})",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "Resume: {} skills, {} titles, {} years",
        report.resume.skills.len(),
        report.resume.titles.len(),
        report.resume.years_experience
    );
    println!(
        "Postings: {} considered, {} ranked, {} excluded, {} beyond top-n",
        report.considered,
        report.records.len(),
        report.exclusions.len(),
        report.truncated
    );

    if report.records.is_empty() {
        println!("\nNo postings matched.");
    } else {
        let shown = shown.min(report.records.len());
        println!("\nTop {shown}");
        for (rank, record) in report.records.iter().take(shown).enumerate() {
            println!("{:>3}. {}", rank + 1, headline(record));
            let result = &record.result;
            if !result.matched_required.is_empty() || !result.missing_required.is_empty() {
                println!(
                    "     required: hit [{}] miss [{}]",
                    result.matched_required.join(", "),
                    result.missing_required.join(", ")
                );
            }
            if !record.details.url.is_empty() {
                println!("     {}", record.details.url);
            }
        }
    }

    println!("\nWrote {}", written.json.display());
    println!("Wrote {}", written.csv.display());
}

fn headline(record: &MatchRecord) -> String {
    let mut line = format!("{:>6.2}%  {}", record.score(), record.title);
    if !record.details.company.is_empty() {
        line.push_str(&format!(" @ {}", record.details.company));
    }
    if !record.details.location.is_empty() {
        line.push_str(&format!(" ({})", record.details.location));
    }
    line
}

pub(crate) fn render_refresh(
    outcomes: &[CompanyRefresh],
    raw_dir: &Path,
    json: bool,
) -> Result<(), OutputError> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    println!("Refreshed raw jobs in {}", raw_dir.display());
    for outcome in outcomes {
        let status = match &outcome.status {
            RefreshStatus::Written { total } => format!("wrote {total}"),
            RefreshStatus::Unchanged { total } => format!("no changes ({total} cached)"),
            RefreshStatus::Failed { error, error_file } => match error_file {
                Some(path) => format!("failed: {error} (see {})", path.display()),
                None => format!("failed: {error}"),
            },
        };
        println!(
            "- {} {}: existing={} incoming={} {}",
            outcome.source, outcome.company, outcome.existing, outcome.incoming, status
        );
    }

    let failed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome.status, RefreshStatus::Failed { .. }))
        .count();
    if failed > 0 {
        println!("{failed} of {} companies failed", outcomes.len());
    }
    Ok(())
}

/// What `validate` reports about the loaded configuration.
#[derive(Debug, Serialize)]
pub(crate) struct ValidationSummary {
    config_path: PathBuf,
    skills_path: PathBuf,
    resume_path: PathBuf,
    resume_found: bool,
    weights: MatchWeights,
    required_skills: usize,
    preferred_skills: usize,
    titles: usize,
    greenhouse_companies: usize,
    lever_companies: usize,
    min_match_percent: f64,
    top_n: usize,
    location_policy: &'static str,
}

impl ValidationSummary {
    pub(crate) fn new(
        config_path: &Path,
        skills_path: &Path,
        config: &MatcherConfig,
        vocabulary: &SkillVocabulary,
    ) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            skills_path: skills_path.to_path_buf(),
            resume_path: config.resume.path.clone(),
            resume_found: config.resume.path.is_file(),
            weights: config.scoring.weights,
            required_skills: vocabulary.required.len(),
            preferred_skills: vocabulary.preferred.len(),
            titles: vocabulary.titles.len(),
            greenhouse_companies: config.sources.greenhouse.slugs().count(),
            lever_companies: config.sources.lever.slugs().count(),
            min_match_percent: config.filters.min_match_percent,
            top_n: config.output.top_n,
            location_policy: if config.location_filters.is_some() {
                "structured"
            } else {
                "legacy"
            },
        }
    }
}

pub(crate) fn render_validation(summary: &ValidationSummary, json: bool) -> Result<(), OutputError> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    let weights = &summary.weights;
    println!("Configuration OK");
    println!("Config: {}", summary.config_path.display());
    println!("Skills: {}", summary.skills_path.display());
    println!(
        "Resume: {}{}",
        summary.resume_path.display(),
        if summary.resume_found { "" } else { " (not found)" }
    );
    println!(
        "Weights: required {:.2}, preferred {:.2}, title {:.2}, experience {:.2}",
        weights.required_skills,
        weights.preferred_skills,
        weights.title_similarity,
        weights.experience
    );
    println!(
        "Vocabulary: {} required, {} preferred, {} titles",
        summary.required_skills, summary.preferred_skills, summary.titles
    );
    println!(
        "Sources: {} greenhouse, {} lever",
        summary.greenhouse_companies, summary.lever_companies
    );
    println!(
        "Filters: min score {:.1}%, top {}, {} location policy",
        summary.min_match_percent, summary.top_n, summary.location_policy
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_matcher::matching::{PostingDetails, PostingId, ScoreResult, SubScores};

    #[test]
    fn headline_includes_company_and_location_when_known() {
        let mut record = MatchRecord {
            title: "Data Engineer".to_string(),
            details: PostingDetails {
                company: "acme".to_string(),
                location: "Remote".to_string(),
                ..PostingDetails::default()
            },
            snippet: String::new(),
            result: ScoreResult {
                posting_id: PostingId::from("1"),
                score: 46.666,
                sub_scores: SubScores {
                    required_ratio: 0.0,
                    preferred_ratio: 0.0,
                    title_match: 0.0,
                    experience_ratio: 0.0,
                },
                matched_required: Vec::new(),
                missing_required: Vec::new(),
                matched_preferred: Vec::new(),
                missing_preferred: Vec::new(),
                keywords_hit: Vec::new(),
                components: Vec::new(),
            },
        };

        assert_eq!(headline(&record), " 46.67%  Data Engineer @ acme (Remote)");

        record.details = PostingDetails::default();
        assert_eq!(headline(&record), " 46.67%  Data Engineer");
    }

    #[test]
    fn validation_summary_counts_configuration() {
        let config = config();
        let vocabulary =
            SkillVocabulary::from_yaml_str("required: [python]\npreferred: [go, rust]\n")
                .expect("vocabulary parses");

        let summary = ValidationSummary::new(
            Path::new("config/config.yaml"),
            Path::new("config/skills.yaml"),
            &config,
            &vocabulary,
        );

        assert_eq!(summary.required_skills, 1);
        assert_eq!(summary.preferred_skills, 2);
        assert_eq!(summary.greenhouse_companies, 1);
        assert_eq!(summary.location_policy, "legacy");
        assert!(!summary.resume_found);
    }

    fn config() -> MatcherConfig {
        MatcherConfig::from_yaml_str(
            "resume:\n  path: ./missing-resume.txt\nscoring:\n  weights:\n    required_skills: 0.7\n    preferred_skills: 0.2\n    title_similarity: 0.1\nsources:\n  greenhouse:\n    companies: [stripe]\n",
        )
        .expect("config parses")
    }
}
