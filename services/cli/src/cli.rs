use crate::commands::{run_match, run_refresh, run_validate, MatchArgs, RefreshArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use job_matcher::config::AppConfig;
use job_matcher::error::AppError;
use job_matcher::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "job-matcher",
    about = "Score and rank ATS job postings against a resume",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score cached postings against the resume and write results (default command)
    Match(MatchArgs),
    /// Fetch configured Greenhouse and Lever boards into the raw jobs cache
    Refresh(RefreshArgs),
    /// Load and validate the matcher config and skill vocabulary
    Validate(ValidateArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let app = AppConfig::load()?;
    telemetry::init(&app.telemetry)?;
    debug!(
        environment = ?app.environment,
        log_level = %app.telemetry.log_level,
        "configuration loaded"
    );

    let command = cli
        .command
        .unwrap_or_else(|| Command::Match(MatchArgs::default()));

    match command {
        Command::Match(args) => run_match(&app, args),
        Command::Refresh(args) => run_refresh(&app, args).await,
        Command::Validate(args) => run_validate(&app, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn match_flags_parse() {
        let cli = Cli::try_parse_from([
            "job-matcher",
            "match",
            "--top-n",
            "25",
            "--min-score",
            "62.5",
            "--resume",
            "cv.pdf",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Match(args)) => {
                assert_eq!(args.top_n, Some(25));
                assert_eq!(args.min_score, Some(62.5));
                assert_eq!(args.resume.as_deref(), Some(std::path::Path::new("cv.pdf")));
            }
            other => panic!("expected match command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_match() {
        let cli = Cli::try_parse_from(["job-matcher"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn zero_top_n_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["job-matcher", "match", "--top-n", "0"]).is_err());
    }
}
