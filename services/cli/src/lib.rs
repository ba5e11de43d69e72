mod cli;
mod commands;
mod render;

use job_matcher::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
