use super::{cache, greenhouse, lever, AtsKind, BoardClient, SourceError};
use crate::config::SourcesConfig;
use crate::matching::RawPosting;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

const COMPANY_PAUSE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshStatus {
    Written { total: usize },
    Unchanged { total: usize },
    Failed { error: String, error_file: Option<PathBuf> },
}

/// What happened to one configured company during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRefresh {
    pub source: AtsKind,
    pub company: String,
    pub existing: usize,
    pub incoming: usize,
    #[serde(flatten)]
    pub status: RefreshStatus,
}

/// Fetches every configured company into `raw_dir`, one cache file each.
///
/// Company failures are recorded in an `.error.json` file and reported in the
/// returned list; only an unusable cache directory aborts the run.
pub async fn refresh_all(
    client: &BoardClient,
    sources: &SourcesConfig,
    raw_dir: &Path,
) -> Result<Vec<CompanyRefresh>, SourceError> {
    std::fs::create_dir_all(raw_dir).map_err(|source| SourceError::Io {
        path: raw_dir.to_path_buf(),
        source,
    })?;
    info!(dir = %raw_dir.display(), "refreshing raw jobs");

    let targets = sources
        .greenhouse
        .slugs()
        .map(|company| (AtsKind::Greenhouse, company))
        .chain(sources.lever.slugs().map(|company| (AtsKind::Lever, company)));

    let mut outcomes = Vec::new();
    for (kind, company) in targets {
        outcomes.push(refresh_company(client, kind, &company, raw_dir).await);
        tokio::time::sleep(COMPANY_PAUSE).await;
    }
    Ok(outcomes)
}

async fn refresh_company(
    client: &BoardClient,
    kind: AtsKind,
    company: &str,
    raw_dir: &Path,
) -> CompanyRefresh {
    let path = cache::company_file(raw_dir, kind, company);
    let existing = cache::read_company(&path);
    info!(source = %kind, company, existing = existing.len(), "refreshing company");

    let fetched = match kind {
        AtsKind::Greenhouse => {
            greenhouse::fetch(client, company, &cache::index_by_id(&existing)).await
        }
        AtsKind::Lever => lever::fetch(client, company).await,
    };

    let (incoming, status) = match fetched {
        Ok(incoming) => {
            let count = incoming.len();
            (count, store(&path, &existing, incoming))
        }
        Err(err) => (0, Err(err)),
    };

    let status = status.unwrap_or_else(|err| {
        let error_file = match cache::write_error(raw_dir, kind, company, &err) {
            Ok(path) => Some(path),
            Err(write_err) => {
                error!(source = %kind, company, error = %write_err, "unable to write error file");
                None
            }
        };
        error!(source = %kind, company, error = %err, "company refresh failed");
        RefreshStatus::Failed {
            error: err.to_string(),
            error_file,
        }
    });

    CompanyRefresh {
        source: kind,
        company: company.to_string(),
        existing: existing.len(),
        incoming,
        status,
    }
}

/// Merges `incoming` into the cache file, writing only when something changed.
pub(crate) fn store(
    path: &Path,
    existing: &[RawPosting],
    incoming: Vec<RawPosting>,
) -> Result<RefreshStatus, SourceError> {
    let merged = cache::merge(existing, incoming);
    let total = merged.len();

    if cache::changed(existing, &merged) {
        cache::write_atomic(path, &merged)?;
        info!(path = %path.display(), total, "cache file written");
        Ok(RefreshStatus::Written { total })
    } else {
        info!(path = %path.display(), total, "no changes");
        Ok(RefreshStatus::Unchanged { total })
    }
}
