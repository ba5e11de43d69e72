//! Raw posting cache: one JSON array per `{source}_{company}.json`.

use super::{AtsKind, SourceError};
use crate::matching::RawPosting;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ERROR_SUFFIX: &str = ".error.json";

pub fn company_file(dir: &Path, kind: AtsKind, company: &str) -> PathBuf {
    dir.join(format!("{kind}_{company}.json"))
}

pub fn error_file(dir: &Path, kind: AtsKind, company: &str) -> PathBuf {
    dir.join(format!("{kind}_{company}{ERROR_SUFFIX}"))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError + '_ {
    move |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads one cache file as JSON records. Missing, unreadable or non-array files yield nothing.
fn read_records(path: &Path) -> Vec<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %err, "unable to read cache file");
            }
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!(path = %path.display(), "cache file is not a JSON array, skipping");
            Vec::new()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cache file is not valid JSON, skipping");
            Vec::new()
        }
    }
}

/// Cached postings for one company; records that do not deserialize are dropped.
pub fn read_company(path: &Path) -> Vec<RawPosting> {
    read_records(path)
        .into_iter()
        .filter_map(|record| RawPosting::from_json(record).ok())
        .collect()
}

/// Every cached posting under `dir`, files in name order, error files skipped.
pub fn load_raw_postings(dir: &Path) -> Result<Vec<Value>, SourceError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "raw jobs directory does not exist");
            return Ok(Vec::new());
        }
        Err(err) => return Err(io_error(dir)(err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_error(dir))?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.ends_with(".json") && !name.ends_with(ERROR_SUFFIX) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut postings = Vec::new();
    for file in &files {
        let records = read_records(file);
        debug!(path = %file.display(), records = records.len(), "loaded cache file");
        postings.extend(records);
    }
    Ok(postings)
}

/// Cached postings keyed by id, for delta reuse during a refresh.
pub fn index_by_id(postings: &[RawPosting]) -> BTreeMap<String, RawPosting> {
    postings
        .iter()
        .filter_map(|posting| {
            posting
                .posting_id()
                .map(|id| (id.0, posting.clone()))
        })
        .collect()
}

/// Newest-first ordering key. Parsed instants sort above unparseable text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Recency<'a> {
    Text(&'a str),
    At(DateTime<Utc>),
}

fn recency(posting: &RawPosting) -> Recency<'_> {
    let stamp = posting
        .posted_at
        .as_deref()
        .filter(|value| !value.is_empty())
        .or(posting.updated_at.as_deref())
        .unwrap_or("");
    match DateTime::parse_from_rfc3339(stamp) {
        Ok(parsed) => Recency::At(parsed.with_timezone(&Utc)),
        Err(_) => Recency::Text(stamp),
    }
}

/// Incoming records replace existing ones with the same id; new ids are appended.
/// The result is ordered newest first by `posted_at`, then `updated_at`.
pub fn merge(existing: &[RawPosting], incoming: Vec<RawPosting>) -> Vec<RawPosting> {
    let mut merged: Vec<RawPosting> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for posting in existing.iter().cloned().chain(incoming) {
        let Some(id) = posting.posting_id() else {
            continue;
        };
        match positions.get(&id.0) {
            Some(&index) => merged[index] = posting,
            None => {
                positions.insert(id.0, merged.len());
                merged.push(posting);
            }
        }
    }

    merged.sort_by(|left, right| recency(right).cmp(&recency(left)));
    merged
}

/// True when the id set or any `updated_at` differs.
pub fn changed(existing: &[RawPosting], merged: &[RawPosting]) -> bool {
    let before = index_by_id(existing);
    let after = index_by_id(merged);

    if before.len() != after.len() {
        return true;
    }

    after.iter().any(|(id, posting)| match before.get(id) {
        None => true,
        Some(previous) => {
            previous.updated_at.as_deref().unwrap_or("")
                != posting.updated_at.as_deref().unwrap_or("")
        }
    })
}

/// Writes pretty JSON through a sibling temp file and a rename.
pub fn write_atomic<T>(path: &Path, payload: &T) -> Result<(), SourceError>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let body = serde_json::to_string_pretty(payload)?;
    fs::write(&temp, body).map_err(io_error(&temp))?;
    fs::rename(&temp, path).map_err(io_error(path))
}

#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    source: AtsKind,
    company: &'a str,
    error: String,
}

/// Records a failed company fetch next to its cache file.
pub fn write_error(
    dir: &Path,
    kind: AtsKind,
    company: &str,
    error: &dyn std::fmt::Display,
) -> Result<PathBuf, SourceError> {
    let path = error_file(dir, kind, company);
    write_atomic(
        &path,
        &ErrorRecord {
            source: kind,
            company,
            error: error.to_string(),
        },
    )?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(id: &str, posted_at: Option<&str>, updated_at: Option<&str>) -> RawPosting {
        RawPosting {
            id: Some(id.to_string()),
            title: format!("Job {id}"),
            posted_at: posted_at.map(str::to_string),
            updated_at: updated_at.map(str::to_string),
            ..RawPosting::default()
        }
    }

    fn ids(postings: &[RawPosting]) -> Vec<&str> {
        postings.iter().filter_map(|p| p.id.as_deref()).collect()
    }

    #[test]
    fn file_names_follow_source_and_company() {
        let dir = Path::new("data/raw_jobs");
        assert_eq!(
            company_file(dir, AtsKind::Greenhouse, "stripe"),
            PathBuf::from("data/raw_jobs/greenhouse_stripe.json")
        );
        assert_eq!(
            error_file(dir, AtsKind::Lever, "acme"),
            PathBuf::from("data/raw_jobs/lever_acme.error.json")
        );
    }

    #[test]
    fn merge_overrides_appends_and_sorts_newest_first() {
        let existing = vec![
            posting("1", Some("2025-01-01"), Some("a")),
            posting("2", Some("2025-01-03"), Some("a")),
        ];
        let incoming = vec![
            posting("1", Some("2025-01-05"), Some("b")),
            posting("3", None, Some("2025-01-02")),
        ];

        let merged = merge(&existing, incoming);

        assert_eq!(ids(&merged), vec!["1", "2", "3"]);
        assert_eq!(merged[0].updated_at.as_deref(), Some("b"));
    }

    #[test]
    fn merge_orders_timestamps_by_instant_across_offsets() {
        let merged = merge(
            &[],
            vec![
                posting("lever", Some("2025-03-01T12:00:00+00:00"), None),
                posting("greenhouse", None, Some("2025-03-01T10:00:00-05:00")),
                posting("undated", None, None),
                posting("garbled", Some("last tuesday"), None),
            ],
        );

        assert_eq!(ids(&merged), vec!["greenhouse", "lever", "garbled", "undated"]);
    }

    #[test]
    fn merge_skips_records_without_ids() {
        let mut anonymous = posting("x", None, None);
        anonymous.id = None;
        let merged = merge(&[], vec![anonymous, posting("1", None, None)]);
        assert_eq!(ids(&merged), vec!["1"]);
    }

    #[test]
    fn change_detection_tracks_ids_and_updates() {
        let existing = vec![posting("1", None, Some("a")), posting("2", None, None)];

        assert!(!changed(&existing, &existing.clone()));
        assert!(changed(&existing, &[posting("1", None, Some("a"))]));
        assert!(changed(
            &existing,
            &[posting("1", None, Some("b")), posting("2", None, None)]
        ));
        assert!(changed(
            &existing,
            &[posting("1", None, Some("a")), posting("3", None, None)]
        ));
    }
}
