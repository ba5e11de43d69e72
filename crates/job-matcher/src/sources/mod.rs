//! ATS board adapters and the on-disk raw posting cache they feed.

pub mod cache;
mod client;
pub mod greenhouse;
pub mod lever;
mod refresh;

pub use client::BoardClient;
pub use refresh::{refresh_all, CompanyRefresh, RefreshStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Applicant tracking systems with a public job board API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsKind {
    Greenhouse,
    Lever,
}

impl AtsKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greenhouse => "greenhouse",
            Self::Lever => "lever",
        }
    }
}

impl fmt::Display for AtsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to encode cache file: {0}")]
    Encode(#[from] serde_json::Error),
}
