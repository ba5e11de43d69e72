use super::SourceError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const GREENHOUSE_API: &str = "https://boards-api.greenhouse.io/v1/boards";
const LEVER_API: &str = "https://api.lever.co/v0/postings";

/// HTTP access to the public Greenhouse and Lever board APIs.
#[derive(Debug, Clone)]
pub struct BoardClient {
    http: Client,
    greenhouse_base: String,
    lever_base: String,
}

impl BoardClient {
    pub fn new() -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("job-matcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            http,
            greenhouse_base: GREENHOUSE_API.to_string(),
            lever_base: LEVER_API.to_string(),
        })
    }

    /// Points the client at alternative API roots, e.g. a local fixture server.
    pub fn with_base_urls(mut self, greenhouse: &str, lever: &str) -> Self {
        self.greenhouse_base = greenhouse.trim_end_matches('/').to_string();
        self.lever_base = lever.trim_end_matches('/').to_string();
        self
    }

    pub fn greenhouse_jobs_url(&self, company: &str) -> String {
        format!("{}/{company}/jobs", self.greenhouse_base)
    }

    pub fn greenhouse_job_url(&self, company: &str, job_id: &str) -> String {
        format!("{}/{company}/jobs/{job_id}", self.greenhouse_base)
    }

    pub fn lever_postings_url(&self, company: &str) -> String {
        format!("{}/{company}?mode=json", self.lever_base)
    }

    /// GETs and decodes a JSON document. `Ok(None)` means the resource does not exist.
    pub(crate) async fn get_json<T>(&self, url: &str) -> Result<Option<T>, SourceError>
    where
        T: DeserializeOwned,
    {
        debug!(url, "fetching");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SourceError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| SourceError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_public_api_layout() {
        let client = BoardClient::new().expect("client builds");
        assert_eq!(
            client.greenhouse_jobs_url("stripe"),
            "https://boards-api.greenhouse.io/v1/boards/stripe/jobs"
        );
        assert_eq!(
            client.greenhouse_job_url("stripe", "42"),
            "https://boards-api.greenhouse.io/v1/boards/stripe/jobs/42"
        );
        assert_eq!(
            client.lever_postings_url("acme"),
            "https://api.lever.co/v0/postings/acme?mode=json"
        );
    }

    #[test]
    fn base_urls_can_be_overridden() {
        let client = BoardClient::new()
            .expect("client builds")
            .with_base_urls("http://127.0.0.1:9/gh/", "http://127.0.0.1:9/lever");
        assert_eq!(
            client.greenhouse_jobs_url("acme"),
            "http://127.0.0.1:9/gh/acme/jobs"
        );
        assert_eq!(
            client.lever_postings_url("acme"),
            "http://127.0.0.1:9/lever/acme?mode=json"
        );
    }
}
