use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::fmt;
use std::str::FromStr;

use crate::api::models::{SearchRequest, SearchResponse};

use super::input::SearchForm;
use super::render::{Surface, render_results};

/// The server route a controller posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endpoint {
    #[default]
    Results,
    Documents,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Results => "/results",
            Endpoint::Documents => "/documents",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Endpoint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/') {
            "results" => Ok(Endpoint::Results),
            "documents" => Ok(Endpoint::Documents),
            other => Err(anyhow::anyhow!("unknown endpoint: {other}")),
        }
    }
}

/// Which of the two error channels, if any, a submit ended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Results were rendered.
    Rendered(usize),
    /// The server answered with no results; the no-results alert was shown.
    NoResults,
    /// The envelope carried an error message; it was shown as an alert.
    ServerError(String),
    /// Non-success HTTP status. Logged only.
    HttpStatus(StatusCode),
    /// The request or the response body failed. Logged only.
    TransportFailed,
}

/// Posts the search form to the server and renders what comes back.
pub struct SearchController {
    http: reqwest::Client,
    base_url: String,
    endpoint: Endpoint,
}

impl SearchController {
    pub fn new(base_url: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, endpoint)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = endpoint;
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint.path())
    }

    /// Sends `form` and updates `surface`. Transport and HTTP failures are logged and
    /// leave the surface untouched; errors reported by the server become alerts.
    pub async fn submit(&self, form: &SearchForm, surface: &mut dyn Surface) -> SubmitOutcome {
        let response = match self.post(form).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("There was a problem with the fetch operation: {:#}", e);
                return SubmitOutcome::TransportFailed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::error!(
                "There was a problem with the fetch operation: network response was not ok ({})",
                status
            );
            return SubmitOutcome::HttpStatus(status);
        }

        match response.json::<SearchResponse>().await {
            Ok(envelope) => apply_envelope(envelope, surface),
            Err(e) => {
                log::error!("There was a problem with the fetch operation: {:#}", e);
                SubmitOutcome::TransportFailed
            }
        }
    }

    async fn post(&self, form: &SearchForm) -> Result<reqwest::Response> {
        let body = SearchRequest {
            query: form.query.clone(),
            algorithm: form.algorithm.clone(),
        };
        let url = self.url();
        log::debug!("POST {} {:?}", url, body);
        self.http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))
    }
}

/// Routes a parsed envelope: an error message wins over any results that came with it.
/// A missing `results` field renders as an empty list.
pub fn apply_envelope(envelope: SearchResponse, surface: &mut dyn Surface) -> SubmitOutcome {
    if let Some(message) = envelope.error_message {
        surface.alert(&message);
        return SubmitOutcome::ServerError(message);
    }
    let results = envelope.results.unwrap_or_default();
    render_results(surface, &results);
    if results.is_empty() {
        SubmitOutcome::NoResults
    } else {
        SubmitOutcome::Rendered(results.len())
    }
}
