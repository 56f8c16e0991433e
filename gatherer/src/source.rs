use crate::error::FetchError;
use reqwest::{
    header::ACCEPT,
    Client as HttpClient,
};
use serde_json::Value;
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";

/// Supplies one status document per tick.
pub trait JobSource {
    /// Fetch the current status document
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Value, FetchError>> + Send + '_>>;

    /// Human readable description of where documents come from
    fn describe(&self) -> String;
}

/// Reads `GET <base_url>/jobs` from an Immich server.
pub struct HttpJobSource {
    http_client: HttpClient,
    jobs_url: Url,
    api_key: String,
}

impl HttpJobSource {
    pub fn new(base_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            jobs_url: jobs_url(base_url)?,
            api_key: api_key.into(),
        })
    }

    pub fn jobs_url(&self) -> &Url {
        &self.jobs_url
    }
}

fn jobs_url(base_url: &Url) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}/jobs", base_url.as_str().trim_end_matches('/')))
}

impl JobSource for HttpJobSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Value, FetchError>> + Send + '_>> {
        Box::pin(async move {
            let start = std::time::Instant::now();
            let response = self
                .http_client
                .get(self.jobs_url.clone())
                .header(ACCEPT, "application/json")
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
                });
            }

            let body = response.bytes().await?;
            debug!(
                bytes = body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "fetched jobs document"
            );
            let document = serde_json::from_str(&String::from_utf8_lossy(&body))?;
            Ok(document)
        })
    }

    fn describe(&self) -> String {
        self.jobs_url.to_string()
    }
}
