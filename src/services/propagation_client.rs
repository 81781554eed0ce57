use super::propagation_parser::parse_propagation;
use crate::models::PropagationSnapshot;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PROPAGATION_URL: &str = "https://www.hamqsl.com/solarxml.php";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("propagation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("propagation feed returned HTTP {0}")]
    Status(u16),
}

/// Fetches and decodes the solar/VHF propagation feed
#[derive(Clone)]
pub struct PropagationClient {
    client: Client,
    url: String,
}

impl PropagationClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dx-companion/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// One GET of the feed. Anything but 200 fails the whole refresh.
    pub async fn fetch(&self) -> Result<PropagationSnapshot, FetchError> {
        tracing::info!("Fetching propagation data from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let snapshot = parse_propagation(&body);
        tracing::debug!(
            sfi = snapshot.solar_flux,
            a = snapshot.a_index,
            k = snapshot.k_index,
            "propagation data parsed"
        );
        Ok(snapshot)
    }
}
