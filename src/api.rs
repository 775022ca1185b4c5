mod stats;

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub use stats::StatisticsRecord;

use crate::series::Timeline;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to reach statistics api: {0}")]
    Network(#[from] reqwest::Error),
    #[error("statistics api answered with HTTP {0}")]
    Http(StatusCode),
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("base url cannot take a path")]
    BaseUrl,
}

impl Error {
    /// Whether the request never produced a usable HTTP answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http(_))
    }
}

#[derive(Debug, Deserialize)]
struct Historical {
    timeline: Timeline,
}

/// Client for a disease.sh compatible COVID-19 statistics API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::BaseUrl);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covidstatsbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, http })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::BaseUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        log::info!("Get {url} {params:?}");

        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Worldwide figures.
    pub async fn fetch_global(&self, yesterday: bool) -> Result<StatisticsRecord, Error> {
        self.get_json(&["all"], &[("yesterday", yesterday.to_string())])
            .await
    }

    /// Figures for every country, sorted by case count when `sort` is set.
    pub async fn fetch_countries(
        &self,
        yesterday: bool,
        sort: bool,
    ) -> Result<Vec<StatisticsRecord>, Error> {
        let params = [
            ("yesterday", yesterday.to_string()),
            ("sort", sort.to_string()),
        ];
        self.get_json(&["countries"], &params).await
    }

    /// Cumulative time series for one country. Without `last_days` the API
    /// picks its own default window.
    pub async fn fetch_historical(
        &self,
        country: &str,
        last_days: Option<u32>,
    ) -> Result<Timeline, Error> {
        let params: Vec<_> = last_days
            .map(|days| ("lastdays", days.to_string()))
            .into_iter()
            .collect();
        let historical: Historical = self.get_json(&["historical", country], &params).await?;
        Ok(historical.timeline)
    }

    /// Lowercase names of all countries the API knows about.
    pub async fn country_names(&self) -> Result<Vec<String>, Error> {
        let records = self.fetch_countries(true, true).await?;
        Ok(crate::resolver::country_names(&records))
    }
}
