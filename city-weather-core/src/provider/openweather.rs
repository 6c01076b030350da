use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    classify::{Exchange, HttpResponse, classify},
    error::WeatherError,
    model::WeatherRecord,
    request::{self, DEFAULT_BASE_URL},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenWeatherClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenWeatherClient> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(OpenWeatherClient {
            api_key: self.api_key,
            base_url: self.base_url,
            http: http.build().context("Failed to build HTTP client")?,
        })
    }
}

impl OpenWeatherClient {
    pub fn builder(api_key: String) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder { api_key, base_url: DEFAULT_BASE_URL.to_owned(), timeout: None }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Flatten a reqwest error and its sources into one line. The request URL
    /// carries the API key, so it is stripped and any remaining copy masked.
    fn describe(&self, err: reqwest::Error) -> String {
        let err = err.without_url();
        let mut detail = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }

        if self.api_key.is_empty() {
            detail
        } else {
            detail.replace(&self.api_key, "***")
        }
    }

    /// Perform the GET and capture whatever came back, without judging it.
    async fn exchange(&self, url: reqwest::Url) -> Exchange {
        let res = match self.http.get(url).send().await {
            Ok(res) => res,
            Err(err) => return Exchange::Transport(self.describe(err)),
        };

        let status = res.status().as_u16();
        let headers = res.headers().clone();

        match res.bytes().await {
            Ok(body) => Exchange::Completed(HttpResponse::new(status, headers, body.to_vec())),
            Err(err) => Exchange::Transport(self.describe(err)),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let url = request::build_with_base(&self.base_url, city, &self.api_key)?;
        debug!(host = ?url.host_str(), path = url.path(), "Sending current weather request");

        let exchange = self.exchange(url).await;
        classify(&exchange)
    }
}
