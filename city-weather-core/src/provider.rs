use crate::{Config, WeatherError, WeatherRecord, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key()?;
    OpenWeatherClient::builder(api_key.to_owned())
        .base_url(config.base_url().to_owned())
        .timeout(config.timeout())
        .build()
}
