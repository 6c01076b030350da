//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Request building: city text to a validated OpenWeather URL
//! - Response classification: one HTTP exchange to one typed outcome
//! - Published fetch state that rendering layers observe
//! - Configuration & credentials handling
//!
//! It is used by `city-weather-cli`, but can also be reused by other front ends.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod request;
pub mod state;

pub use classify::{Exchange, HttpResponse, classify};
pub use config::Config;
pub use error::WeatherError;
pub use model::{ApiErrorBody, Condition, MainReadings, WeatherRecord};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use state::{FetchState, Outcome, RequestId, WeatherSession, WeatherStore};
