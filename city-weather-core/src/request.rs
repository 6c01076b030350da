//! Turns user-typed city text into the OpenWeather request URL.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;

use crate::error::WeatherError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Everything except RFC 3986 unreserved characters gets escaped, so `&`, `=`,
/// `+` and `#` in a city name cannot break out of the `q` parameter.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode a city name for the `q` parameter.
///
/// Blank text and text with control characters are rejected: neither can name
/// a city and both would be mangled by the upstream API.
pub fn encode_city(city: &str) -> Result<String, WeatherError> {
    if city.trim().is_empty() || city.chars().any(char::is_control) {
        return Err(WeatherError::InvalidCity);
    }

    Ok(utf8_percent_encode(city, QUERY_VALUE).to_string())
}

/// Build the current-weather URL against the public endpoint.
pub fn build(city: &str, api_key: &str) -> Result<Url, WeatherError> {
    build_with_base(DEFAULT_BASE_URL, city, api_key)
}

/// Build the current-weather URL against `base_url`; metric units are fixed.
pub fn build_with_base(base_url: &str, city: &str, api_key: &str) -> Result<Url, WeatherError> {
    let encoded_city = encode_city(city)?;
    let encoded_key = utf8_percent_encode(api_key, QUERY_VALUE);

    let raw = format!("{base_url}?q={encoded_city}&APPID={encoded_key}&units=metric");

    Url::parse(&raw).map_err(|_| WeatherError::InvalidUrl)
}
