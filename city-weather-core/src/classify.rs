//! Interprets a finished HTTP exchange as exactly one weather outcome.

use reqwest::{StatusCode, header::HeaderMap};
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{ApiErrorBody, WeatherRecord},
};

/// Result of talking to the API, before any interpretation.
#[derive(Debug, Clone)]
pub enum Exchange {
    /// The request never produced a complete response.
    Transport(String),
    Completed(HttpResponse),
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// `None` when the server sent no bytes at all.
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        let body = if body.is_empty() { None } else { Some(body) };
        Self { status, headers, body }
    }
}

/// Classify an exchange. Never panics; every path is terminal.
pub fn classify(exchange: &Exchange) -> Result<WeatherRecord, WeatherError> {
    let response = match exchange {
        Exchange::Transport(detail) => {
            let err = WeatherError::Network(detail.clone());
            log_exchange(None, None, None, Some(&err));
            return Err(err);
        }
        Exchange::Completed(response) => response,
    };

    let outcome = classify_response(response);
    log_exchange(
        Some(response.status),
        Some(&response.headers),
        response.body.as_deref(),
        outcome.as_ref().err(),
    );
    outcome
}

fn classify_response(response: &HttpResponse) -> Result<WeatherRecord, WeatherError> {
    let status = response.status;

    let body = match response.body.as_deref() {
        Some(body) => body,
        None if expects_content(status) => return Err(WeatherError::NoData),
        None => return Err(WeatherError::Server(status)),
    };

    if status == StatusCode::NOT_FOUND.as_u16() {
        let api_error: ApiErrorBody = serde_json::from_slice(body)?;
        return if api_error.is_city_not_found() {
            Err(WeatherError::CityNotFound)
        } else {
            Err(WeatherError::Server(status))
        };
    }

    if !(200..=299).contains(&status) {
        return Err(WeatherError::Server(status));
    }

    Ok(serde_json::from_slice(body)?)
}

/// Statuses whose body is read by the classifier.
fn expects_content(status: u16) -> bool {
    (200..=299).contains(&status) || status == StatusCode::NOT_FOUND.as_u16()
}

fn log_exchange(
    status: Option<u16>,
    headers: Option<&HeaderMap>,
    body: Option<&[u8]>,
    error: Option<&WeatherError>,
) {
    let body = body.map(body_text).unwrap_or_default();
    let error = error.map(ToString::to_string);

    debug!(?status, ?headers, %body, ?error, "API response");
}

fn body_text(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_owned(),
        Err(_) => format!("<non-utf8 body, {} bytes>", body.len()),
    }
}
