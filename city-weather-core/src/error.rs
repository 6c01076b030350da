use thiserror::Error;

/// Every way a single weather request can fail.
///
/// The `Display` text is the message shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// City text was empty or could not be encoded into a query.
    #[error("Invalid city name")]
    InvalidCity,

    /// The request URL could not be assembled.
    #[error("Invalid URL")]
    InvalidUrl,

    /// Connectivity, DNS, TLS or body-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status that carries no more specific meaning.
    #[error("Server error: {0}")]
    Server(u16),

    #[error("City not found")]
    CityNotFound,

    #[error("No data received")]
    NoData,

    /// Body did not match the expected JSON shape.
    #[error("Error decoding data: {0}")]
    Decoding(String),
}

impl WeatherError {
    /// True for failures detected before anything was sent.
    pub fn is_client_side(&self) -> bool {
        matches!(self, WeatherError::InvalidCity | WeatherError::InvalidUrl)
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Decoding(err.to_string())
    }
}
