use serde::{Deserialize, Serialize};

/// Current conditions for one location, as returned by `/data/2.5/weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub name: String,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
}

impl WeatherRecord {
    /// The condition consumers display; the API may send none.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// hPa
    pub pressure: i64,
    /// Percent.
    pub humidity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Error payload OpenWeather sends alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub cod: String,
    pub message: String,
}

impl ApiErrorBody {
    pub const CITY_NOT_FOUND: &'static str = "city not found";

    pub fn is_city_not_found(&self) -> bool {
        self.message == Self::CITY_NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_no_conditions_has_no_primary() {
        let record: WeatherRecord = serde_json::from_str(
            r#"{"name":"Oslo","main":{"temp":-3.5,"feels_like":-8.0,"temp_min":-5.0,"temp_max":-1.0,"pressure":1030,"humidity":85},"weather":[]}"#,
        )
        .expect("record should decode");

        assert_eq!(record.name, "Oslo");
        assert!(record.primary_condition().is_none());
    }

    #[test]
    fn city_not_found_match_is_exact() {
        let exact = ApiErrorBody { cod: "404".into(), message: "city not found".into() };
        let shouted = ApiErrorBody { cod: "404".into(), message: "City not found".into() };

        assert!(exact.is_city_not_found());
        assert!(!shouted.is_city_not_found());
    }
}
