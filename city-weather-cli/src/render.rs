use city_weather_core::{WeatherError, WeatherRecord};

/// Human-readable current conditions, one field per line.
pub fn record(record: &WeatherRecord) -> String {
    let main = &record.main;
    let mut lines = vec![
        format!("City: {}", record.name),
        format!("Temperature: {:.1}°C", main.temp),
        format!("Feels like: {:.1}°C", main.feels_like),
        format!("Min Temp: {:.1}°C", main.temp_min),
        format!("Max Temp: {:.1}°C", main.temp_max),
        format!("Pressure: {} hPa", main.pressure),
        format!("Humidity: {}%", main.humidity),
    ];
    if let Some(condition) = record.primary_condition() {
        lines.push(format!("Description: {}", condition.description));
    }

    lines.iter().map(|line| format!("{line}\n")).collect()
}

pub fn error(err: &WeatherError) -> String {
    match err {
        WeatherError::Server(401) => {
            format!("{err}\nHint: check your API key with `weather configure`.")
        }
        _ => err.to_string(),
    }
}
