use crate::config::settings::WeatherSettings;
use crate::config::theatre::Units;
use crate::domain::model::{WeatherReport, WeatherSnapshot};
use crate::domain::ports::WeatherProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;

/// Forecast client for weatherapi.com.
pub struct WeatherApiClient {
    client: Client,
    endpoint: String,
    forecast_days: u32,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Option<Forecast>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    #[serde(default)]
    hour: Vec<HourData>,
}

#[derive(Debug, Clone, Deserialize)]
struct HourData {
    temp_f: f64,
    temp_c: f64,
    condition: Condition,
    is_day: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct Condition {
    text: String,
    code: u32,
}

impl WeatherApiClient {
    pub fn new(client: Client, settings: &WeatherSettings, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            forecast_days: settings.forecast_days,
            api_key,
        }
    }

    /// `Ok(None)` when the service answered without a usable forecast.
    pub async fn fetch_forecast(
        &self,
        api_key: &str,
        latitude: f64,
        longitude: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        units: Units,
    ) -> Result<Option<WeatherReport>> {
        let query = [
            ("key", api_key.to_string()),
            ("q", format!("{},{}", latitude, longitude)),
            ("dt", start.format("%Y-%m-%d").to_string()),
            ("days", self.forecast_days.to_string()),
        ];

        tracing::debug!("Requesting forecast from {}", self.endpoint);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        tracing::debug!("Weather API response status: {}", response.status());

        let data: ForecastResponse = response.json().await?;
        let Some(forecast) = data.forecast else {
            return Ok(None);
        };

        let arrival_at = start - Duration::hours(1);
        let arrival = find_hour_data(&forecast.forecastday, arrival_at);
        let departure = find_hour_data(&forecast.forecastday, end);

        Ok(match (arrival, departure) {
            (Some(arrival), Some(departure)) => Some(WeatherReport {
                arrival: snapshot(arrival, units),
                departure: snapshot(departure, units),
            }),
            _ => None,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        units: Units,
    ) -> WeatherReport {
        let Some(api_key) = self.api_key.as_deref() else {
            return WeatherReport::fallback();
        };

        match self
            .fetch_forecast(api_key, latitude, longitude, start, end, units)
            .await
        {
            Ok(Some(report)) => report,
            Ok(None) => {
                tracing::warn!("⚠️ Weather API returned no usable forecast; using placeholders");
                WeatherReport::fallback()
            }
            Err(e) => {
                tracing::warn!("⚠️ Weather error: {}", e);
                WeatherReport::fallback()
            }
        }
    }
}

/// The day matching the target date (else the first day), at the target hour.
fn find_hour_data(days: &[ForecastDay], target: NaiveDateTime) -> Option<&HourData> {
    let target_date = target.format("%Y-%m-%d").to_string();
    let day = days
        .iter()
        .find(|d| d.date == target_date)
        .or_else(|| days.first())?;
    day.hour.get(target.hour() as usize)
}

fn snapshot(hour: &HourData, units: Units) -> WeatherSnapshot {
    let (temp, symbol) = match units {
        Units::Imperial => (hour.temp_f, "°F"),
        Units::Metric => (hour.temp_c, "°C"),
    };
    let is_day = hour.is_day == 1;
    WeatherSnapshot {
        temp: format!("{}{}", temp.round_ties_even() as i64, symbol),
        condition: hour.condition.text.clone(),
        icon: map_icon(hour.condition.code, is_day).to_string(),
        is_day,
    }
}

/// weatherapi.com condition code to emoji.
pub fn map_icon(code: u32, is_day: bool) -> &'static str {
    match code {
        1000 => {
            if is_day {
                "☀️"
            } else {
                "🌙"
            }
        }
        1003 => {
            if is_day {
                "⛅"
            } else {
                "☁️"
            }
        }
        1006 | 1009 | 1030 | 1135 | 1147 => "☁️",
        1063 | 1150 | 1153 | 1180 | 1183 | 1186 | 1189 | 1192 | 1195 | 1240 | 1243 | 1246 => "🌧️",
        1066 | 1114 | 1210 | 1213 | 1216 | 1219 | 1222 | 1225 | 1255 | 1258 => "❄️",
        1087 | 1273 | 1276 | 1279 | 1282 => "⛈️",
        _ => "⛅",
    }
}
