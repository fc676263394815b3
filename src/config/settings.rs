use crate::config::theatre::substitute_env_vars;
use crate::utils::error::{PreshowError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";

/// Tool settings from `preshow.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub weather: WeatherSettings,
    pub places: PlacesSettings,
    pub mailchimp: MailchimpSettings,
    pub images: ImageSettings,
    pub dashboard: DashboardSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub endpoint: String,
    pub forecast_days: u32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://api.weatherapi.com/v1/forecast.json".to_string(),
            forecast_days: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesSettings {
    pub search_endpoint: String,
    pub details_endpoint: String,
    pub max_results_per_category: usize,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            search_endpoint: "https://maps.googleapis.com/maps/api/place/nearbysearch/json"
                .to_string(),
            details_endpoint: "https://maps.googleapis.com/maps/api/place/details/json".to_string(),
            max_results_per_category: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailchimpSettings {
    /// Overrides `https://<server>.api.mailchimp.com/3.0`.
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub raster_endpoint: String,
    pub logo_embed_width: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            raster_endpoint: "https://images.weserv.nl/".to_string(),
            logo_embed_width: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
    /// Seconds without a heartbeat from the page before the server exits.
    pub heartbeat_timeout_seconds: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            open_browser: true,
            heartbeat_timeout_seconds: 120,
        }
    }
}

impl DashboardSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: String,
    pub html_filename: String,
    pub standalone_html_filename: String,
    pub text_filename: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            html_filename: "email.html".to_string(),
            standalone_html_filename: "email_standalone.html".to_string(),
            text_filename: "email.txt".to_string(),
        }
    }
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PreshowError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| PreshowError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path, else a discovered `preshow.toml`, else defaults.
    pub fn load(explicit: Option<&Path>, discovered: Option<&Path>) -> Result<Self> {
        match explicit.or(discovered) {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_seconds)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;
        validation::validate_url("weather.endpoint", &self.weather.endpoint)?;
        validation::validate_range("weather.forecast_days", self.weather.forecast_days, 1, 14)?;
        validation::validate_url("places.search_endpoint", &self.places.search_endpoint)?;
        validation::validate_url("places.details_endpoint", &self.places.details_endpoint)?;
        validation::validate_positive_number(
            "places.max_results_per_category",
            self.places.max_results_per_category as u64,
            1,
        )?;
        if let Some(base) = &self.mailchimp.api_base {
            validation::validate_url("mailchimp.api_base", base)?;
        }
        validation::validate_url("images.raster_endpoint", &self.images.raster_endpoint)?;
        validation::validate_positive_number(
            "dashboard.heartbeat_timeout_seconds",
            self.dashboard.heartbeat_timeout_seconds,
            5,
        )?;
        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_path("output.html_filename", &self.output.html_filename)?;
        validation::validate_path(
            "output.standalone_html_filename",
            &self.output.standalone_html_filename,
        )?;
        validation::validate_path("output.text_filename", &self.output.text_filename)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.dashboard.url(), "http://127.0.0.1:8050/");
        assert_eq!(settings.places.max_results_per_category, 3);
    }

    #[test]
    fn test_heartbeat_timeout_outlasts_throttled_tabs() {
        // Hidden browser tabs may only fire timers once a minute.
        let settings = Settings::default();
        assert_eq!(settings.dashboard.heartbeat_timeout_seconds, 120);
        assert!(settings.dashboard.heartbeat_timeout_seconds > 60);
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml_str(
            r#"
[http]
timeout_seconds = 4

[dashboard]
port = 9000
open_browser = false
"#,
        )
        .unwrap();

        assert_eq!(settings.http.timeout_seconds, 4);
        assert_eq!(settings.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.dashboard.port, 9000);
        assert!(!settings.dashboard.open_browser);
        assert_eq!(settings.output.html_filename, "email.html");
    }

    #[test]
    fn test_invalid_endpoint() {
        let settings = Settings::from_toml_str("[weather]\nendpoint = \"not-a-url\"\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let settings = Settings::load(None, None).unwrap();
        assert_eq!(settings.output.directory, ".");
    }

    #[test]
    fn test_bad_toml() {
        assert!(Settings::from_toml_str("[http\n").is_err());
    }
}
