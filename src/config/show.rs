use crate::utils::error::{PreshowError, Result};
use crate::utils::time::{normalize_datetime, parse_show_datetime};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-performance details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowInfo {
    pub show_title: String,
    pub start_time: String,
    pub end_time: String,
    pub doors_open_time: String,
    pub intermission_description: String,
    pub timezone_abbreviation: String,
    pub audience_rating: String,
    pub content_warnings: String,
}

impl ShowInfo {
    /// JSON by default; `.yaml`/`.yml` files are read as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(PreshowError::IoError)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let show: ShowInfo = serde_json::from_str(content)?;
        Ok(show.normalized())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let show: ShowInfo = serde_yaml::from_str(content)?;
        Ok(show.normalized())
    }

    /// Pads `YYYY-MM-DDTHH:MM` values with seconds.
    pub fn normalized(mut self) -> Self {
        self.start_time = normalize_datetime(&self.start_time);
        self.end_time = normalize_datetime(&self.end_time);
        self.doors_open_time = normalize_datetime(&self.doors_open_time);
        self
    }

    pub fn start(&self) -> Result<NaiveDateTime> {
        parse_show_datetime(&self.start_time)
    }

    pub fn end(&self) -> Result<NaiveDateTime> {
        parse_show_datetime(&self.end_time)
    }
}

impl Validate for ShowInfo {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("show_title", &self.show_title)?;

        let start = self.start()?;
        let end = self.end()?;
        if end < start {
            return Err(PreshowError::InvalidConfigValueError {
                field: "end_time".to_string(),
                value: self.end_time.clone(),
                reason: format!("Show ends before it starts ({})", self.start_time),
            });
        }

        if !self.doors_open_time.is_empty() {
            parse_show_datetime(&self.doors_open_time)?;
        }
        Ok(())
    }
}
