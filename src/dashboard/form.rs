//! Editor form payloads and how they merge into config and show data.

use crate::config::show::ShowInfo;
use crate::config::theatre::{normalize_hex, TheatreConfig};
use crate::render::ThemeMode;
use crate::utils::time::normalize_datetime;
use serde::{Deserialize, Serialize};

/// Every editor field. Blank strings mean "not filled in".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailForm {
    /// Base config (defaults or an uploaded YAML) the fields are merged into.
    pub config: Option<TheatreConfig>,

    pub show_title: String,
    pub start_time: String,
    pub end_time: String,
    pub doors_open_time: String,
    pub intermission_description: String,
    pub timezone_abbreviation: String,
    pub audience_rating: String,
    pub content_warnings: String,

    pub theatre_name: String,
    pub theatre_address: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub accessibility_note: String,
    pub logo_url: String,
    pub primary_color: String,
    pub primary_color_hex: String,
    pub secondary_color: String,
    pub secondary_color_hex: String,
    pub headline_color: String,
    pub headline_color_hex: String,
    pub concessions_description: String,
    pub sponsor_name: String,
    pub sponsor_url: String,
    /// Comma-separated
    pub whitelist: String,
    /// Comma-separated
    pub blacklist: String,
    pub latitude: String,
    pub longitude: String,
    pub radius: String,
    pub whitelist_radius: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub form: EmailForm,
    pub theme: ThemeMode,
}

/// Export/send/schedule reuse the last preview HTML when the page sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublishRequest {
    #[serde(flatten)]
    pub form: EmailForm,
    pub html: Option<String>,
    /// Local `datetime-local` value, only for scheduling.
    pub schedule_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SentQuery {
    pub since: Option<String>,
    pub until: Option<String>,
}

pub fn csv_to_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Hex input wins over the color picker.
fn pick_color(hex: &str, picker: &str) -> String {
    if hex.trim().is_empty() {
        normalize_hex(picker)
    } else {
        normalize_hex(hex)
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<Option<T>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| format!("{} must be a number, got '{}'", field, value))
}

impl EmailForm {
    pub fn show_info(&self) -> ShowInfo {
        ShowInfo {
            show_title: self.show_title.clone(),
            start_time: normalize_datetime(&self.start_time),
            end_time: normalize_datetime(&self.end_time),
            doors_open_time: normalize_datetime(&self.doors_open_time),
            intermission_description: self.intermission_description.clone(),
            timezone_abbreviation: self.timezone_abbreviation.clone(),
            audience_rating: self.audience_rating.clone(),
            content_warnings: self.content_warnings.clone(),
        }
    }

    /// Overlays the form onto `fallback` (or the config carried by the form).
    /// Empty coordinates clear the location; empty radii keep the base value.
    pub fn theatre_config(&self, fallback: &TheatreConfig) -> Result<TheatreConfig, String> {
        let mut config = self.config.clone().unwrap_or_else(|| fallback.clone());

        config.theatre.name = self.theatre_name.clone();
        config.theatre.address = self.theatre_address.clone();
        config.theatre.location.latitude = parse_number("latitude", &self.latitude)?;
        config.theatre.location.longitude = parse_number("longitude", &self.longitude)?;
        if let Some(radius) = parse_number("radius", &self.radius)? {
            config.theatre.radius_meters = radius;
        }
        if let Some(radius) = parse_number("whitelist_radius", &self.whitelist_radius)? {
            config.theatre.whitelist_radius_meters = radius;
        }

        config.branding.primary_color = pick_color(&self.primary_color_hex, &self.primary_color);
        config.branding.secondary_color =
            pick_color(&self.secondary_color_hex, &self.secondary_color);
        config.branding.headline_color = pick_color(&self.headline_color_hex, &self.headline_color);
        config.branding.logo_url = self.logo_url.trim().to_string();

        config.details.contact_phone = self.contact_phone.clone();
        config.details.contact_email = self.contact_email.clone();
        config.details.accessibility_note = self.accessibility_note.clone();

        config.concessions.description = self.concessions_description.clone();
        config.concessions.sponsor.name = self.sponsor_name.clone();
        config.concessions.sponsor.url = self.sponsor_url.clone();

        config.lists.whitelist = csv_to_list(&self.whitelist);
        config.lists.blacklist = csv_to_list(&self.blacklist);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TheatreConfig {
        let mut config = TheatreConfig::default();
        config.theatre.radius_meters = 900;
        config.theatre.whitelist_radius_meters = 2000;
        config.branding.primary_color = "#000000".to_string();
        config
    }

    #[test]
    fn test_csv_to_list() {
        assert_eq!(csv_to_list(" Joe's ,, Harbor Wines ,"), vec!["Joe's", "Harbor Wines"]);
        assert!(csv_to_list("").is_empty());
    }

    #[test]
    fn test_show_info_pads_datetime_local() {
        let form = EmailForm {
            show_title: "Hamlet".to_string(),
            start_time: "2025-11-20T19:30".to_string(),
            end_time: "2025-11-20T22:00:00".to_string(),
            ..EmailForm::default()
        };
        let show = form.show_info();
        assert_eq!(show.start_time, "2025-11-20T19:30:00");
        assert_eq!(show.end_time, "2025-11-20T22:00:00");
        assert_eq!(show.doors_open_time, "");
    }

    #[test]
    fn test_theatre_config_merge() {
        let form = EmailForm {
            theatre_name: "Riverside Playhouse".to_string(),
            latitude: "43.6591".to_string(),
            longitude: "-70.2568".to_string(),
            radius: "".to_string(),
            whitelist_radius: "1200".to_string(),
            primary_color: "#111111".to_string(),
            primary_color_hex: "e86a4f".to_string(),
            secondary_color: "#17162a".to_string(),
            whitelist: "Harbor, Dock".to_string(),
            ..EmailForm::default()
        };

        let config = form.theatre_config(&base()).unwrap();
        assert_eq!(config.theatre.name, "Riverside Playhouse");
        assert_eq!(config.theatre.location.latitude, Some(43.6591));
        assert_eq!(config.theatre.radius_meters, 900);
        assert_eq!(config.theatre.whitelist_radius_meters, 1200);
        assert_eq!(config.branding.primary_color, "#e86a4f");
        assert_eq!(config.branding.secondary_color, "#17162a");
        assert_eq!(config.lists.whitelist, vec!["Harbor", "Dock"]);
    }

    #[test]
    fn test_empty_coordinates_clear_location() {
        let mut fallback = base();
        fallback.theatre.location.latitude = Some(1.0);
        let config = EmailForm::default().theatre_config(&fallback).unwrap();
        assert_eq!(config.theatre.location.latitude, None);
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let form = EmailForm {
            radius: "far".to_string(),
            ..EmailForm::default()
        };
        let err = form.theatre_config(&base()).unwrap_err();
        assert!(err.contains("radius"));
    }

    #[test]
    fn test_preview_request_flattens_form() {
        let request: PreviewRequest =
            serde_json::from_str(r#"{"show_title": "Hamlet", "theme": "dark"}"#).unwrap();
        assert_eq!(request.form.show_title, "Hamlet");
        assert_eq!(request.theme, ThemeMode::Dark);
    }
}
