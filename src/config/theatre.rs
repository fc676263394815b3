use crate::utils::error::{PreshowError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Theatre-wide settings loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheatreConfig {
    pub theatre: TheatreInfo,
    pub branding: Branding,
    pub details: Details,
    pub concessions: Concessions,
    #[serde(deserialize_with = "null_as_default")]
    pub lists: PlaceLists,
    pub settings: RenderSettings,
    pub business_categories: BusinessCategories,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheatreInfo {
    pub name: String,
    pub address: String,
    pub location: Location,
    pub radius_meters: u32,
    pub whitelist_radius_meters: u32,
}

impl Default for TheatreInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            location: Location::default(),
            radius_meters: 800,
            whitelist_radius_meters: 1500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub logo_url: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub headline_color: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo_url: String::new(),
            primary_color: "#e86a4f".to_string(),
            secondary_color: "#17162a".to_string(),
            headline_color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    pub contact_phone: String,
    pub contact_email: String,
    pub accessibility_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concessions {
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sponsor: Sponsor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsor {
    pub name: String,
    pub url: String,
}

/// Name fragments matched case-insensitively against place names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceLists {
    #[serde(deserialize_with = "null_as_default")]
    pub whitelist: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub units: Units,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessCategories {
    pub pre_show: Vec<BusinessCategory>,
    pub post_show: Vec<BusinessCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCategory {
    pub name: String,
    pub keyword: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `"e86a4f "` becomes `"#e86a4f"`; empty stays empty.
pub fn normalize_hex(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{}", value)
    }
}

impl TheatreConfig {
    /// 從 YAML 檔案載入劇院配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PreshowError::IoError)?;
        Self::from_yaml_str(&content)
    }

    /// 從 YAML 字串解析配置，先替換 ${VAR} 環境變數
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        serde_yaml::from_str(&processed).map_err(|e| PreshowError::ConfigValidationError {
            field: "yaml_parsing".to_string(),
            message: format!("YAML parsing error: {}", e),
        })
    }

    pub fn coordinates(&self) -> Result<(f64, f64)> {
        let lat = validation::validate_required_field(
            "theatre.location.latitude",
            &self.theatre.location.latitude,
        )?;
        let lng = validation::validate_required_field(
            "theatre.location.longitude",
            &self.theatre.location.longitude,
        )?;
        Ok((*lat, *lng))
    }

    pub fn units(&self) -> Units {
        self.settings.units
    }
}

impl Validate for TheatreConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("theatre.name", &self.theatre.name)?;

        let (lat, lng) = self.coordinates()?;
        validation::validate_range("theatre.location.latitude", lat, -90.0, 90.0)?;
        validation::validate_range("theatre.location.longitude", lng, -180.0, 180.0)?;

        validation::validate_positive_number(
            "theatre.radius_meters",
            u64::from(self.theatre.radius_meters),
            1,
        )?;
        validation::validate_positive_number(
            "theatre.whitelist_radius_meters",
            u64::from(self.theatre.whitelist_radius_meters),
            1,
        )?;

        validation::validate_hex_color("branding.primary_color", &self.branding.primary_color)?;
        validation::validate_hex_color("branding.secondary_color", &self.branding.secondary_color)?;
        validation::validate_hex_color("branding.headline_color", &self.branding.headline_color)?;

        if self.branding.logo_url.starts_with("http") {
            validation::validate_url("branding.logo_url", &self.branding.logo_url)?;
        }
        if !self.concessions.sponsor.url.is_empty() {
            validation::validate_url("concessions.sponsor.url", &self.concessions.sponsor.url)?;
        }

        let categories = self
            .business_categories
            .pre_show
            .iter()
            .map(|c| ("business_categories.pre_show", c))
            .chain(
                self.business_categories
                    .post_show
                    .iter()
                    .map(|c| ("business_categories.post_show", c)),
            );
        for (field, category) in categories {
            validation::validate_non_empty_string(field, &category.name)?;
            validation::validate_non_empty_string(field, &category.keyword)?;
        }

        Ok(())
    }
}

/// 替換環境變數 (例如 ${GOOGLE_PLACES_API_KEY})；未設定的保持原樣
pub fn substitute_env_vars(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}
