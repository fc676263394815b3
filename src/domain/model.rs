use crate::config::show::ShowInfo;
use crate::config::theatre::TheatreConfig;
use serde::{Deserialize, Serialize};

/// Weather at one moment around the show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp: String,
    pub condition: String,
    pub icon: String,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub arrival: WeatherSnapshot,
    pub departure: WeatherSnapshot,
}

impl WeatherReport {
    /// Placeholder shown when no forecast is available.
    pub fn fallback() -> Self {
        let unknown = |is_day| WeatherSnapshot {
            temp: "--".to_string(),
            condition: String::new(),
            icon: "❓".to_string(),
            is_day,
        };
        Self {
            arrival: unknown(true),
            departure: unknown(false),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.arrival.temp == "--" && self.departure.temp == "--"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_m: f64,
    pub is_promoted: bool,
    pub map_url: String,
}

impl Place {
    pub fn mock() -> Self {
        Self {
            place_id: String::new(),
            name: "Mock Place".to_string(),
            rating: Some(5.0),
            address: "123 Mock St".to_string(),
            lat: 0.0,
            lng: 0.0,
            distance_m: 100.0,
            is_promoted: false,
            map_url: String::new(),
        }
    }
}

/// Places for one business category, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPlaces {
    pub name: String,
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacesByPhase {
    pub pre_show: Vec<CategoryPlaces>,
    pub post_show: Vec<CategoryPlaces>,
}

/// Everything fetched for one email; rendering never refetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailContext {
    pub config: TheatreConfig,
    pub show_info: ShowInfo,
    pub weather: WeatherReport,
    pub places: PlacesByPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub include_mailchimp_footer: bool,
    pub embed_logo: bool,
    pub strip_dark_mode: bool,
    pub fragment_mode: bool,
}

impl RenderOptions {
    /// Footer on, logo linked, dark mode kept.
    pub fn mailchimp() -> Self {
        Self {
            include_mailchimp_footer: true,
            ..Self::default()
        }
    }

    /// Footer off, logo embedded, dark mode stripped.
    pub fn standalone() -> Self {
        Self {
            include_mailchimp_footer: false,
            embed_logo: true,
            strip_dark_mode: true,
            fragment_mode: false,
        }
    }

    pub fn with_fragment(mut self, fragment_mode: bool) -> Self {
        self.fragment_mode = fragment_mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub id: String,
    pub web_id: Option<u64>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: String,
    pub web_id: Option<u64>,
    pub web_link: Option<String>,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub send_time: Option<String>,
    pub emails_sent: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Scheduled,
    Sent,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Sent => "sent",
        }
    }
}

/// Optional `YYYY-MM-DD` bounds for the sent archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: Option<String>,
    pub until: Option<String>,
}
