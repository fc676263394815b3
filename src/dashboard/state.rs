//! Shared state for dashboard handlers.

use crate::config::credentials::Credentials;
use crate::config::settings::{DashboardSettings, Settings};
use crate::config::show::ShowInfo;
use crate::config::theatre::TheatreConfig;
use crate::core::EmailGenerator;
use crate::domain::ports::{CampaignService, PlacesProvider, WeatherProvider};
use crate::render::LogoEmbedder;
use crate::services::{self, GooglePlacesClient, MailchimpClient, WeatherApiClient};
use crate::utils::error::Result;
use crate::utils::runtime_paths::RuntimePaths;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

pub type DynGenerator = EmailGenerator<Box<dyn WeatherProvider>, Box<dyn PlacesProvider>>;

/// Config and show the editor starts from.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub config: TheatreConfig,
    pub show: ShowInfo,
}

impl Defaults {
    /// Missing or broken default files fall back to empty forms.
    pub fn load(paths: &RuntimePaths) -> Self {
        let (config_path, show_path) = paths.default_config_paths();

        let config = TheatreConfig::from_file(&config_path).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Could not load {}: {}", config_path.display(), e);
            TheatreConfig::default()
        });
        let show = ShowInfo::from_file(&show_path).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Could not load {}: {}", show_path.display(), e);
            ShowInfo::default()
        });

        Self { config, show }
    }
}

/// Latest page heartbeat and, if the page reported closing, when.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulse {
    pub last_beat: Option<Instant>,
    pub closed_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct Heartbeat {
    pulse: Mutex<Pulse>,
}

impl Heartbeat {
    /// A beat also cancels an earlier close (page reloads send both).
    pub async fn beat(&self) {
        let mut pulse = self.pulse.lock().await;
        pulse.last_beat = Some(Instant::now());
        pulse.closed_at = None;
    }

    pub async fn close(&self) {
        self.pulse.lock().await.closed_at = Some(Instant::now());
    }

    pub async fn last(&self) -> Option<Instant> {
        self.pulse.lock().await.last_beat
    }

    pub async fn pulse(&self) -> Pulse {
        *self.pulse.lock().await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<DynGenerator>,
    /// `None` until all three Mailchimp values are configured.
    pub campaigns: Option<Arc<dyn CampaignService>>,
    pub defaults: Arc<Defaults>,
    pub heartbeat: Arc<Heartbeat>,
    pub config: Arc<DashboardSettings>,
}

impl AppState {
    pub fn new(
        generator: DynGenerator,
        campaigns: Option<Arc<dyn CampaignService>>,
        defaults: Defaults,
        config: DashboardSettings,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            campaigns,
            defaults: Arc::new(defaults),
            heartbeat: Arc::new(Heartbeat::default()),
            config: Arc::new(config),
        }
    }

    /// Live state backed by the real weather, places and Mailchimp services.
    pub fn from_settings(settings: &Settings, credentials: &Credentials, defaults: Defaults) -> Result<Self> {
        let client = services::build_http_client(settings)?;

        let weather: Box<dyn WeatherProvider> = Box::new(WeatherApiClient::new(
            client.clone(),
            &settings.weather,
            credentials.weather_api_key.clone(),
        ));
        let places: Box<dyn PlacesProvider> = Box::new(GooglePlacesClient::new(
            client.clone(),
            &settings.places,
            credentials.google_places_api_key.clone(),
        ));
        let generator = EmailGenerator::new(
            weather,
            places,
            LogoEmbedder::new(client.clone(), &settings.images),
        )?;

        let campaigns: Option<Arc<dyn CampaignService>> = if credentials.mailchimp_ready() {
            Some(Arc::new(MailchimpClient::new(
                client,
                credentials.mailchimp()?,
                &settings.mailchimp,
            )))
        } else {
            None
        };

        Ok(Self::new(generator, campaigns, defaults, settings.dashboard.clone()))
    }

    pub fn mailchimp_ready(&self) -> bool {
        self.campaigns.is_some()
    }
}
