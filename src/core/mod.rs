pub mod engine;
pub mod generator;

pub use crate::domain::ports::{CampaignService, PlacesProvider, Storage, WeatherProvider};
pub use crate::utils::error::Result;
pub use engine::{campaign_subject, check_publishable, publish_campaign, MailerEngine, UploadOutcome};
pub use generator::EmailGenerator;
