pub mod config;
pub mod core;
#[cfg(feature = "dashboard")]
pub mod dashboard;
pub mod domain;
pub mod render;
pub mod services;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;
pub use config::{credentials::Credentials, settings::Settings, show::ShowInfo, theatre::TheatreConfig};

pub use core::{EmailGenerator, MailerEngine, UploadOutcome};
pub use services::{GooglePlacesClient, MailchimpClient, WeatherApiClient};
pub use utils::error::{PreshowError, Result};
