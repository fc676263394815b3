pub mod mailchimp;
pub mod places;
pub mod weather;

pub use mailchimp::MailchimpClient;
pub use places::GooglePlacesClient;
pub use weather::WeatherApiClient;

use crate::config::settings::Settings;
use crate::utils::error::Result;
use reqwest::Client;

/// One client shared by every outbound service.
pub fn build_http_client(settings: &Settings) -> Result<Client> {
    let client = Client::builder()
        .timeout(settings.request_timeout())
        .user_agent(settings.http.user_agent.as_str())
        .build()?;
    Ok(client)
}
