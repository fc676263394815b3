use crate::utils::error::{PreshowError, Result};

pub const GOOGLE_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const MAILCHIMP_API_KEY: &str = "MAILCHIMP_API_KEY";
pub const MAILCHIMP_SERVER_PREFIX: &str = "MAILCHIMP_SERVER_PREFIX";
pub const MAILCHIMP_LIST_ID: &str = "MAILCHIMP_LIST_ID";

/// API keys read once from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub google_places_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub mailchimp_api_key: Option<String>,
    pub mailchimp_server_prefix: Option<String>,
    pub mailchimp_list_id: Option<String>,
}

/// Everything needed to talk to one Mailchimp audience.
#[derive(Clone)]
pub struct MailchimpCredentials {
    pub api_key: String,
    pub server_prefix: String,
    pub list_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "missing" };
        f.debug_struct("Credentials")
            .field("google_places_api_key", &mask(&self.google_places_api_key))
            .field("weather_api_key", &mask(&self.weather_api_key))
            .field("mailchimp_api_key", &mask(&self.mailchimp_api_key))
            .field("mailchimp_server_prefix", &self.mailchimp_server_prefix)
            .field("mailchimp_list_id", &self.mailchimp_list_id)
            .finish()
    }
}

impl std::fmt::Debug for MailchimpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailchimpCredentials")
            .field("api_key", &"***")
            .field("server_prefix", &self.server_prefix)
            .field("list_id", &self.list_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            google_places_api_key: get(GOOGLE_PLACES_API_KEY),
            weather_api_key: get(WEATHER_API_KEY),
            mailchimp_api_key: get(MAILCHIMP_API_KEY),
            mailchimp_server_prefix: get(MAILCHIMP_SERVER_PREFIX),
            mailchimp_list_id: get(MAILCHIMP_LIST_ID),
        }
    }

    /// Send and schedule need the key, the server prefix and the audience ID.
    pub fn mailchimp_ready(&self) -> bool {
        self.mailchimp_api_key.is_some()
            && self.mailchimp_server_prefix.is_some()
            && self.mailchimp_list_id.is_some()
    }

    pub fn mailchimp(&self) -> Result<MailchimpCredentials> {
        match (&self.mailchimp_api_key, &self.mailchimp_server_prefix) {
            (Some(api_key), Some(server_prefix)) => Ok(MailchimpCredentials {
                api_key: api_key.clone(),
                server_prefix: server_prefix.clone(),
                list_id: self.mailchimp_list_id.clone(),
            }),
            _ => Err(PreshowError::MissingCredentials {
                message: "Missing Mailchimp credentials (MAILCHIMP_API_KEY/MAILCHIMP_SERVER_PREFIX)"
                    .to_string(),
            }),
        }
    }

    pub fn warn_missing(&self) {
        if self.google_places_api_key.is_none() {
            tracing::warn!("⚠️ {} not set; dining section will use placeholder places", GOOGLE_PLACES_API_KEY);
        }
        if self.weather_api_key.is_none() {
            tracing::warn!("⚠️ {} not set; weather section will show placeholders", WEATHER_API_KEY);
        }
        if !self.mailchimp_ready() {
            tracing::info!("Mailchimp keys incomplete; send and schedule are disabled");
        }
    }
}
