use crate::config::credentials::Credentials;
use crate::config::settings::Settings;
use crate::config::show::ShowInfo;
use crate::config::theatre::TheatreConfig;
use crate::domain::model::{EmailContext, PlacesByPhase, RenderOptions, RenderedEmail};
use crate::domain::ports::{PlacesProvider, PlacesQuery, WeatherProvider};
use crate::render::{LogoEmbedder, TemplateRenderer};
use crate::services::{self, GooglePlacesClient, WeatherApiClient};
use crate::utils::error::Result;
use chrono::{Duration, NaiveDateTime};

/// Place must be open 60 and 15 minutes before curtain.
pub fn pre_show_check_times(start: NaiveDateTime) -> Vec<NaiveDateTime> {
    vec![start - Duration::minutes(60), start - Duration::minutes(15)]
}

/// Place must be open 5 and 40 minutes after the final bow.
pub fn post_show_check_times(end: NaiveDateTime) -> Vec<NaiveDateTime> {
    vec![end + Duration::minutes(5), end + Duration::minutes(40)]
}

/// Combines weather, nearby places and the templates into a pre-show email.
pub struct EmailGenerator<W: WeatherProvider, P: PlacesProvider> {
    weather: W,
    places: P,
    renderer: TemplateRenderer,
    logo: LogoEmbedder,
}

impl EmailGenerator<WeatherApiClient, GooglePlacesClient> {
    /// Live generator backed by weatherapi.com and Google Places.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let client = services::build_http_client(settings)?;
        let weather = WeatherApiClient::new(
            client.clone(),
            &settings.weather,
            credentials.weather_api_key.clone(),
        );
        let places = GooglePlacesClient::new(
            client.clone(),
            &settings.places,
            credentials.google_places_api_key.clone(),
        );
        let logo = LogoEmbedder::new(client, &settings.images);
        Self::new(weather, places, logo)
    }
}

impl<W: WeatherProvider, P: PlacesProvider> EmailGenerator<W, P> {
    pub fn new(weather: W, places: P, logo: LogoEmbedder) -> Result<Self> {
        Ok(Self {
            weather,
            places,
            renderer: TemplateRenderer::new()?,
            logo,
        })
    }

    /// Fetches weather and both place groups concurrently.
    pub async fn build_context(&self, config: &TheatreConfig, show: &ShowInfo) -> Result<EmailContext> {
        let (latitude, longitude) = config.coordinates()?;
        let start = show.start()?;
        let end = show.end()?;

        let pre_query = PlacesQuery {
            latitude,
            longitude,
            radius_meters: config.theatre.radius_meters,
            whitelist_radius_meters: config.theatre.whitelist_radius_meters,
            categories: &config.business_categories.pre_show,
            check_times: pre_show_check_times(start),
            lists: &config.lists,
        };
        let post_query = PlacesQuery {
            categories: &config.business_categories.post_show,
            check_times: post_show_check_times(end),
            ..pre_query.clone()
        };

        tracing::info!("🌤️ Fetching weather and nearby places for '{}'", show.show_title);
        let (weather, pre_show, post_show) = tokio::join!(
            self.weather
                .get_forecast(latitude, longitude, start, end, config.units()),
            self.places.get_nearby_places(&pre_query),
            self.places.get_nearby_places(&post_query),
        );

        if weather.is_fallback() {
            tracing::warn!("⚠️ Weather unavailable; rendering placeholders");
        }
        tracing::debug!(
            "Places found: {} pre-show, {} post-show",
            pre_show.iter().map(|c| c.places.len()).sum::<usize>(),
            post_show.iter().map(|c| c.places.len()).sum::<usize>()
        );

        Ok(EmailContext {
            config: config.clone(),
            show_info: show.clone(),
            weather,
            places: PlacesByPhase { pre_show, post_show },
        })
    }

    /// Renders a prebuilt context without refetching data.
    pub async fn render_email_from_context(
        &self,
        context: &EmailContext,
        options: RenderOptions,
    ) -> Result<RenderedEmail> {
        let logo_src = self
            .logo
            .logo_src(
                &context.config.branding.logo_url,
                options.embed_logo,
                options.fragment_mode,
            )
            .await;
        self.renderer.render(context, &logo_src, options)
    }

    /// Without the Mailchimp footer the logo is embedded and dark mode stripped.
    pub async fn generate_email(
        &self,
        config: &TheatreConfig,
        show: &ShowInfo,
        include_mailchimp_footer: bool,
    ) -> Result<RenderedEmail> {
        let context = self.build_context(config, show).await?;
        let options = if include_mailchimp_footer {
            RenderOptions::mailchimp()
        } else {
            RenderOptions::standalone()
        };
        self.render_email_from_context(&context, options).await
    }
}
