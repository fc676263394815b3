use crate::config::theatre::{BusinessCategory, PlaceLists, Units};
use crate::domain::model::{
    CampaignDraft, CampaignStatus, CampaignSummary, CategoryPlaces, DateRange, WeatherReport,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

pub trait Storage: Send + Sync {
    /// Returns the full path that was written.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Search parameters shared by every category of one phase (pre-show or post-show).
#[derive(Debug, Clone)]
pub struct PlacesQuery<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub whitelist_radius_meters: u32,
    pub categories: &'a [BusinessCategory],
    /// A place must be open at every one of these times.
    pub check_times: Vec<NaiveDateTime>,
    pub lists: &'a PlaceLists,
}

/// Forecast lookups never fail; providers degrade to [`WeatherReport::fallback`].
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        units: Units,
    ) -> WeatherReport;
}

#[async_trait]
impl<T: WeatherProvider + ?Sized> WeatherProvider for Box<T> {
    async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        units: Units,
    ) -> WeatherReport {
        (**self)
            .get_forecast(latitude, longitude, start, end, units)
            .await
    }
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn get_nearby_places(&self, query: &PlacesQuery<'_>) -> Vec<CategoryPlaces>;
}

#[async_trait]
impl<T: PlacesProvider + ?Sized> PlacesProvider for Box<T> {
    async fn get_nearby_places(&self, query: &PlacesQuery<'_>) -> Vec<CategoryPlaces> {
        (**self).get_nearby_places(query).await
    }
}

#[async_trait]
pub trait CampaignService: Send + Sync {
    async fn create_draft_campaign(
        &self,
        html: &str,
        subject_line: &str,
        from_name: &str,
        reply_to: &str,
    ) -> Result<CampaignDraft>;

    async fn send_campaign_now(&self, campaign_id: &str) -> Result<()>;

    /// `schedule_time_utc` is RFC 3339 with a `+00:00` offset.
    async fn schedule_campaign(&self, campaign_id: &str, schedule_time_utc: &str) -> Result<()>;

    async fn unschedule_campaign(&self, campaign_id: &str) -> Result<()>;

    async fn get_campaigns(
        &self,
        status: CampaignStatus,
        range: &DateRange,
    ) -> Result<Vec<CampaignSummary>>;

    /// Stored HTML, else plain text, else `None`.
    async fn get_campaign_content(&self, campaign_id: &str) -> Result<Option<String>>;
}
