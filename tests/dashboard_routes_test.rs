#![cfg(feature = "dashboard")]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDateTime;
use preshow_mailer::config::settings::{DashboardSettings, ImageSettings};
use preshow_mailer::config::theatre::Units;
use preshow_mailer::core::{CampaignService, PlacesProvider, WeatherProvider};
use preshow_mailer::domain::ports::PlacesQuery;
use preshow_mailer::dashboard::{build_router, AppState, Defaults};
use preshow_mailer::domain::model::{
    CampaignDraft, CampaignStatus, CampaignSummary, CategoryPlaces, DateRange, Place,
    WeatherReport,
};
use preshow_mailer::render::LogoEmbedder;
use preshow_mailer::{EmailGenerator, Result, ShowInfo, TheatreConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct FakeWeather;

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn get_forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
        _units: Units,
    ) -> WeatherReport {
        WeatherReport::fallback()
    }
}

struct FakePlaces;

#[async_trait]
impl PlacesProvider for FakePlaces {
    async fn get_nearby_places(&self, query: &PlacesQuery<'_>) -> Vec<CategoryPlaces> {
        query
            .categories
            .iter()
            .map(|c| CategoryPlaces {
                name: c.name.clone(),
                places: vec![Place::mock()],
            })
            .collect()
    }
}

#[derive(Default)]
struct FakeCampaigns {
    calls: Mutex<Vec<String>>,
    uploaded_html: Mutex<Option<String>>,
    last_range: Mutex<Option<DateRange>>,
}

#[async_trait]
impl CampaignService for FakeCampaigns {
    async fn create_draft_campaign(
        &self,
        html: &str,
        subject_line: &str,
        _from_name: &str,
        _reply_to: &str,
    ) -> Result<CampaignDraft> {
        self.calls.lock().unwrap().push(format!("create:{}", subject_line));
        *self.uploaded_html.lock().unwrap() = Some(html.to_string());
        Ok(CampaignDraft {
            id: "c1".to_string(),
            web_id: Some(11),
            link: "https://us1.admin.mailchimp.com/campaigns/edit?id=11".to_string(),
        })
    }

    async fn send_campaign_now(&self, campaign_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("send:{}", campaign_id));
        Ok(())
    }

    async fn schedule_campaign(&self, campaign_id: &str, _schedule_time_utc: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("schedule:{}", campaign_id));
        Ok(())
    }

    async fn unschedule_campaign(&self, campaign_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("unschedule:{}", campaign_id));
        Ok(())
    }

    async fn get_campaigns(
        &self,
        status: CampaignStatus,
        range: &DateRange,
    ) -> Result<Vec<CampaignSummary>> {
        *self.last_range.lock().unwrap() = Some(range.clone());
        Ok(vec![CampaignSummary {
            id: format!("{}-1", status.as_str()),
            web_id: None,
            web_link: None,
            subject: Some("Upcoming Performance: Hamlet".to_string()),
            status: Some(status.as_str().to_string()),
            send_time: Some("2025-11-20T14:00:00+00:00".to_string()),
            emails_sent: None,
        }])
    }

    async fn get_campaign_content(&self, campaign_id: &str) -> Result<Option<String>> {
        Ok((campaign_id == "c1").then(|| "<p>stored</p>".to_string()))
    }
}

fn defaults() -> Defaults {
    let config = TheatreConfig::from_yaml_str(
        r#"
theatre:
  name: "Riverside Playhouse"
  location: { latitude: 43.6591, longitude: -70.2568 }
business_categories:
  pre_show:
    - { name: "Dinner", keyword: "restaurant" }
  post_show:
    - { name: "Drinks", keyword: "bar" }
"#,
    )
    .unwrap();
    Defaults {
        config,
        show: ShowInfo::default(),
    }
}

fn state(campaigns: Option<Arc<FakeCampaigns>>) -> AppState {
    let weather: Box<dyn WeatherProvider> = Box::new(FakeWeather);
    let places: Box<dyn PlacesProvider> = Box::new(FakePlaces);
    let logo = LogoEmbedder::new(reqwest::Client::new(), &ImageSettings::default());
    let generator = EmailGenerator::new(weather, places, logo).unwrap();
    let campaigns = campaigns.map(|c| c as Arc<dyn CampaignService>);
    AppState::new(generator, campaigns, defaults(), DashboardSettings::default())
}

fn app(campaigns: Option<Arc<FakeCampaigns>>) -> Router {
    build_router(state(campaigns))
}

fn form() -> Value {
    json!({
        "show_title": "Hamlet",
        "start_time": "2025-11-20T19:30",
        "end_time": "2025-11-20T22:00",
        "theatre_name": "Riverside Playhouse",
        "latitude": "43.6591",
        "longitude": "-70.2568",
        "contact_email": "box@riverside.test"
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_index_serves_editor_page() {
    let response = app(None).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Pre-Show Email Builder"));
    assert!(page.contains("id=\"viewport-toggle\""));
    assert!(page.contains("#preview.mobile { width: 420px;"));
}

#[tokio::test]
async fn test_health_reports_mailchimp_readiness() {
    let response = app(None).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mailchimp_ready"], false);

    let response = app(Some(Arc::default())).oneshot(get("/health")).await.unwrap();
    assert_eq!(body_json(response).await["mailchimp_ready"], true);
}

#[tokio::test]
async fn test_defaults() {
    let response = app(None).oneshot(get("/api/defaults")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["config"]["theatre"]["name"], "Riverside Playhouse");
    assert_eq!(body["mailchimp_ready"], false);
}

#[tokio::test]
async fn test_parse_config_upload() {
    let yaml = "theatre:\n  name: Uploaded Hall\n";
    let request = Request::builder()
        .method("POST")
        .uri("/api/parse/config")
        .body(Body::from(yaml))
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["theatre"]["name"], "Uploaded Hall");

    let request = Request::builder()
        .method("POST")
        .uri("/api/parse/config")
        .body(Body::from("theatre: [unclosed"))
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parse_show_upload_pads_times() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/parse/show")
        .body(Body::from(r#"{"show_title": "Hamlet", "start_time": "2025-11-20T19:30"}"#))
        .unwrap();
    let response = app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["start_time"], "2025-11-20T19:30:00");
}

#[tokio::test]
async fn test_preview_renders_with_theme_override() {
    let mut request = form();
    request["theme"] = json!("dark");

    let response = app(None)
        .oneshot(post_json("/api/preview", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let html = body["html"].as_str().unwrap();
    let preview = body["preview_html"].as_str().unwrap();
    assert!(html.contains("Hamlet"));
    assert!(html.contains("Mock Place"));
    assert!(!html.contains("preview-theme-override"));
    assert!(preview.contains("preview-theme-override"));
}

#[tokio::test]
async fn test_preview_without_coordinates_is_bad_request() {
    let mut request = form();
    request["latitude"] = json!("");

    let response = app(None)
        .oneshot(post_json("/api/preview", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_preview_rejects_non_numeric_radius() {
    let mut request = form();
    request["radius"] = json!("far");

    let response = app(None)
        .oneshot(post_json("/api/preview", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_preview_rejects_show_ending_before_start() {
    let mut request = form();
    request["end_time"] = json!("2025-11-20T18:00");

    let response = app(None)
        .oneshot(post_json("/api/preview", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_send_rejects_out_of_range_latitude_before_creating() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let mut request = form();
    request["latitude"] = json!("200");
    request["html"] = json!("<p>cached</p>");

    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/send", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(campaigns.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_requires_contact_email() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let mut request = form();
    request["contact_email"] = json!("");

    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/send", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(campaigns.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_reuses_cached_html() {
    let mut request = form();
    request["html"] = json!("<p>cached</p>");

    let response = app(None)
        .oneshot(post_json("/api/export", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"email.html\""
    );
    assert_eq!(body_string(response).await, "<p>cached</p>");
}

#[tokio::test]
async fn test_send_requires_credentials() {
    let response = app(None)
        .oneshot(post_json("/api/send", form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_send_uses_cached_html() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let mut request = form();
    request["html"] = json!("<p>cached</p>");

    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/send", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "c1");
    assert_eq!(body["status"], "sent");
    assert_eq!(
        *campaigns.calls.lock().unwrap(),
        vec!["create:Upcoming Performance: Hamlet", "send:c1"]
    );
    assert_eq!(
        campaigns.uploaded_html.lock().unwrap().as_deref(),
        Some("<p>cached</p>")
    );
}

#[tokio::test]
async fn test_send_renders_when_no_cached_html() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/send", form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = campaigns.uploaded_html.lock().unwrap().clone().unwrap();
    assert!(html.contains("*|UNSUB|*"));
}

#[tokio::test]
async fn test_schedule_requires_time() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/schedule", form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(campaigns.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_creates_and_schedules() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let mut request = form();
    request["schedule_time"] = json!("2025-11-20T09:00");

    let response = app(Some(campaigns.clone()))
        .oneshot(post_json("/api/schedule", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "scheduled");
    assert!(body["schedule_time"].as_str().unwrap().ends_with("+00:00"));
    assert_eq!(
        *campaigns.calls.lock().unwrap(),
        vec!["create:Upcoming Performance: Hamlet", "schedule:c1"]
    );
}

#[tokio::test]
async fn test_campaign_history_routes() {
    let campaigns = Arc::new(FakeCampaigns::default());
    let router = app(Some(campaigns.clone()));

    let response = router
        .clone()
        .oneshot(get("/api/campaigns/scheduled"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["id"], "schedule-1");

    let response = router
        .clone()
        .oneshot(get("/api/campaigns/sent?since=2025-11-01&until=2025-11-30"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["status"], "sent");
    let range = campaigns.last_range.lock().unwrap().clone().unwrap();
    assert_eq!(range.since.as_deref(), Some("2025-11-01"));
    assert_eq!(range.until.as_deref(), Some("2025-11-30"));

    let response = router
        .clone()
        .oneshot(post_json("/api/campaigns/c9/unschedule", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(campaigns.calls.lock().unwrap().contains(&"unschedule:c9".to_string()));

    let response = router
        .clone()
        .oneshot(get("/api/campaigns/c1/content"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["html"], "<p>stored</p>");

    let response = router
        .oneshot(get("/api/campaigns/missing/content"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_heartbeat_records_beat() {
    let state = state(None);
    let heartbeat = state.heartbeat.clone();
    assert!(heartbeat.last().await.is_none());

    let response = build_router(state)
        .oneshot(post_json("/api/heartbeat", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(heartbeat.last().await.is_some());
}

#[tokio::test]
async fn test_heartbeat_close_is_recorded() {
    let state = state(None);
    let heartbeat = state.heartbeat.clone();
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(post_json("/api/heartbeat", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method("POST")
        .uri("/api/heartbeat/close")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(heartbeat.pulse().await.closed_at.is_some());
}
