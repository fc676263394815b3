//! Mailchimp routes: send, schedule and campaign history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Mode;
use crate::core::{check_publishable, publish_campaign};
use crate::dashboard::error::{ApiError, ApiResult};
use crate::dashboard::form::{PublishRequest, SentQuery};
use crate::dashboard::routes::editor::merge_form;
use crate::dashboard::state::AppState;
use crate::domain::model::{CampaignStatus, CampaignSummary, DateRange};
use crate::domain::ports::CampaignService;
use crate::utils::time::to_utc_iso;

fn require_campaigns(state: &AppState) -> ApiResult<Arc<dyn CampaignService>> {
    state.campaigns.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("Mailchimp credentials missing".to_string())
    })
}

async fn publish(
    state: &AppState,
    request: PublishRequest,
    mode: Mode,
    schedule_time_utc: Option<&str>,
) -> ApiResult<Value> {
    let campaigns = require_campaigns(state)?;

    let (config, show) = merge_form(state, &request.form)?;
    check_publishable(&config, mode, schedule_time_utc)?;

    let html = match request.html.filter(|h| !h.is_empty()) {
        Some(html) => html,
        None => state.generator.generate_email(&config, &show, true).await?.html,
    };

    let outcome = publish_campaign(
        campaigns.as_ref(),
        &html,
        &config,
        &show,
        mode,
        schedule_time_utc,
    )
    .await?;
    let draft = outcome.draft();

    Ok(json!({
        "id": draft.id,
        "link": draft.link,
    }))
}

/// POST /api/send
pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<Value>> {
    let mut body = publish(&state, request, Mode::Send, None).await?;
    body["status"] = json!("sent");
    Ok(Json(body))
}

/// POST /api/schedule
///
/// `schedule_time` is the browser's local time; Mailchimp receives UTC.
pub async fn schedule(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<Value>> {
    require_campaigns(&state)?;

    let local = request
        .schedule_time
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Pick a date and time to schedule".to_string()))?;
    let schedule_time_utc = to_utc_iso(&local)?;

    let mut body = publish(&state, request, Mode::Schedule, Some(&schedule_time_utc)).await?;
    body["status"] = json!("scheduled");
    body["schedule_time"] = json!(schedule_time_utc);
    Ok(Json(body))
}

/// GET /api/campaigns/scheduled
pub async fn list_scheduled(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CampaignSummary>>> {
    let campaigns = require_campaigns(&state)?;
    let list = campaigns
        .get_campaigns(CampaignStatus::Scheduled, &DateRange::default())
        .await?;
    Ok(Json(list))
}

/// POST /api/campaigns/:id/unschedule
pub async fn unschedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let campaigns = require_campaigns(&state)?;
    campaigns.unschedule_campaign(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/campaigns/sent?since=YYYY-MM-DD&until=YYYY-MM-DD
pub async fn list_sent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SentQuery>,
) -> ApiResult<Json<Vec<CampaignSummary>>> {
    let campaigns = require_campaigns(&state)?;
    let range = DateRange {
        since: query.since,
        until: query.until,
    };
    let list = campaigns.get_campaigns(CampaignStatus::Sent, &range).await?;
    Ok(Json(list))
}

/// GET /api/campaigns/:id/content
pub async fn content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let campaigns = require_campaigns(&state)?;
    match campaigns.get_campaign_content(&id).await? {
        Some(html) => Ok(Json(json!({ "id": id, "html": html }))),
        None => Err(ApiError::NotFound(format!("No content stored for campaign {}", id))),
    }
}
