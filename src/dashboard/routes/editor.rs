//! Editor routes: defaults, file parsing, preview and export.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::show::ShowInfo;
use crate::config::theatre::TheatreConfig;
use crate::dashboard::error::{ApiError, ApiResult};
use crate::dashboard::form::{EmailForm, PreviewRequest, PublishRequest};
use crate::dashboard::state::AppState;
use crate::render::apply_preview_overrides;
use crate::utils::validation::Validate;

const DASHBOARD_PAGE: &str = include_str!("../static/dashboard.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

/// GET /api/defaults
pub async fn defaults(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "config": state.defaults.config,
        "show": state.defaults.show,
        "mailchimp_ready": state.mailchimp_ready(),
    }))
}

/// POST /api/parse/config
///
/// Body is the raw YAML of an uploaded theatre config.
pub async fn parse_config(body: String) -> ApiResult<Json<TheatreConfig>> {
    TheatreConfig::from_yaml_str(&body)
        .map(Json)
        .map_err(|e| ApiError::Validation(format!("Could not read theatre config: {}", e)))
}

/// POST /api/parse/show
///
/// Body is the raw JSON of an uploaded show file.
pub async fn parse_show(body: String) -> ApiResult<Json<ShowInfo>> {
    ShowInfo::from_json_str(&body)
        .map(Json)
        .map_err(|e| ApiError::Validation(format!("Could not read show file: {}", e)))
}

/// Merged values go through the same checks as the CLI inputs.
pub(crate) fn merge_form(state: &AppState, form: &EmailForm) -> ApiResult<(TheatreConfig, ShowInfo)> {
    let config = form
        .theatre_config(&state.defaults.config)
        .map_err(ApiError::Validation)?;
    let show = form.show_info();
    config.validate()?;
    show.validate()?;
    Ok((config, show))
}

/// Merges the form and renders the Mailchimp variant.
pub(crate) async fn render_form(
    state: &AppState,
    form: &EmailForm,
) -> ApiResult<(TheatreConfig, ShowInfo, String)> {
    let (config, show) = merge_form(state, form)?;
    let email = state.generator.generate_email(&config, &show, true).await?;
    Ok((config, show, email.html))
}

/// POST /api/preview
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> ApiResult<Json<Value>> {
    let (_, show, html) = render_form(&state, &request.form).await?;
    tracing::info!("Preview generated for '{}'", show.show_title);

    let preview_html = apply_preview_overrides(&html, request.theme);
    Ok(Json(json!({
        "html": html,
        "preview_html": preview_html,
    })))
}

/// POST /api/export
///
/// Downloads the last previewed HTML, rendering it first when absent.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Response> {
    let html = match request.html.filter(|h| !h.is_empty()) {
        Some(html) => html,
        None => render_form(&state, &request.form).await?.2,
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"email.html\"",
            ),
        ],
        html,
    )
        .into_response())
}
