use crate::config::credentials::MailchimpCredentials;
use crate::config::settings::MailchimpSettings;
use crate::domain::model::{CampaignDraft, CampaignStatus, CampaignSummary, DateRange};
use crate::domain::ports::CampaignService;
use crate::utils::error::{PreshowError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

/// Mailchimp Marketing API v3 client.
pub struct MailchimpClient {
    client: Client,
    api_base: String,
    server_prefix: String,
    api_key: String,
    list_id: Option<String>,
}

/// Problem-details body Mailchimp returns on failure.
#[derive(Debug, Deserialize)]
struct ProblemDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize)]
struct CreatedCampaign {
    id: String,
    web_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CampaignList {
    #[serde(default)]
    campaigns: Vec<CampaignRecord>,
}

#[derive(Debug, Deserialize)]
struct CampaignRecord {
    id: String,
    web_id: Option<u64>,
    status: Option<String>,
    send_time: Option<String>,
    schedule_time: Option<String>,
    emails_sent: Option<u64>,
    settings: Option<CampaignSettings>,
}

#[derive(Debug, Deserialize)]
struct CampaignSettings {
    subject_line: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CampaignContent {
    html: Option<String>,
    plain_text: Option<String>,
}

impl MailchimpClient {
    pub fn new(client: Client, credentials: MailchimpCredentials, settings: &MailchimpSettings) -> Self {
        let api_base = settings
            .api_base
            .clone()
            .unwrap_or_else(|| format!("https://{}.api.mailchimp.com/3.0", credentials.server_prefix));

        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            server_prefix: credentials.server_prefix,
            api_key: credentials.api_key,
            list_id: credentials.list_id,
        }
    }

    /// Admin UI link for a campaign's web id.
    pub fn admin_link(&self, web_id: u64) -> String {
        format!(
            "https://{}.admin.mailchimp.com/campaigns/edit?id={}",
            self.server_prefix, web_id
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .basic_auth("anystring", Some(&self.api_key))
    }

    /// Success responses pass through; everything else becomes `MailchimpError`.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let problem = serde_json::from_str::<ProblemDetail>(&body).ok();
        let (title, detail) = match problem {
            Some(p) if !p.title.is_empty() => (p.title, p.detail),
            _ => (
                status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            ),
        };

        tracing::debug!("Mailchimp returned {}: {}", status, title);
        Err(PreshowError::MailchimpError {
            status: status.as_u16(),
            title,
            detail,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let response = self.request(Method::GET, "/ping").send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn campaign_action(&self, campaign_id: &str, action: &str, body: Option<serde_json::Value>) -> Result<()> {
        let path = format!("/campaigns/{}/actions/{}", campaign_id, action);
        let mut request = self.request(Method::POST, &path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl CampaignService for MailchimpClient {
    async fn create_draft_campaign(
        &self,
        html: &str,
        subject_line: &str,
        from_name: &str,
        reply_to: &str,
    ) -> Result<CampaignDraft> {
        let list_id = self
            .list_id
            .as_deref()
            .ok_or_else(|| PreshowError::MissingCredentials {
                message: "Missing MAILCHIMP_LIST_ID".to_string(),
            })?;

        self.ping().await?;

        let campaign_data = json!({
            "type": "regular",
            "recipients": { "list_id": list_id },
            "settings": {
                "subject_line": subject_line,
                "title": format!("Pre-Show: {}", subject_line),
                "from_name": from_name,
                "reply_to": reply_to,
                "auto_footer": false,
                "inline_css": true
            }
        });

        let response = self
            .request(Method::POST, "/campaigns")
            .json(&campaign_data)
            .send()
            .await?;
        let campaign: CreatedCampaign = Self::check(response).await?.json().await?;
        tracing::info!("✅ Draft campaign created (ID: {})", campaign.id);

        let response = self
            .request(Method::PUT, &format!("/campaigns/{}/content", campaign.id))
            .json(&json!({ "html": html }))
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!("✅ HTML content uploaded");

        let link = campaign
            .web_id
            .map(|web_id| self.admin_link(web_id))
            .unwrap_or_default();

        Ok(CampaignDraft {
            id: campaign.id,
            web_id: campaign.web_id,
            link,
        })
    }

    async fn send_campaign_now(&self, campaign_id: &str) -> Result<()> {
        self.campaign_action(campaign_id, "send", None).await?;
        tracing::info!("✅ Campaign {} has been sent", campaign_id);
        Ok(())
    }

    async fn schedule_campaign(&self, campaign_id: &str, schedule_time_utc: &str) -> Result<()> {
        self.campaign_action(
            campaign_id,
            "schedule",
            Some(json!({ "schedule_time": schedule_time_utc })),
        )
        .await?;
        tracing::info!("✅ Campaign {} scheduled for {}", campaign_id, schedule_time_utc);
        Ok(())
    }

    async fn unschedule_campaign(&self, campaign_id: &str) -> Result<()> {
        self.campaign_action(campaign_id, "unschedule", None).await?;
        tracing::info!("✅ Campaign {} unscheduled", campaign_id);
        Ok(())
    }

    async fn get_campaigns(&self, status: CampaignStatus, range: &DateRange) -> Result<Vec<CampaignSummary>> {
        let mut query = vec![
            ("status", status.as_str().to_string()),
            ("count", "100".to_string()),
        ];
        if status == CampaignStatus::Sent {
            if let Some(since) = range.since.as_deref().filter(|s| !s.is_empty()) {
                query.push(("since_send_time", format!("{}T00:00:00+00:00", since)));
            }
            if let Some(until) = range.until.as_deref().filter(|s| !s.is_empty()) {
                query.push(("before_send_time", format!("{}T23:59:59+00:00", until)));
            }
        }

        let response = self
            .request(Method::GET, "/campaigns")
            .query(&query)
            .send()
            .await?;
        let list: CampaignList = Self::check(response).await?.json().await?;

        let summaries = list
            .campaigns
            .into_iter()
            .map(|c| CampaignSummary {
                web_link: c.web_id.map(|web_id| self.admin_link(web_id)),
                subject: c.settings.and_then(|s| s.subject_line),
                send_time: c
                    .send_time
                    .filter(|t| !t.is_empty())
                    .or(c.schedule_time.filter(|t| !t.is_empty())),
                id: c.id,
                web_id: c.web_id,
                status: c.status,
                emails_sent: c.emails_sent,
            })
            .collect();
        Ok(summaries)
    }

    async fn get_campaign_content(&self, campaign_id: &str) -> Result<Option<String>> {
        let response = self
            .request(Method::GET, &format!("/campaigns/{}/content", campaign_id))
            .send()
            .await?;
        let content: CampaignContent = Self::check(response).await?.json().await?;
        Ok(content
            .html
            .filter(|h| !h.is_empty())
            .or(content.plain_text.filter(|t| !t.is_empty())))
    }
}
