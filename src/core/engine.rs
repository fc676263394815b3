use crate::config::settings::OutputSettings;
use crate::config::show::ShowInfo;
use crate::config::theatre::TheatreConfig;
use crate::config::{Compliance, Mode};
use crate::core::generator::EmailGenerator;
use crate::domain::model::{CampaignDraft, RenderOptions};
use crate::domain::ports::{CampaignService, PlacesProvider, Storage, WeatherProvider};
use crate::utils::error::{PreshowError, Result};
use crate::utils::validation;

/// Subject line used for every campaign.
pub fn campaign_subject(show_title: &str) -> String {
    format!("Upcoming Performance: {}", show_title)
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Draft(CampaignDraft),
    Sent(CampaignDraft),
    Scheduled {
        draft: CampaignDraft,
        schedule_time_utc: String,
    },
}

impl UploadOutcome {
    pub fn draft(&self) -> &CampaignDraft {
        match self {
            UploadOutcome::Draft(draft) | UploadOutcome::Sent(draft) => draft,
            UploadOutcome::Scheduled { draft, .. } => draft,
        }
    }
}

/// Creates a draft from rendered HTML, then sends or schedules it per `mode`.
///
/// Rejects a publish request before anything is fetched or created.
/// The contact email becomes the campaign reply-to.
pub fn check_publishable(
    config: &TheatreConfig,
    mode: Mode,
    schedule_time_utc: Option<&str>,
) -> Result<()> {
    validation::validate_non_empty_string("details.contact_email", &config.details.contact_email)?;
    if mode == Mode::Schedule && schedule_time_utc.is_none() {
        return Err(PreshowError::MissingConfigError {
            field: "schedule_at".to_string(),
        });
    }
    Ok(())
}

/// A draft that was created but failed to send or schedule is left in place
/// and the error is returned.
pub async fn publish_campaign<C: CampaignService + ?Sized>(
    campaigns: &C,
    html: &str,
    config: &TheatreConfig,
    show: &ShowInfo,
    mode: Mode,
    schedule_time_utc: Option<&str>,
) -> Result<UploadOutcome> {
    check_publishable(config, mode, schedule_time_utc)?;

    let draft = campaigns
        .create_draft_campaign(
            html,
            &campaign_subject(&show.show_title),
            &config.theatre.name,
            &config.details.contact_email,
        )
        .await?;
    tracing::info!("📝 Draft campaign ready: {}", draft.link);

    match (mode, schedule_time_utc) {
        (Mode::Send, _) => {
            campaigns.send_campaign_now(&draft.id).await?;
            Ok(UploadOutcome::Sent(draft))
        }
        (Mode::Schedule, Some(at)) => {
            campaigns.schedule_campaign(&draft.id, at).await?;
            Ok(UploadOutcome::Scheduled {
                draft,
                schedule_time_utc: at.to_string(),
            })
        }
        _ => Ok(UploadOutcome::Draft(draft)),
    }
}

/// Drives generation and upload for the command line.
pub struct MailerEngine<W: WeatherProvider, P: PlacesProvider, S: Storage> {
    generator: EmailGenerator<W, P>,
    storage: S,
    output: OutputSettings,
}

impl<W: WeatherProvider, P: PlacesProvider, S: Storage> MailerEngine<W, P, S> {
    pub fn new(generator: EmailGenerator<W, P>, storage: S, output: OutputSettings) -> Self {
        Self {
            generator,
            storage,
            output,
        }
    }

    /// Writes the variants selected by `compliance` and returns their paths.
    /// Data is fetched once and shared by every variant.
    pub async fn generate(
        &self,
        config: &TheatreConfig,
        show: &ShowInfo,
        compliance: Compliance,
        fragment_mode: bool,
    ) -> Result<Vec<String>> {
        let context = self.generator.build_context(config, show).await?;
        let mut written = Vec::new();
        let mut text = None;

        if compliance.includes_mailchimp() {
            let options = RenderOptions::mailchimp().with_fragment(fragment_mode);
            let email = self.generator.render_email_from_context(&context, options).await?;
            written.push(
                self.storage
                    .write_file(&self.output.html_filename, email.html.as_bytes())
                    .await?,
            );
            text = Some(email.text);
        }

        if compliance.includes_standalone() {
            let options = RenderOptions::standalone().with_fragment(fragment_mode);
            let email = self.generator.render_email_from_context(&context, options).await?;
            written.push(
                self.storage
                    .write_file(&self.output.standalone_html_filename, email.html.as_bytes())
                    .await?,
            );
            text.get_or_insert(email.text);
        }

        if let Some(text) = text {
            written.push(
                self.storage
                    .write_file(&self.output.text_filename, text.as_bytes())
                    .await?,
            );
        }

        for path in &written {
            tracing::info!("📁 Wrote {}", path);
        }
        Ok(written)
    }

    /// Renders the Mailchimp variant and publishes it.
    pub async fn upload<C: CampaignService + ?Sized>(
        &self,
        campaigns: &C,
        config: &TheatreConfig,
        show: &ShowInfo,
        mode: Mode,
        schedule_time_utc: Option<&str>,
        fragment_mode: bool,
    ) -> Result<UploadOutcome> {
        check_publishable(config, mode, schedule_time_utc)?;
        let context = self.generator.build_context(config, show).await?;
        let options = RenderOptions::mailchimp().with_fragment(fragment_mode);
        let email = self.generator.render_email_from_context(&context, options).await?;
        publish_campaign(campaigns, &email.html, config, show, mode, schedule_time_utc).await
    }
}
