//! Email rendering: handlebars templates plus HTML post-processing.

pub mod helpers;
pub mod html;
pub mod logo;

use crate::domain::model::{EmailContext, RenderOptions, RenderedEmail};
use crate::utils::error::Result;
use handlebars::Handlebars;
use serde_json::json;

pub use html::{apply_preview_overrides, strip_dark_mode_html, ThemeMode};
pub use logo::LogoEmbedder;

const HTML_TEMPLATE: &str = include_str!("templates/email_body.html.hbs");
const TEXT_TEMPLATE: &str = include_str!("templates/email_body.txt.hbs");

pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        helpers::register_helpers(&mut handlebars);
        handlebars.register_template_string("email_html", HTML_TEMPLATE)?;
        handlebars.register_template_string("email_text", TEXT_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Renders both bodies from an already-fetched context.
    pub fn render(
        &self,
        context: &EmailContext,
        logo_src: &str,
        options: RenderOptions,
    ) -> Result<RenderedEmail> {
        let data = render_data(context, logo_src, options)?;

        let mut html = self.handlebars.render("email_html", &data)?;
        if options.strip_dark_mode {
            html = strip_dark_mode_html(&html);
        }
        let text = self.handlebars.render("email_text", &data)?;

        Ok(RenderedEmail { html, text })
    }
}

fn render_data(
    context: &EmailContext,
    logo_src: &str,
    options: RenderOptions,
) -> Result<serde_json::Value> {
    let mut data = serde_json::to_value(context)?;
    data["config"]["branding"]["logo_src"] = json!(logo_src);
    data["include_mailchimp_footer"] = json!(options.include_mailchimp_footer);
    data["fragment_mode"] = json!(options.fragment_mode);
    data["units"] = json!(context.config.units());
    Ok(data)
}
