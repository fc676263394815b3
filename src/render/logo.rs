use crate::config::settings::ImageSettings;
use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;

/// Resolves `branding.logo_url` into the `src` used by the template.
pub struct LogoEmbedder {
    client: Client,
    raster_endpoint: String,
    width: u32,
}

struct LogoBytes {
    content: Vec<u8>,
    content_type: Option<String>,
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn is_svg(url: &str) -> bool {
    guess_mime(url) == Some("image/svg+xml")
}

/// MIME type from the file extension, ignoring any query string.
pub fn guess_mime(path: &str) -> Option<&'static str> {
    let path = path.split(['?', '#']).next().unwrap_or(path).to_lowercase();
    let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}

fn header_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LogoEmbedder {
    pub fn new(client: Client, settings: &ImageSettings) -> Self {
        Self {
            client,
            raster_endpoint: settings.raster_endpoint.clone(),
            width: settings.logo_embed_width,
        }
    }

    /// PNG rendition of a remote image through the raster proxy.
    pub fn raster_url(&self, image_url: &str) -> String {
        format!(
            "{}?url={}&output=png&w={}",
            self.raster_endpoint,
            urlencoding::encode(image_url),
            self.width
        )
    }

    /// Empty stays empty. Without embedding the URL is used as-is, except
    /// that fragments point remote SVGs at their raster rendition. Embedding
    /// produces a `data:` URI and falls back to the URL on any failure.
    pub async fn logo_src(&self, logo_url: &str, embed: bool, fragment_mode: bool) -> String {
        if logo_url.is_empty() {
            return String::new();
        }
        if fragment_mode && is_remote(logo_url) {
            return if is_svg(logo_url) {
                self.raster_url(logo_url)
            } else {
                logo_url.to_string()
            };
        }
        if !embed {
            return logo_url.to_string();
        }

        match self.embed(logo_url).await {
            Ok(data_uri) => data_uri,
            Err(e) => {
                tracing::warn!("⚠️ Could not embed logo {}: {}", logo_url, e);
                logo_url.to_string()
            }
        }
    }

    async fn embed(&self, logo_url: &str) -> Result<String> {
        let remote = is_remote(logo_url);
        let LogoBytes {
            content,
            content_type,
        } = if remote {
            match self.fetch_rasterized(logo_url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!("Raster proxy failed ({}), fetching logo directly", e);
                    self.fetch_direct(logo_url).await?
                }
            }
        } else {
            LogoBytes {
                content: tokio::fs::read(logo_url).await?,
                content_type: guess_mime(logo_url).map(str::to_string),
            }
        };

        let mut content_type = content_type;
        if remote && is_svg(logo_url) && content_type.as_deref() != Some("image/png") {
            content_type = Some("image/svg+xml".to_string());
        }
        let content_type = content_type.unwrap_or_else(|| "image/png".to_string());

        Ok(format!(
            "data:{};base64,{}",
            content_type,
            STANDARD.encode(content)
        ))
    }

    async fn fetch_rasterized(&self, logo_url: &str) -> Result<LogoBytes> {
        let response = self
            .client
            .get(self.raster_url(logo_url))
            .send()
            .await?
            .error_for_status()?;

        let content_type = if is_svg(logo_url) {
            Some("image/png".to_string())
        } else {
            header_content_type(&response).or_else(|| guess_mime(logo_url).map(str::to_string))
        };
        let content = response.bytes().await?.to_vec();
        Ok(LogoBytes {
            content,
            content_type,
        })
    }

    async fn fetch_direct(&self, logo_url: &str) -> Result<LogoBytes> {
        let response = self.client.get(logo_url).send().await?.error_for_status()?;
        let content_type =
            header_content_type(&response).or_else(|| guess_mime(logo_url).map(str::to_string));
        let content = response.bytes().await?.to_vec();
        Ok(LogoBytes {
            content,
            content_type,
        })
    }
}
