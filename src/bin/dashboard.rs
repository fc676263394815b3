//! Pre-show email dashboard
//!
//! Serves the local editor and opens it in the default browser.

use anyhow::Context;
use preshow_mailer::dashboard::{self, AppState, Defaults};
use preshow_mailer::utils::logger;
use preshow_mailer::utils::runtime_paths::RuntimePaths;
use preshow_mailer::utils::validation::Validate;
use preshow_mailer::{Credentials, Settings};
use std::process::Command;
use std::time::Duration;

fn open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let result = Command::new("open").arg(url).spawn();

    #[cfg(target_os = "windows")]
    let result = Command::new("cmd").args(["/C", "start", "", url]).spawn();

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let result = Command::new("xdg-open").arg(url).spawn();

    if let Err(e) = result {
        tracing::warn!("⚠️ Could not open a browser ({}); visit {} manually", e, url);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var("PRESHOW_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    logger::init_dashboard_logger(json_logs);

    tracing::info!("Pre-show dashboard v{}", env!("CARGO_PKG_VERSION"));

    let paths = RuntimePaths::discover();
    if let Some(env_file) = paths.load_env() {
        tracing::info!("📁 Loaded environment from {}", env_file.display());
    }

    let settings = Settings::load(None, paths.settings_file().as_deref())
        .context("failed to load settings")?;
    settings.validate().context("invalid settings")?;

    let credentials = Credentials::from_env();
    credentials.warn_missing();

    let defaults = Defaults::load(&paths);
    let state = AppState::from_settings(&settings, &credentials, defaults)
        .context("failed to build dashboard services")?;

    if settings.dashboard.open_browser {
        let url = settings.dashboard.url();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            open_browser(&url);
        });
    }

    dashboard::serve(state).await.context("dashboard server failed")?;
    Ok(())
}
