pub mod cli;
pub mod credentials;
pub mod settings;
pub mod show;
pub mod theatre;

use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::utils::error::{PreshowError, Result};
#[cfg(feature = "cli")]
use crate::utils::time::parse_show_datetime;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Write the rendered email to disk
    Generate,
    /// Create a Mailchimp campaign from the rendered email
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Leave the campaign as a draft
    Draft,
    /// Send the campaign immediately
    Send,
    /// Schedule the campaign for --schedule-at
    Schedule,
}

/// Which HTML variants to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Compliance {
    /// Mailchimp variant and standalone variant
    Both,
    /// With the Mailchimp merge-tag footer
    Mailchimp,
    /// Without the footer, logo embedded, dark mode stripped
    Standalone,
}

impl Compliance {
    pub fn includes_mailchimp(self) -> bool {
        matches!(self, Compliance::Both | Compliance::Mailchimp)
    }

    pub fn includes_standalone(self) -> bool {
        matches!(self, Compliance::Both | Compliance::Standalone)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "preshow-mailer")]
#[command(about = "Generate a pre-show logistics email for theatre patrons")]
pub struct CliConfig {
    /// Path to the theatre-specific YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the per-performance JSON/YAML file
    #[arg(long)]
    pub show: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Action::Generate)]
    pub action: Action,

    #[arg(long, value_enum, default_value_t = Mode::Draft)]
    pub mode: Mode,

    #[arg(long, value_enum, default_value_t = Compliance::Both)]
    pub compliance: Compliance,

    /// Local send time for --mode schedule, e.g. 2025-11-20T09:00
    #[arg(long)]
    pub schedule_at: Option<String>,

    /// Directory for generated files (overrides preshow.toml)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Path to preshow.toml
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Render the email body without the surrounding HTML document
    #[arg(long)]
    pub fragment: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            validation::validate_path("output_dir", dir)?;
        }

        if self.action == Action::Upload && self.compliance == Compliance::Standalone {
            return Err(PreshowError::InvalidConfigValueError {
                field: "compliance".to_string(),
                value: "standalone".to_string(),
                reason: "Mailchimp campaigns need the compliance footer; use mailchimp or both"
                    .to_string(),
            });
        }

        if self.action == Action::Upload && self.mode == Mode::Schedule {
            let at = validation::validate_required_field("schedule_at", &self.schedule_at)?;
            parse_show_datetime(at)?;
        }

        if self.action == Action::Generate && self.mode != Mode::Draft {
            tracing::warn!("--mode only applies to --action upload; ignoring");
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["preshow-mailer"]);
        assert_eq!(config.action, Action::Generate);
        assert_eq!(config.mode, Mode::Draft);
        assert_eq!(config.compliance, Compliance::Both);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_documented_invocation() {
        let config = CliConfig::parse_from([
            "preshow-mailer",
            "--config",
            "data/examples/theatre_config.yaml",
            "--show",
            "data/examples/show_info.json",
            "--action",
            "upload",
            "--mode",
            "draft",
            "--compliance",
            "mailchimp",
        ]);
        assert_eq!(config.action, Action::Upload);
        assert_eq!(config.compliance, Compliance::Mailchimp);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_schedule_requires_time() {
        let config = CliConfig::parse_from([
            "preshow-mailer",
            "--action",
            "upload",
            "--mode",
            "schedule",
        ]);
        assert!(matches!(
            config.validate(),
            Err(PreshowError::MissingConfigError { .. })
        ));

        let config = CliConfig::parse_from([
            "preshow-mailer",
            "--action",
            "upload",
            "--mode",
            "schedule",
            "--schedule-at",
            "2025-11-20T09:00",
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_standalone_upload_rejected() {
        let config = CliConfig::parse_from([
            "preshow-mailer",
            "--action",
            "upload",
            "--compliance",
            "standalone",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compliance_variants() {
        assert!(Compliance::Both.includes_mailchimp() && Compliance::Both.includes_standalone());
        assert!(!Compliance::Mailchimp.includes_standalone());
        assert!(!Compliance::Standalone.includes_mailchimp());
    }
}
