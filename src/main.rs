use clap::Parser;
use preshow_mailer::config::{Action, Mode};
use preshow_mailer::utils::error::ErrorSeverity;
use preshow_mailer::utils::runtime_paths::RuntimePaths;
use preshow_mailer::utils::time::to_utc_iso;
use preshow_mailer::utils::{logger, validation::Validate};
use preshow_mailer::{
    CliConfig, Credentials, EmailGenerator, LocalStorage, MailchimpClient, MailerEngine,
    Result, Settings, ShowInfo, TheatreConfig, UploadOutcome,
};

async fn run(cli: CliConfig) -> Result<()> {
    let paths = RuntimePaths::discover();
    if let Some(env_file) = paths.load_env() {
        tracing::debug!("Loaded environment from {}", env_file.display());
    }

    let settings = Settings::load(cli.settings.as_deref(), paths.settings_file().as_deref())?;
    settings.validate()?;

    let (default_config, default_show) = paths.default_config_paths();
    let config_path = cli.config.clone().unwrap_or(default_config);
    let show_path = cli.show.clone().unwrap_or(default_show);

    tracing::info!("📄 Theatre config: {}", config_path.display());
    let theatre = TheatreConfig::from_file(&config_path)?;
    theatre.validate()?;

    tracing::info!("🎭 Show info: {}", show_path.display());
    let show = ShowInfo::from_file(&show_path)?;
    show.validate()?;

    let credentials = Credentials::from_env();
    credentials.warn_missing();

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output.directory.clone());
    let generator = EmailGenerator::from_settings(&settings, &credentials)?;
    let engine = MailerEngine::new(generator, LocalStorage::new(output_dir), settings.output.clone());

    match cli.action {
        Action::Generate => {
            let written = engine
                .generate(&theatre, &show, cli.compliance, cli.fragment)
                .await?;
            println!("✅ Email generated for '{}'", show.show_title);
            for path in written {
                println!("📁 {}", path);
            }
        }
        Action::Upload => {
            let schedule_time_utc = match (cli.mode, cli.schedule_at.as_deref()) {
                (Mode::Schedule, Some(local)) => Some(to_utc_iso(local)?),
                _ => None,
            };

            let client = preshow_mailer::services::build_http_client(&settings)?;
            let campaigns = MailchimpClient::new(client, credentials.mailchimp()?, &settings.mailchimp);

            let outcome = engine
                .upload(
                    &campaigns,
                    &theatre,
                    &show,
                    cli.mode,
                    schedule_time_utc.as_deref(),
                    cli.fragment,
                )
                .await?;

            match &outcome {
                UploadOutcome::Draft(draft) => {
                    println!("✅ Draft campaign created (ID: {})", draft.id);
                }
                UploadOutcome::Sent(draft) => {
                    println!("✅ Campaign {} has been sent!", draft.id);
                }
                UploadOutcome::Scheduled {
                    draft,
                    schedule_time_utc,
                } => {
                    println!("✅ Campaign {} scheduled for {}", draft.id, schedule_time_utc);
                }
            }
            if !outcome.draft().link.is_empty() {
                println!("🔗 {}", outcome.draft().link);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting preshow-mailer");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
