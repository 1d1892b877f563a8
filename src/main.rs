//! ig-saved-export - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ig_saved_export::{
    api::InstagramApi,
    cli::Args,
    config::{validate_config, Config},
    error::{exit_codes, Result},
    output::{
        create_spinner, print_banner, print_config_summary, print_error, print_info,
        print_run_stats, print_success, print_summary,
    },
    pipeline::export_saved_posts,
    session::{import_cookies_txt, save_session, CredentialPrompt, SessionManager, TerminalPrompt},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration; the file is optional
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        print_info(&format!("Using configuration from {}", config_path.display()));
        Config::load(&config_path)?
    } else {
        tracing::debug!("No configuration file at {}", config_path.display());
        Config::default()
    };

    let cookies_file = args.load_cookies.clone();
    args.merge_into_config(&mut config);

    let prompt = TerminalPrompt::new();
    if config.account.username.is_none() {
        config.account.username = Some(prompt.username()?);
    }

    config.normalize_username();
    validate_config(&config)?;

    let username = config.username()?.to_string();
    let session_file = config.session_file()?;
    let output = config.output_path()?;

    print_config_summary(
        &username,
        config.options.filter,
        config.options.max_posts,
        config.options.sleep_seconds,
        &output,
    );

    if let Some(cookies_file) = cookies_file {
        let session = import_cookies_txt(&cookies_file, &username)?;
        save_session(&session, &session_file)?;
        print_success(&format!(
            "Imported browser cookies into {}",
            session_file.display()
        ));
    }

    // Authenticate
    let api = InstagramApi::new(
        &config.account.user_agent,
        config.options.max_connection_attempts,
    )?;
    SessionManager::new(&api, &prompt, &session_file)
        .authenticate(
            &username,
            config.account.password.as_deref(),
            config.account.two_factor_code.as_deref(),
        )
        .await?;

    // Export
    let progress = create_spinner("Resolving profile...");
    let result = export_saved_posts(&api, &username, &config, &output, &progress).await;
    progress.finish_and_clear();
    let summary = result?;

    print_run_stats(&summary.state);
    print_summary(&summary.output, summary.rows);

    Ok(())
}
