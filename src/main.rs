#[cfg(feature = "native")]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    use tracing_subscriber::EnvFilter;

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Sign in if needed, then report who the stored session belongs to
#[cfg(feature = "native")]
async fn run() -> Result<(), school_panel::core::ApiError> {
    use school_panel::core::{ApiContext, AuthService, Config, Credentials};

    let config = Config::from_env()?;
    tracing::info!(
        "Config loaded: api={}, session_file={}",
        config.api_base_url,
        config.session_file.display()
    );

    let ctx = ApiContext::native(config)?;
    let auth = AuthService::new(&ctx);

    if !auth.is_authenticated() {
        let email = std::env::var("SCHOOL_PANEL_EMAIL").ok();
        let password = std::env::var("SCHOOL_PANEL_PASSWORD").ok();
        match email.zip(password) {
            Some((email, password)) => {
                auth.login(&Credentials::new(email, password)).await?;
            }
            None => {
                tracing::info!(
                    "No stored session; set SCHOOL_PANEL_EMAIL and SCHOOL_PANEL_PASSWORD to sign in"
                );
                return Ok(());
            }
        }
    }

    let profile = auth.current_user().await?;
    if let Some(user) = auth.stored_user() {
        tracing::info!(user_id = user.user_id, "Signed in as {}", user.role.display_name());
    }
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

