use ratusz_backend::{build_rocket, config::Config, routes::AppState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    info!("🚀 Starting ratusz server");

    let config = Config::load(|key| secret_store.get(key));
    info!("📂 Storing collections in {}", config.data_dir.display());

    let state = AppState::new(&config);
    let rocket = build_rocket(&config, state);

    Ok(rocket.into())
}
