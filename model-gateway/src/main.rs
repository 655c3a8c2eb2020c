use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use env_logger::Env;

use model_gateway::{
    config::{GatewayConfig, ServerEnv},
    provider::Provider,
    router::app_router,
    state::AppState,
    upstream::HttpUpstream,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    log::info!("Loading environment");
    let env: ServerEnv = envy::from_env().context("invalid server environment")?;
    log::info!("Environment: {:?}", &env);

    let config = GatewayConfig::from_env()?;
    log::info!("Credentials: {:?}", &config.credentials);
    log::info!("Endpoints: {:?}", &config.endpoints);
    for provider in Provider::ALL {
        if config.credentials.get(provider).is_none() {
            log::warn!(
                "{} is not set, {} inference requests will fail",
                provider.credential_env_var(),
                provider
            );
        }
    }

    let upstream = Arc::new(HttpUpstream::default());
    let state = AppState::new(config, upstream);

    let app = app_router().with_state(state);

    let listen_addr = SocketAddr::from((env.host, env.port));
    log::info!("Server running on {}", listen_addr);
    axum::Server::bind(&listen_addr)
        .serve(app.into_make_service())
        .await
        .context("failed to start axum server")?;

    Ok(())
}
