use anyhow::Context;

use clinidoc_api::app::{AppServices, build_app};
use clinidoc_auth::AuthConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clinidoc_observability::init();

    let config = AuthConfig::from_env().context("invalid auth configuration")?;
    tracing::info!(environment = ?config.environment(), "auth configuration loaded");

    let services = build_services(&config).await?;

    if let (Ok(username), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) {
        services
            .bootstrap_admin(&username, &password)
            .await
            .context("failed to bootstrap administrator")?;
    } else {
        tracing::warn!("no bootstrap administrator configured");
    }

    let app = build_app(services);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_services(config: &AuthConfig) -> anyhow::Result<AppServices> {
    use std::sync::Arc;

    use clinidoc_infra::postgres::PostgresDirectory;

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores");
        return Ok(AppServices::in_memory(config));
    };

    let store = PostgresDirectory::connect(&database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    store.migrate().await.context("failed to apply schema")?;
    tracing::info!("using postgres stores");

    let store = Arc::new(store);
    Ok(AppServices::new(config, store.clone(), store))
}

#[cfg(not(feature = "postgres"))]
async fn build_services(config: &AuthConfig) -> anyhow::Result<AppServices> {
    if std::env::var_os("DATABASE_URL").is_some() {
        tracing::warn!("DATABASE_URL ignored; built without the postgres feature");
    }
    Ok(AppServices::in_memory(config))
}
