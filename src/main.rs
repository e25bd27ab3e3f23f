//! Tagboard - a small multi-user image board.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagboard::{
    config::Config,
    server::{create_router, AppState, ClientAssets, RouterConfig},
    store::{sample_images, ImageStore, UserStore},
    validator::{HttpHeadValidator, ImageUrlValidator, PermissiveValidator},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    log_configuration(&config);

    let assets = match &config.client_dir {
        Some(dir) => match ClientAssets::load(dir) {
            Ok(assets) => assets,
            Err(e) => {
                error!("Failed to load client assets: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ClientAssets::builtin(),
    };

    if config.skip_url_validation {
        return run(config, PermissiveValidator, assets).await;
    }

    let timeout = Duration::from_secs(config.validator_timeout_secs);
    match HttpHeadValidator::new(timeout) {
        Ok(validator) => run(config, validator, assets).await,
        Err(e) => {
            error!("Failed to create image URL validator: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build the stores, bind, and serve until the server stops.
async fn run<V>(config: Config, validator: V, assets: ClientAssets) -> ExitCode
where
    V: ImageUrlValidator + 'static,
{
    let mut state = AppState::new(validator).with_assets(assets);
    if !config.no_seed {
        state = state
            .with_users(UserStore::with_admin(
                config.admin_username.as_str(),
                config.admin_password.as_str(),
            ))
            .with_images(ImageStore::with_images(sample_images()));
    }

    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/getImages?tags=test", addr);
    info!("");
    info!("  Open the client in your browser:");
    info!("    open http://{}/", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn log_configuration(config: &Config) {
    info!("Tagboard v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");

    if config.no_seed {
        info!("  Seed data: disabled");
    } else {
        info!(
            "  Seed data: admin account '{}' and {} sample image(s)",
            config.admin_username,
            sample_images().len()
        );
    }

    if config.skip_url_validation {
        warn!("  Image URL validation: DISABLED - every upload is accepted");
    } else {
        info!(
            "  Image URL validation: HEAD probe, {}s timeout",
            config.validator_timeout_secs
        );
    }

    match &config.client_dir {
        Some(dir) => info!("  Client: {}", dir.display()),
        None => info!("  Client: built-in"),
    }

    info!("  Max body size: {} bytes", config.max_body_bytes);
    match &config.cors_origins {
        Some(origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tagboard=debug,tower_http=debug"
    } else {
        "tagboard=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the command-line Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_tracing(!config.no_tracing)
        .with_max_body_bytes(config.max_body_bytes);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
