use anyhow::Context;
use clap::Parser;
use movies_service::config::{CliArgs, Command};
use movies_service::utils::{logger, validation::Validate};
use movies_service::{app, web, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_logger(args.verbose, args.json_logs);

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            ServiceConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => ServiceConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }
    tracing::debug!("Service config: {:?}", config);

    let router = match args.command {
        Command::Movies => app::movies_app(&config)?,
        Command::MovieInfo => app::movie_info_app(&config).0,
        Command::Reviews => app::reviews_app(&config).0,
    };

    tracing::info!("Starting {:?} service", args.command);
    web::serve(router, &config.server.bind).await?;

    Ok(())
}
