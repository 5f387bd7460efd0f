use daemon::{get_config_info, setup_logger, Database, PeriodicRunner, Pipeline};
use slog::{error, info, Logger};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info()?;
    let logger = setup_logger(&cli);
    let config = cli.pipeline_config()?;

    info!(logger, "City weather daemon starting...");
    info!(logger, "  Database: {}", config.db_path.display());
    info!(logger, "  Catalog URL: {}", config.catalog_url);
    info!(logger, "  Weather URL: {}", config.weather_url);
    info!(logger, "  Cities: {}", config.city_limit);
    info!(
        logger,
        "  Fetch interval: {} seconds",
        config.poll_interval.as_secs()
    );

    let db = match Database::open(&config.db_path).await {
        Ok(db) => db,
        Err(e) => {
            error!(logger, "failed to open {}: {}", config.db_path.display(), e);
            return Err(e.into());
        }
    };
    let poll_interval = config.poll_interval;
    let pipeline = Pipeline::new(logger.clone(), config, db)?;

    let cities = match pipeline.bootstrap().await {
        Ok(cities) => cities,
        Err(e) => {
            error!(logger, "startup failed: {}", e);
            if let Err(close_err) = pipeline.database().close().await {
                error!(logger, "failed to close database: {}", close_err);
            }
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(logger.clone(), cancel.clone()));

    let runner = PeriodicRunner::new(logger.clone(), poll_interval, cancel);
    let pipeline = &pipeline;
    let cities = cities.as_slice();
    let cycle_logger = logger.clone();
    runner
        .run(move || {
            let logger = cycle_logger.clone();
            async move {
                let report = pipeline.run_cycle(cities).await;
                info!(
                    logger,
                    "cycle finished: {} observed, {} skipped",
                    report.observed,
                    report.failed
                );
            }
        })
        .await;

    match pipeline.database().close().await {
        Ok(()) => info!(logger, "database closed"),
        Err(e) => error!(logger, "WAL checkpoint failed: {}", e),
    }
    Ok(())
}

async fn shutdown_signal(logger: Logger, cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(logger, "failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(logger, "failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(logger, "shutdown requested, finishing current cycle");
    cancel.cancel();
}
