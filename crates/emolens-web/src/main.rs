use anyhow::Result;
use clap::Parser;
use emolens_classifiers::build_classifier;
use emolens_core::now_ist;
use emolens_telemetry::{
    export_predictions, export_visits, MetricsCollector, SqliteStore, Store,
};
use emolens_web::{run_server, AppConfig, AppState, Cli, Commands, LogTable, RequestHandler};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(&cli.config, &cli)?;

    match &cli.command {
        Commands::Serve { .. } => {
            let addr = config.socket_addr()?;
            let prometheus = init_metrics()?;

            info!("Loading model and opening {}", config.database_path.display());
            let state = AppState::from_config(&config)?.with_prometheus(prometheus);

            println!();
            println!("  EmoLens: emotion classification in text");
            println!("  Model:   {} ({})", state.model.name, state.model.label_table);
            println!("  Logs:    {}", config.database_path.display());
            println!();
            println!("  Open http://{} in your browser", addr);
            println!();

            run_server(state, addr).await?;
        }

        Commands::Classify { text, record } => {
            let classifier = build_classifier(&config.model)?;

            // Without --record the prediction goes to a throwaway database
            let store: Arc<dyn Store> = if *record {
                Arc::new(SqliteStore::open_and_init(&config.database_path)?)
            } else {
                let store = SqliteStore::open_in_memory()?;
                store.ensure_schema()?;
                Arc::new(store)
            };

            let handler = RequestHandler::new(Arc::new(classifier), store, MetricsCollector::new())
                .with_reject_blank_input(config.reject_blank_input);
            let submission = handler.handle_submission(text, now_ist()).await?;

            println!("{}", serde_json::to_string_pretty(&submission)?);
            if let Some(warning) = &submission.storage_warning {
                eprintln!("warning: {warning}");
            }
        }

        Commands::Export {
            table,
            format,
            output,
        } => {
            let store = SqliteStore::open_and_init(&config.database_path)?;

            let mut out: Box<dyn Write> = match output {
                Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
                None => Box::new(std::io::stdout().lock()),
            };

            let count = match table {
                LogTable::Visits => export_visits(&store.list_visits()?, &mut out, *format)?,
                LogTable::Predictions => {
                    export_predictions(&store.list_predictions()?, &mut out, *format)?
                }
            };
            info!("Exported {} {:?} rows", count, table);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "emolens=debug,emolens_web=debug,emolens_classifiers=debug,emolens_telemetry=debug,tower_http=debug"
    } else {
        "emolens=info,emolens_web=info,emolens_classifiers=info,emolens_telemetry=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "emolens_predictions_total",
        "Successful classifications by predicted label"
    );
    metrics::describe_counter!("emolens_page_visits_total", "Logged page renders by page");
    metrics::describe_counter!("emolens_errors_total", "Failed submissions and log writes by kind");
    metrics::describe_histogram!(
        "emolens_classification_latency_us",
        metrics::Unit::Microseconds,
        "Classification latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
