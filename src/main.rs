use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zipscope_api::RestApi;
use zipscope_core::{Dataset, TsneConfig};
use zipscope_data::ReferenceGroup;

/// Demographic ZIP-code similarity dashboard server
#[derive(Parser, Debug)]
#[command(name = "zipscope")]
#[command(about = "Rank ZIP codes by demographic similarity and serve dashboard views", long_about = None)]
struct Args {
    /// Path to the census demographics table
    #[arg(long, default_value = "./data/census_zipcode_demographics.csv")]
    census: PathBuf,

    /// Path to the enrollment table (ZIP/city/state linkage)
    #[arg(long, default_value = "./data/enrollment.csv")]
    enrollment: PathBuf,

    /// Optional city-image lookup table
    #[arg(long)]
    city_images: Option<PathBuf>,

    /// Optional ZIP-occurrence counts table
    #[arg(long)]
    zip_counts: Option<PathBuf>,

    /// JSON file overriding the built-in reference ZIP list
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Ranked candidates to keep
    #[arg(long, default_value_t = 100)]
    top_k: usize,

    /// Candidate cap per chart render after filtering
    #[arg(long, default_value_t = 50)]
    chart_cap: usize,

    /// Restrict detail profiles to this state/province code
    #[arg(long, default_value = "CA")]
    state: String,

    /// t-SNE random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// HTTP API port
    #[arg(long, default_value_t = 8050)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting zipscope v{}", env!("CARGO_PKG_VERSION"));
    info!("Census table: {:?}", args.census);
    info!("Enrollment table: {:?}", args.enrollment);
    info!("HTTP API port: {}", args.http_port);

    let records = zipscope_data::load_census(&args.census)?;
    info!("Loaded {} census records", records.len());

    let links = zipscope_data::load_city_links(&args.enrollment)?;
    info!("Loaded {} enrollment rows", links.len());

    let images = match &args.city_images {
        Some(path) => zipscope_data::load_city_images(path)?,
        None => Vec::new(),
    };
    let counts = match &args.zip_counts {
        Some(path) => zipscope_data::load_zip_counts(path)?,
        None => Default::default(),
    };

    let reference = match &args.reference {
        Some(path) => ReferenceGroup::from_json_file(path)?,
        None => ReferenceGroup::default_group(),
    };
    info!("Reference group: {} ZIP codes", reference.len());

    let dataset = Dataset::builder(records)
        .reference(reference.to_vec())
        .city_links(links)
        .city_images(images)
        .enrollment_counts(counts)
        .top_k(args.top_k)
        .chart_cap(args.chart_cap)
        .state_filter(Some(args.state))
        .tsne(TsneConfig {
            random_state: args.seed,
            ..TsneConfig::default()
        })
        .build()?;
    let summary = dataset.info();
    info!(
        "Dataset ready: {} ZIP codes, {} reference, {} selected candidates",
        summary.zip_count, summary.reference_count, summary.selected_count
    );

    let dataset = Arc::new(dataset);

    let dataset_http = dataset.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(dataset_http, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("zipscope started successfully");
    info!("HTTP API: http://localhost:{}/api/dataset", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
