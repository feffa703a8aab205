use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fundboard_core::{
    api::{FundboardServer, ServerState},
    load_env, load_env_from_path, validate_env,
    utils::logger::init_logging_with_level,
    DocumentTextExtractor, ExtractionPipeline, FundboardConfig, LopdfBackend, PdfBackend,
    ProfileStore, TextGenerator,
};
use fundboard_provider_gemini::{GeminiClient, GeminiConfig};
use fundboard_storage_mongo::MongoProfileStore;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "run-fundboard", about = "Startup funding dashboard API")]
struct Cli {
    #[arg(long, env = "FUNDBOARD_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Overrides FUNDBOARD_HOST
    #[arg(long)]
    host: Option<String>,

    /// Overrides FUNDBOARD_PORT
    #[arg(long)]
    port: Option<u16>,

    /// Load variables from this file instead of the nearest .env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> fundboard_core::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => load_env_from_path(path)?,
        None => load_env()?,
    }
    init_logging_with_level(Some(&cli.log_level));
    validate_env(&["GEMINI_API_KEY", "MONGODB_URL"])?;

    let mut config = FundboardConfig::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let gemini_config = GeminiConfig::from_env()?;
    info!("Using Gemini model {}", gemini_config.model);
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(gemini_config));

    let store: Arc<dyn ProfileStore> = Arc::new(MongoProfileStore::from_env().await?);

    // uploads answer 503 until the PDF backend is up
    let extractor = Arc::new(DocumentTextExtractor::new());
    {
        let extractor = Arc::clone(&extractor);
        tokio::spawn(async move {
            let init = extractor
                .initialize(|| async {
                    Ok(Arc::new(LopdfBackend::new()) as Arc<dyn PdfBackend>)
                })
                .await;
            if let Err(e) = init {
                error!("PDF extractor failed to initialize: {}", e);
            }
        });
    }

    let pipeline = ExtractionPipeline::new(extractor, Arc::clone(&generator));
    let state = ServerState::new(config, store, generator, pipeline);

    let mut server = FundboardServer::new(state);
    let addr = server.start().await?;
    info!("Fundboard listening on http://{}", addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    server.stop();
    Ok(())
}
