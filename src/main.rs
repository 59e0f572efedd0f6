use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use voicelogger::audio::AudioBackendFactory;
use voicelogger::http::{create_router, AppState, ServiceSettings};
use voicelogger::net::TcpProbe;
use voicelogger::roads::RoadsClient;
use voicelogger::storage::RecordingStore;
use voicelogger::Config;

#[derive(Debug, Parser)]
#[command(name = "voicelogger", about = "Voice recorder with road-snapped GPS tracks")]
struct Args {
    /// Config file (without extension, `config` crate conventions)
    #[arg(long, default_value = "config/voicelogger")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("voicelogger v0.1.0");
    info!("loaded config: {}", cfg.service.name);

    let store = RecordingStore::open(PathBuf::from(&cfg.storage.db_path))
        .context("failed to open recording store")?;
    let roads = Arc::new(RoadsClient::from_config(&cfg.roads)?);
    let connectivity = Arc::new(TcpProbe::from_config(&cfg.connectivity));

    let settings = ServiceSettings {
        recordings_path: PathBuf::from(&cfg.audio.recordings_path),
        audio_source: AudioBackendFactory::source_from_str(&cfg.audio.source)?,
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        location: cfg.location.clone(),
        sample_audio_path: cfg.storage.sample_audio_path.clone(),
    };

    let state = AppState::new(store, roads, connectivity, settings);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("HTTP server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}
