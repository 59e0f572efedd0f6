use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub location: LocationConfig,
    pub roads: RoadsConfig,
    pub connectivity: ConnectivityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Directory recordings are written to
    pub recordings_path: String,
    /// "microphone" or "silence"
    pub source: String,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    /// "replay" (a GNSS provider plugs in behind the LocationSource trait)
    pub provider: String,
    /// Track file used by the replay provider
    pub track_path: String,
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RoadsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Explicit bound on one correction round trip
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_addr: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub db_path: String,
    /// Audio file referenced by seeded sample recordings, if present
    pub sample_audio_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
