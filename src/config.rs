//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri di analisi e conversione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `probe_timeout_secs`: Timeout per singola analisi ffprobe (default: 10)
//! - `verify_timeout_secs`: Timeout per verifica `-version` dei candidati (default: 3)
//! - `transcode_timeout_secs`: Timeout per singola conversione (default: None = illimitato)
//! - `video_preset`: Preset x264 (default: "medium")
//! - `audio_bitrate`: Bitrate AAC (default: "128k")
//! - `ffprobe_path` / `ffmpeg_path`: Override dei tool esterni
//! - `output_path`: Directory di output per la conversione batch (default: None = accanto all'originale)
//! - `event_buffer`: Capacità del canale eventi verso la UI (default: 64)
//! - `json_output`: Eventi come righe JSON su stdout
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     probe_timeout_secs: 20,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// x264 speed/quality presets accepted by ffmpeg
pub const X264_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Configuration for scanning, probing and converting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds allowed for a single ffprobe run
    pub probe_timeout_secs: u64,
    /// Seconds allowed for `<tool> -version` when verifying install candidates
    pub verify_timeout_secs: u64,
    /// Seconds allowed for a single ffmpeg run (None = unbounded)
    pub transcode_timeout_secs: Option<u64>,
    /// x264 preset used for re-encoding
    pub video_preset: String,
    /// AAC bitrate used for re-encoding
    pub audio_bitrate: String,
    /// Explicit ffprobe executable, skips discovery
    pub ffprobe_path: Option<PathBuf>,
    /// Explicit ffmpeg executable, skips discovery
    pub ffmpeg_path: Option<PathBuf>,
    /// Output directory for batch conversion (None = next to each input)
    pub output_path: Option<PathBuf>,
    /// Capacity of the event channel towards the presentation layer
    pub event_buffer: usize,
    /// Output events as JSON lines for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 10,
            verify_timeout_secs: 3,
            transcode_timeout_secs: None,
            video_preset: "medium".to_string(),
            audio_bitrate: "128k".to_string(),
            ffprobe_path: None,
            ffmpeg_path: None,
            output_path: None,
            event_buffer: 64,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Probe timeout must be greater than 0"));
        }

        if self.verify_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Verify timeout must be greater than 0"));
        }

        if self.transcode_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Transcode timeout must be greater than 0 when set"));
        }

        if !X264_PRESETS.contains(&self.video_preset.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown video preset '{}' (expected one of: {})",
                self.video_preset,
                X264_PRESETS.join(", ")
            ));
        }

        if !is_valid_bitrate(&self.audio_bitrate) {
            return Err(anyhow::anyhow!(
                "Audio bitrate must look like '128k', got '{}'",
                self.audio_bitrate
            ));
        }

        if self.event_buffer == 0 {
            return Err(anyhow::anyhow!("Event buffer must be greater than 0"));
        }

        // Una directory di output inesistente viene creata all'avvio del batch
        if let Some(ref output_path) = self.output_path {
            if output_path.exists() && !output_path.is_dir() {
                return Err(anyhow::anyhow!(
                    "Output path is not a directory: {}",
                    output_path.display()
                ));
            }
        }

        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("media-compat").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Digits followed by an optional k/K/M suffix
fn is_valid_bitrate(value: &str) -> bool {
    let digits = value.trim_end_matches(['k', 'K', 'M']);
    !digits.is_empty()
        && digits.len() + 1 >= value.len()
        && digits.chars().all(|c| c.is_ascii_digit())
}
