//! # JSON Output Module
//!
//! Output strutturato in JSON, una riga per messaggio, per chi consuma la
//! CLI da un altro processo.
//!
//! ## Responsabilità:
//! - Emette ogni evento della sessione così com'è (`SessionEvent` porta già il campo `type`)
//! - Aggiunge i messaggi propri della CLI: inizio comando, risultati, radici, errori
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio di un comando
//! - `results`: Catalogo finale con riepilogo
//! - `roots`: Radici di scansione disponibili
//! - `tools`: Posizione di ffprobe/ffmpeg
//! - `error`: Errore che interrompe il comando

use crate::session::{CatalogEntry, CatalogSummary, SessionEvent};
use crate::Config;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio di un comando
    Start {
        command: String,
        target: PathBuf,
        config: JsonConfig,
    },

    /// Stato finale del catalogo
    Results {
        entries: Vec<CatalogEntry>,
        summary: CatalogSummary,
    },

    Roots {
        roots: Vec<PathBuf>,
    },

    Tools {
        ffprobe: Option<PathBuf>,
        ffmpeg: Option<PathBuf>,
    },

    /// Errore generale
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione riportata nel messaggio `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub probe_timeout_secs: u64,
    pub video_preset: String,
    pub audio_bitrate: String,
    pub output_path: Option<PathBuf>,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        emit_line(self);
    }

    pub fn start(command: &str, target: PathBuf, config: &Config) -> Self {
        Self::Start {
            command: command.to_string(),
            target,
            config: JsonConfig::from(config),
        }
    }

    pub fn results(entries: Vec<CatalogEntry>, summary: CatalogSummary) -> Self {
        Self::Results { entries, summary }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

/// Emette un evento della sessione su stdout
pub fn emit_event(event: &SessionEvent) {
    emit_line(event);
}

fn emit_line<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{}", json);
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            probe_timeout_secs: config.probe_timeout_secs,
            video_preset: config.video_preset.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            output_path: config.output_path.clone(),
        }
    }
}
