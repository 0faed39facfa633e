//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `CompatError` enum per categorizzare gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `ToolNotFound`: ffprobe/ffmpeg non risolvibili (errore di configurazione)
//! - `ProbeTimeout` / `ProbeInvocation`: fallimento dell'analisi di un singolo file
//! - `TranscodeFailed`: fallimento della conversione di un singolo file
//! - `InvalidTransition`: transizione di stato non ammessa su una entry del catalogo
//! - `SessionBusy` / `EmptyCatalog`: comandi non eseguibili nello stato corrente
//! - `Validation`: errori di validazione configurazione
//!
//! Gli errori per singolo file non interrompono mai una fase: vengono
//! registrati sulla entry e conteggiati nel riepilogo finale.

use std::path::PathBuf;

/// Custom error types for scanning, probing and converting media
#[derive(thiserror::Error, Debug)]
pub enum CompatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found. Ensure FFmpeg is installed and in PATH.")]
    ToolNotFound(String),

    #[error("ffprobe timed out after {secs}s analyzing {}", path.display())]
    ProbeTimeout { path: PathBuf, secs: u64 },

    #[error("Error analyzing {}: {message}", path.display())]
    ProbeInvocation { path: PathBuf, message: String },

    #[error("Conversion failed: {0}")]
    TranscodeFailed(String),

    #[error("Invalid analysis transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Session is busy ({0})")]
    SessionBusy(String),

    #[error("Catalog is empty, scan a folder first")]
    EmptyCatalog,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl CompatError {
    /// True for failures that concern a single file rather than the whole session
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::ProbeTimeout { .. } | Self::ProbeInvocation { .. } | Self::TranscodeFailed(_)
        )
    }
}
