//! # Media Compat Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore della libreria
//! - `file_manager`: Discovery dei file video su disco
//! - `codec_probe`: Estrazione dei codec con ffprobe
//! - `tool_resolver`: Ricerca di ffprobe/ffmpeg
//! - `platform`: Cartelle di installazione e radici di scansione per sistema operativo
//! - `compatibility`: Regole di compatibilità con il dispositivo di riproduzione
//! - `video_processor`: Ricodifica con ffmpeg
//! - `session`: Catalogo e fasi in background (scan, analisi, conversione)
//! - `progress`: Progress bar e tabella dei risultati
//! - `json_output`: Output JSON a righe
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_compat::{Config, SessionOrchestrator, ToolPathResolver};
//!
//! let config = Arc::new(Config::default());
//! let tools = Arc::new(ToolPathResolver::new(&config));
//! let (tx, rx) = tokio::sync::mpsc::channel(config.event_buffer);
//! let session = SessionOrchestrator::new(config, tools, tx);
//! session.start_scan(&path).await?.await?;
//! ```

pub mod codec_probe;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod platform;
pub mod progress;
pub mod session;
pub mod tool_resolver;
pub mod video_processor;

#[cfg(test)]
mod test_support;

pub use codec_probe::{CodecInfo, CodecProbe};
pub use compatibility::Verdict;
pub use config::Config;
pub use error::CompatError;
pub use file_manager::FileManager;
pub use session::{CatalogEntry, CompatibilityState, SessionEvent, SessionOrchestrator, SessionPhase};
pub use tool_resolver::ToolPathResolver;
pub use video_processor::VideoProcessor;
