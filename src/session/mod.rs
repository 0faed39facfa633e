//! # Session Module
//!
//! Sessione di analisi separata in sottomoduli:
//! - `orchestrator`: fasi in background (scan, analisi, conversione batch)
//! - `catalog`: catalogo in memoria e ciclo di vita delle entry
//! - `events`: eventi verso il livello di presentazione
//! - `tasks`: worker per le singole entry
//! - `path_resolver`: path di output e gestione delle collisioni

pub mod catalog;
pub mod events;
pub mod orchestrator;
pub mod path_resolver;
pub mod tasks;

pub use catalog::{Catalog, CatalogEntry, CatalogSummary, CompatibilityState};
pub use events::SessionEvent;
pub use orchestrator::{SessionOrchestrator, SessionPhase};
pub use path_resolver::PathResolver;
