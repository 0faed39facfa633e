//! # Session Events
//!
//! Eventi inviati dalla sessione al livello di presentazione (console, JSON).
//! L'ordine di emissione segue l'ordine del catalogo: scoperta in ordine di
//! attraversamento, analisi e conversione in ordine di catalogo.

use crate::session::catalog::CatalogEntry;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    FileDiscovered {
        path: PathBuf,
    },
    /// Snapshot of the entry at `index` after a state change
    EntryUpdated {
        index: usize,
        entry: CatalogEntry,
    },
    ScanFinished {
        count: usize,
        cancelled: bool,
    },
    ScanError {
        message: String,
    },
    AnalysisStarted {
        total: usize,
    },
    /// `total` counts the entries that received a verdict
    AnalysisFinished {
        compatible: usize,
        total: usize,
        failed: usize,
    },
    AnalysisError {
        message: String,
    },
    BatchProgress {
        current: usize,
        total: usize,
    },
    BatchFileFinished {
        name: String,
        success: bool,
    },
    BatchFinished {
        succeeded: usize,
        failed: usize,
    },
    BatchError {
        message: String,
    },
    TranscodeFinished {
        input: PathBuf,
        output: PathBuf,
        success: bool,
    },
}
