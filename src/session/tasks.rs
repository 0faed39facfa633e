//! # Session Tasks Module
//!
//! Worker per i singoli elementi del catalogo, separati dall'orchestratore.
//!
//! ## Responsabilità:
//! - `analyze_entry`: Unanalyzed → Analyzing → verdetto (o AnalysisFailed)
//! - `convert_entry`: calcolo del path libero + ricodifica di un file
//!
//! Il lock sul catalogo non viene mai tenuto durante l'invocazione dei tool
//! esterni. Nessun errore esce da questi passi: ogni fallimento diventa lo
//! stato della entry o un booleano.

use crate::{
    codec_probe::CodecProbe,
    session::{
        catalog::{Catalog, CatalogEntry, CompatibilityState},
        events::SessionEvent,
        path_resolver::PathResolver,
    },
    video_processor::VideoProcessor,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

/// Shared handles a phase needs for its per-item steps
#[derive(Clone)]
pub struct TaskContext {
    pub catalog: Arc<Mutex<Catalog>>,
    events: mpsc::Sender<SessionEvent>,
}

impl TaskContext {
    pub fn new(catalog: Arc<Mutex<Catalog>>, events: mpsc::Sender<SessionEvent>) -> Self {
        Self { catalog, events }
    }

    /// Deliver an event; a closed receiver only means nobody is listening
    pub async fn emit(&self, event: SessionEvent) {
        if self.events.send(event).await.is_err() {
            debug!("Event receiver closed, dropping event");
        }
    }

    /// Probe and classify the entry at `index`
    pub async fn analyze_entry(
        &self,
        probe: &CodecProbe,
        index: usize,
    ) -> Option<CompatibilityState> {
        let (path, snapshot) = {
            let mut catalog = self.catalog.lock().await;
            let entry = catalog.get_mut(index)?;
            if let Err(e) = entry.begin_analysis() {
                warn!("Skipping {}: {}", entry.path().display(), e);
                return None;
            }
            (entry.path().to_path_buf(), entry.clone())
        };
        self.emit(SessionEvent::EntryUpdated { index, entry: snapshot }).await;

        let result = probe.probe(&path).await;

        let (state, snapshot) = {
            let mut catalog = self.catalog.lock().await;
            let entry = catalog.get_mut(index)?;
            let outcome = match result {
                Ok(codecs) => entry.complete_analysis(codecs),
                Err(e) => {
                    if e.is_per_file() {
                        warn!("⚠ {}: {}", entry.display_name(), e);
                    } else {
                        error!("{}: {}", entry.display_name(), e);
                    }
                    entry
                        .fail_analysis(e.to_string())
                        .map(|_| CompatibilityState::AnalysisFailed)
                }
            };
            match outcome {
                Ok(state) => (state, entry.clone()),
                Err(e) => {
                    // il catalogo è stato svuotato o resettato nel frattempo
                    warn!("Discarding probe result for {}: {}", path.display(), e);
                    return None;
                }
            }
        };
        self.emit(SessionEvent::EntryUpdated { index, entry: snapshot }).await;
        Some(state)
    }
}

/// Convert one incompatible entry next to its source (or into `output_dir`)
pub async fn convert_entry(
    processor: &VideoProcessor,
    entry: &CatalogEntry,
    output_dir: Option<&Path>,
) -> bool {
    let output = match PathResolver::converted_output_path(entry.path(), output_dir) {
        Ok(output) => output,
        Err(e) => {
            error!("❌ {}: {}", entry.display_name(), e);
            return false;
        }
    };
    processor.transcode(entry.path(), &output).await
}
