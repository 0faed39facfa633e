//! # Catalog Module
//!
//! Catalogo in memoria dei file scoperti nella sessione corrente.
//!
//! ## Strutture dati:
//! - `CatalogEntry`: un file video con codec e verdetto di compatibilità
//! - `CompatibilityState`: stato dell'analisi della entry
//! - `Catalog`: collezione ordinata, un path compare al massimo una volta
//!
//! ## Ciclo di vita di una entry:
//! `Unanalyzed → Analyzing → {Compatible | Incompatible | AnalysisFailed}`
//!
//! I codec vengono scritti solo mentre la entry è in `Analyzing`; la
//! motivazione è presente solo per `Incompatible`, l'errore solo per
//! `AnalysisFailed`. Non c'è persistenza: il catalogo vive quanto la sessione.

use crate::codec_probe::CodecInfo;
use crate::compatibility::{self, Verdict};
use crate::error::CompatError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Analysis state of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityState {
    Unanalyzed,
    Analyzing,
    Compatible,
    Incompatible,
    AnalysisFailed,
}

impl CompatibilityState {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Compatible | Self::Incompatible | Self::AnalysisFailed
        )
    }
}

impl fmt::Display for CompatibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unanalyzed => "unanalyzed",
            Self::Analyzing => "analyzing",
            Self::Compatible => "compatible",
            Self::Incompatible => "incompatible",
            Self::AnalysisFailed => "analysis failed",
        };
        f.write_str(label)
    }
}

/// One discovered media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    path: PathBuf,
    display_name: String,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    state: CompatibilityState,
    incompatibility_reason: Option<String>,
    last_error: Option<String>,
}

impl CatalogEntry {
    pub fn new(path: PathBuf) -> Self {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            path,
            display_name,
            video_codec: None,
            audio_codec: None,
            state: CompatibilityState::Unanalyzed,
            incompatibility_reason: None,
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn video_codec(&self) -> Option<&str> {
        self.video_codec.as_deref()
    }

    pub fn audio_codec(&self) -> Option<&str> {
        self.audio_codec.as_deref()
    }

    pub fn state(&self) -> CompatibilityState {
        self.state
    }

    pub fn incompatibility_reason(&self) -> Option<&str> {
        self.incompatibility_reason.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Text for the details column of a results table
    pub fn details(&self) -> &str {
        match self.state {
            CompatibilityState::Compatible => "Compatible",
            CompatibilityState::Incompatible => self.incompatibility_reason().unwrap_or_default(),
            CompatibilityState::AnalysisFailed => self.last_error().unwrap_or_default(),
            CompatibilityState::Analyzing => "Analyzing...",
            CompatibilityState::Unanalyzed => "",
        }
    }

    /// Unanalyzed → Analyzing
    pub fn begin_analysis(&mut self) -> Result<(), CompatError> {
        self.transition(CompatibilityState::Unanalyzed, CompatibilityState::Analyzing)
    }

    /// Analyzing → Compatible | Incompatible, recording the probed codecs
    pub fn complete_analysis(&mut self, codecs: CodecInfo) -> Result<CompatibilityState, CompatError> {
        let verdict = compatibility::evaluate(&codecs.video_codec, &codecs.audio_codec);
        let next = match verdict {
            Verdict::Compatible => CompatibilityState::Compatible,
            Verdict::Incompatible(_) => CompatibilityState::Incompatible,
        };
        self.transition(CompatibilityState::Analyzing, next)?;

        self.video_codec = Some(codecs.video_codec);
        self.audio_codec = Some(codecs.audio_codec);
        if let Verdict::Incompatible(reason) = verdict {
            self.incompatibility_reason = Some(reason);
        }
        Ok(next)
    }

    /// Analyzing → AnalysisFailed
    pub fn fail_analysis(&mut self, message: impl Into<String>) -> Result<(), CompatError> {
        self.transition(CompatibilityState::Analyzing, CompatibilityState::AnalysisFailed)?;
        self.last_error = Some(message.into());
        Ok(())
    }

    /// Back to Unanalyzed, clearing every probe result
    pub fn reset(&mut self) {
        self.video_codec = None;
        self.audio_codec = None;
        self.state = CompatibilityState::Unanalyzed;
        self.incompatibility_reason = None;
        self.last_error = None;
    }

    fn transition(
        &mut self,
        expected: CompatibilityState,
        next: CompatibilityState,
    ) -> Result<(), CompatError> {
        if self.state != expected {
            return Err(CompatError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Counts by final state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub compatible: usize,
    pub incompatible: usize,
    pub failed: usize,
    pub pending: usize,
}

impl CatalogSummary {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.state() {
                CompatibilityState::Compatible => summary.compatible += 1,
                CompatibilityState::Incompatible => summary.incompatible += 1,
                CompatibilityState::AnalysisFailed => summary.failed += 1,
                CompatibilityState::Unanalyzed | CompatibilityState::Analyzing => {
                    summary.pending += 1
                }
            }
        }
        summary
    }

    /// Entries that received a verdict
    pub fn analyzed(&self) -> usize {
        self.compatible + self.incompatible
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Files: {} | Compatible: {}/{} | Incompatible: {} | Failed: {}",
            self.total,
            self.compatible,
            self.analyzed(),
            self.incompatible,
            self.failed
        )
    }
}

/// Ordered, duplicate-free collection of entries
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    paths: HashSet<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` as a new Unanalyzed entry; returns its index, or `None`
    /// if the path is already catalogued
    pub fn insert(&mut self, path: PathBuf) -> Option<usize> {
        if !self.paths.insert(path.clone()) {
            return None;
        }
        self.entries.push(CatalogEntry::new(path));
        Some(self.entries.len() - 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn reset_all(&mut self) {
        self.entries.iter_mut().for_each(CatalogEntry::reset);
    }

    /// Entries currently Incompatible, in catalog order
    pub fn incompatible(&self) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.state() == CompatibilityState::Incompatible)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary::from_entries(&self.entries)
    }
}
