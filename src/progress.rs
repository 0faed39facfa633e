//! # Progress Reporting Module
//!
//! Questo modulo trasforma gli eventi della sessione in feedback da console.
//!
//! ## Responsabilità:
//! - Spinner durante lo scan (numero di file trovati)
//! - Progress bar con `indicatif` per analisi e conversione batch
//! - Tabella finale dei risultati con simbolo ✓/✗ e colonna dettagli
//! - Elenco dei file la cui conversione è fallita
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [========================>---------------] 12/20 (60%) ✗ holiday.mkv
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut reporter = ConsoleReporter::new();
//! while let Some(event) = rx.recv().await {
//!     reporter.handle(&event);
//! }
//! println!("{}", format_results_table(&session.catalog_snapshot().await));
//! ```

use crate::compatibility::compatibility_symbol;
use crate::session::{CatalogEntry, CompatibilityState, SessionEvent};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Builds the progress bars used by the console output
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress bar of `total` steps
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    fn hidden(self) -> Self {
        self.bar.set_draw_target(ProgressDrawTarget::hidden());
        self
    }

    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

/// Console presentation of a running session
pub struct ConsoleReporter {
    bar: Option<ProgressManager>,
    discovered: usize,
    failed_files: Vec<String>,
    errors: Vec<String>,
    draw: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            bar: None,
            discovered: 0,
            failed_files: Vec::new(),
            errors: Vec::new(),
            draw: true,
        }
    }

    /// Reporter whose bars are never drawn
    pub fn quiet() -> Self {
        Self {
            draw: false,
            ..Self::new()
        }
    }

    /// Names of files whose batch conversion failed
    pub fn failed_files(&self) -> &[String] {
        &self.failed_files
    }

    /// Phase-level error messages seen so far
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn handle(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::FileDiscovered { path } => {
                self.discovered += 1;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let message = format!("Found {} video files... {}", self.discovered, name);
                match &self.bar {
                    Some(bar) => bar.set_message(&message),
                    None => self.bar = Some(self.make(ProgressManager::spinner(&message))),
                }
            }
            SessionEvent::ScanFinished { count, cancelled } => {
                let message = if *cancelled {
                    format!("⏹ Scan cancelled, {} video files found", count)
                } else {
                    format!("🔍 Found {} video files", count)
                };
                self.finish_bar(&message);
                self.discovered = 0;
            }
            SessionEvent::AnalysisStarted { total } => {
                self.finish_bar("");
                self.bar = Some(self.make(ProgressManager::new(*total as u64)));
            }
            SessionEvent::EntryUpdated { entry, .. } => self.entry_updated(entry),
            SessionEvent::AnalysisFinished { compatible, total, failed } => {
                let mut message = format!("📊 Compatible: {}/{}", compatible, total);
                if *failed > 0 {
                    message.push_str(&format!(" | Failed to analyze: {}", failed));
                }
                self.finish_bar(&message);
            }
            SessionEvent::BatchProgress { current, total } => {
                if self.bar.is_none() {
                    self.bar = Some(self.make(ProgressManager::new(*total as u64)));
                }
                if let Some(bar) = &self.bar {
                    bar.set_message(&format!("Converting file {} of {}...", current, total));
                }
            }
            SessionEvent::BatchFileFinished { name, success } => {
                if !success {
                    self.failed_files.push(name.clone());
                }
                if let Some(bar) = &self.bar {
                    let symbol = if *success { "✅" } else { "❌" };
                    bar.update(&format!("{} {}", symbol, name));
                }
            }
            SessionEvent::BatchFinished { succeeded, failed } => {
                self.finish_bar(&format!(
                    "🎬 Batch conversion complete: {} succeeded, {} failed",
                    succeeded, failed
                ));
            }
            SessionEvent::ScanError { message }
            | SessionEvent::AnalysisError { message }
            | SessionEvent::BatchError { message } => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon("");
                }
                if self.draw {
                    eprintln!("❌ {}", message);
                }
                self.errors.push(message.clone());
            }
            SessionEvent::TranscodeFinished { input, output, success } => {
                if !success {
                    self.failed_files.push(input.display().to_string());
                }
                if self.draw {
                    if *success {
                        println!("✅ Converted {} -> {}", input.display(), output.display());
                    } else {
                        println!("❌ Conversion failed: {}", input.display());
                    }
                }
            }
        }
    }

    fn entry_updated(&mut self, entry: &CatalogEntry) {
        let Some(bar) = &self.bar else {
            return;
        };
        let state = entry.state();
        if state == CompatibilityState::Analyzing {
            bar.set_message(&format!("Analyzing {}", entry.display_name()));
        } else if state.is_final() {
            let symbol = match state {
                CompatibilityState::AnalysisFailed => "⚠",
                _ => compatibility_symbol(state == CompatibilityState::Compatible),
            };
            bar.update(&format!("{} {}", symbol, entry.display_name()));
        }
    }

    fn make(&self, bar: ProgressManager) -> ProgressManager {
        if self.draw {
            bar
        } else {
            bar.hidden()
        }
    }

    fn finish_bar(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish(message);
        } else if self.draw && !message.is_empty() {
            println!("{}", message);
        }
    }
}

/// Results table: symbol, file, video codec, audio codec, details
pub fn format_results_table(entries: &[CatalogEntry]) -> String {
    const HEADERS: [&str; 5] = ["", "File", "Video", "Audio", "Details"];

    let rows: Vec<[String; 5]> = entries
        .iter()
        .map(|entry| {
            let symbol = match entry.state() {
                CompatibilityState::Compatible => compatibility_symbol(true),
                CompatibilityState::Incompatible => compatibility_symbol(false),
                CompatibilityState::AnalysisFailed => "⚠",
                CompatibilityState::Unanalyzed | CompatibilityState::Analyzing => "·",
            };
            [
                symbol.to_string(),
                entry.display_name().to_string(),
                entry.video_codec().unwrap_or("-").to_string(),
                entry.audio_codec().unwrap_or("-").to_string(),
                entry.details().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: [&str; 5]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut table = render(HEADERS);
    table.push('\n');
    let separator_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    table.push_str(&"-".repeat(separator_len));
    for row in &rows {
        table.push('\n');
        table.push_str(&render([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
        ]));
    }
    table
}
