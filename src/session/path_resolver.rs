//! # Path Resolution Module
//!
//! Calcolo dei path di output per la conversione batch.
//!
//! ## Regola delle collisioni:
//! - nome base: `<stem>_converted.<ext>` (estensione originale)
//! - se esiste già: `<stem>_converted_1.<ext>`, `_converted_2`, ... fino al primo libero
//! - il calcolo è indipendente per ogni file, nessun contatore condiviso
//! - cartella: quella del file sorgente, oppure la cartella di output indicata

use crate::error::CompatError;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONVERTED_SUFFIX: &str = "_converted";

/// Computes output paths for converted files
pub struct PathResolver;

impl PathResolver {
    /// First free output path for `input`
    pub fn converted_output_path(
        input: &Path,
        output_dir: Option<&Path>,
    ) -> Result<PathBuf, CompatError> {
        let stem = input
            .file_stem()
            .ok_or_else(|| {
                CompatError::Validation(format!("Invalid file name: {}", input.display()))
            })?
            .to_string_lossy();
        let extension = input.extension().map(|ext| ext.to_string_lossy());

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().unwrap_or(Path::new("")).to_path_buf(),
        };

        let file_name = |counter: usize| {
            let base = if counter == 0 {
                format!("{}{}", stem, CONVERTED_SUFFIX)
            } else {
                format!("{}{}_{}", stem, CONVERTED_SUFFIX, counter)
            };
            match &extension {
                Some(ext) => format!("{}.{}", base, ext),
                None => base,
            }
        };

        let mut counter = 0;
        let mut candidate = dir.join(file_name(counter));
        while candidate.exists() {
            counter += 1;
            candidate = dir.join(file_name(counter));
        }

        debug!("Resolved output path: {} -> {}", input.display(), candidate.display());
        Ok(candidate)
    }

    /// Crea la cartella di output se necessario
    pub async fn ensure_output_dir(dir: &Path) -> Result<(), CompatError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(())
    }
}
