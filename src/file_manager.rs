//! # File Management Module
//!
//! Questo modulo gestisce la discovery ricorsiva dei file video.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di file video in una directory
//! - Determinazione formato file tramite estensione (case-insensitive)
//! - Esclusione di directory nascoste (`.qualcosa`) e metadata macOS (`._file`)
//! - Ordine di visita deterministico: in ogni directory prima i file, poi le
//!   sottodirectory, entrambi per nome
//! - I symlink a file sono inclusi; i symlink a directory non vengono seguiti
//!
//! ## Gestione errori:
//! - Root inesistente o non directory: sequenza vuota, mai un errore
//! - Directory non leggibile (permission denied): saltata, si continua coi fratelli
//! - Qualunque altro errore: il walk si ferma ma i risultati trovati restano
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::scan_folder(&root, |path| {
//!     println!("found {}", path.display());
//!     ControlFlow::Continue(())
//! });
//! ```

use std::io::ErrorKind;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Known video file extensions, lowercase without the leading dot
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "m4v", "mpg", "mpeg", "3gp", "ogv", "ts",
    "m2ts", "mts", "vob", "f4v", "asf", "rm", "rmvb", "m3u8",
];

/// Manages media discovery on disk
pub struct FileManager;

impl FileManager {
    /// Lazily walk `root` yielding absolute paths of video files.
    ///
    /// The walk is not restartable: call again to re-walk from scratch.
    pub fn walk_media(root: &Path) -> MediaWalk {
        let root = match root.canonicalize() {
            Ok(root) if root.is_dir() => root,
            _ => {
                debug!("Scan root missing or not a directory: {}", root.display());
                return MediaWalk { inner: None };
            }
        };

        // files of a directory come before any of its subdirectories
        let inner = WalkDir::new(root)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(|entry| !is_hidden_dir(entry));

        MediaWalk { inner: Some(Box::new(inner)) }
    }

    /// Walk `root`, invoking `on_file` for every accepted path before it is
    /// collected. Returning `ControlFlow::Break` from the callback stops the
    /// walk; the path that triggered it is not collected.
    pub fn scan_folder<F>(root: &Path, mut on_file: F) -> Vec<PathBuf>
    where
        F: FnMut(&Path) -> ControlFlow<()>,
    {
        let mut video_files = Vec::new();

        for path in Self::walk_media(root) {
            if on_file(&path).is_break() {
                debug!("Scan stopped by caller after {} files", video_files.len());
                break;
            }
            video_files.push(path);
        }

        video_files
    }

    /// Check if a file is a video based on its extension.
    ///
    /// The extension is whatever follows the last dot of the file name, so a
    /// bare `.mp4` counts too.
    pub fn is_video(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// macOS resource-fork files (`._name`)
    pub fn is_metadata_file(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with("._"))
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Lazy sequence of video files produced by [`FileManager::walk_media`]
pub struct MediaWalk {
    inner: Option<Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>>,
}

impl Iterator for MediaWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let kind = err.io_error().map(|e| e.kind());
                    if kind == Some(ErrorKind::PermissionDenied) {
                        debug!("Skipping unreadable path: {}", err);
                        continue;
                    }
                    warn!("Scan aborted: {}", err);
                    self.inner = None;
                    return None;
                }
            };

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let path = entry.path();
            if FileManager::is_metadata_file(path) || !FileManager::is_video(path) {
                continue;
            }

            return Some(entry.into_path());
        }
    }
}
