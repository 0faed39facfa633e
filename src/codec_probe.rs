//! # Codec Probe Module
//!
//! Estrae la coppia (codec video, codec audio) di un file invocando ffprobe.
//!
//! ## Responsabilità:
//! - Invocazione `ffprobe <file>` con timeout (default 10s)
//! - Lettura combinata di stdout + stderr (ffprobe scrive su entrambi a seconda della versione)
//! - Estrazione dei codec tramite pattern sul testo, non parsing strutturato
//! - Pulizia dei nomi (suffissi tra parentesi, alias `h.264`, `ac-3`, `e-ac-3`)
//!
//! ## Formato atteso:
//! ```text
//!     Stream #0:0(und): Video: h264 (High) (avc1 / 0x31637661), yuv420p, 1920x1080
//!     Stream #0:1(und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo
//! ```
//!
//! Una traccia assente produce `"Unknown"`, non un errore: un file può
//! legittimamente non avere audio.

use crate::error::CompatError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Placeholder for a track the probe output does not describe
pub const UNKNOWN_CODEC: &str = "Unknown";

static VIDEO_STREAM: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Stream\s+#\d+:\d+.*?Video:\s+([^\s,\[]+)").ok());

static AUDIO_STREAM: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"Stream\s+#\d+:\d+.*?Audio:\s+([^\s,\[]+)").ok());

/// Codec names reported by the tool, normalized for display
const CODEC_ALIASES: &[(&str, &str)] = &[
    ("h.264", "h264"),
    ("aac", "aac"),
    ("mp3", "mp3"),
    ("ac-3", "ac3"),
    ("e-ac-3", "eac3"),
    ("flac", "flac"),
    ("pcm", "pcm"),
];

/// Video/audio codec pair of one media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecInfo {
    pub video_codec: String,
    pub audio_codec: String,
}

/// Runs ffprobe against single files
#[derive(Debug, Clone)]
pub struct CodecProbe {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl CodecProbe {
    pub fn new(ffprobe: PathBuf, timeout: Duration) -> Self {
        Self { ffprobe, timeout }
    }

    /// Probe one file. Only a timeout or a failure to run the tool is an
    /// error; unrecognized output yields `Unknown` codecs.
    pub async fn probe(&self, path: &Path) -> Result<CodecInfo, CompatError> {
        debug!("🔍 Probing {}", path.display());

        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Error analyzing {}: {}", path.display(), e);
                return Err(CompatError::ProbeInvocation {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                error!("FFprobe timeout analyzing {}", path.display());
                return Err(CompatError::ProbeTimeout {
                    path: path.to_path_buf(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let info = extract_codecs(&text);
        info!(
            "Analyzed {}: video={}, audio={}",
            path.display(),
            info.video_codec,
            info.audio_codec
        );
        Ok(info)
    }
}

/// Pull the first video and audio codec tokens out of ffprobe's text output
pub fn extract_codecs(output: &str) -> CodecInfo {
    CodecInfo {
        video_codec: first_codec(&VIDEO_STREAM, output),
        audio_codec: first_codec(&AUDIO_STREAM, output),
    }
}

fn first_codec(pattern: &Option<Regex>, output: &str) -> String {
    pattern
        .as_ref()
        .and_then(|re| re.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| clean_codec_name(m.as_str()))
        .unwrap_or_else(|| UNKNOWN_CODEC.to_string())
}

/// Strip any parenthesized suffix and apply the alias table
pub fn clean_codec_name(raw: &str) -> String {
    let codec = raw.split('(').next().unwrap_or_default().trim();
    if codec.is_empty() {
        return UNKNOWN_CODEC.to_string();
    }

    let lower = codec.to_lowercase();
    CODEC_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| codec.to_string())
}
