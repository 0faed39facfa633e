//! # Video Processing Module
//!
//! Questo modulo ricodifica un file nel formato compatibile di riferimento.
//!
//! ## Responsabilità:
//! - Conversione video con FFmpeg (H.264 software + AAC)
//! - Sovrascrittura incondizionata della destinazione (`-y`)
//! - Nessun errore attraversa questo confine: il risultato è un semplice booleano
//!
//! ## Pipeline di conversione:
//! - Codec video: libx264
//! - Preset: configurabile (default medium)
//! - Codec audio: AAC
//! - Bitrate audio: configurabile (default 128k)
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = VideoProcessor::new(Some(ffmpeg_path), &config);
//! let ok = processor.transcode(&input, &output).await;
//! ```

use crate::config::Config;
use crate::error::CompatError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error, info};

pub const VIDEO_ENCODER: &str = "libx264";
pub const AUDIO_ENCODER: &str = "aac";

/// Re-encodes single files with ffmpeg
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    ffmpeg: Option<PathBuf>,
    preset: String,
    audio_bitrate: String,
    timeout: Option<Duration>,
}

impl VideoProcessor {
    /// `ffmpeg = None` means the tool could not be located; every
    /// transcode then reports failure.
    pub fn new(ffmpeg: Option<PathBuf>, config: &Config) -> Self {
        Self {
            ffmpeg,
            preset: config.video_preset.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            timeout: config.transcode_timeout(),
        }
    }

    /// Re-encode `input` into `output`, true iff ffmpeg exits with zero
    pub async fn transcode(&self, input: &Path, output: &Path) -> bool {
        match self.run_ffmpeg(input, output).await {
            Ok(()) => {
                info!(
                    "Successfully converted {} to {}",
                    input.display(),
                    output.display()
                );
                true
            }
            Err(e) => {
                error!("❌ {}: {}", input.display(), e);
                false
            }
        }
    }

    async fn run_ffmpeg(&self, input: &Path, output: &Path) -> Result<(), CompatError> {
        let ffmpeg = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| CompatError::ToolNotFound("FFmpeg".to_string()))?;

        let mut cmd = Command::new(ffmpeg);
        cmd.args(self.transcode_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            "🎬 Converting {} (preset: {}, audio: {} {})",
            input.display(),
            self.preset,
            AUDIO_ENCODER,
            self.audio_bitrate
        );
        let start_time = Instant::now();

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| {
                    CompatError::TranscodeFailed(format!("timed out after {}s", limit.as_secs()))
                })?,
            None => cmd.output().await,
        };

        let output_status = result.map_err(|e| {
            CompatError::TranscodeFailed(format!("failed to execute {}: {}", ffmpeg.display(), e))
        })?;

        let duration = start_time.elapsed();
        if !output_status.status.success() {
            return Err(CompatError::TranscodeFailed(format!(
                "ffmpeg exited with {} after {:.1}s: {}",
                output_status.status,
                duration.as_secs_f64(),
                String::from_utf8_lossy(&output_status.stderr).trim()
            )));
        }

        debug!("✅ Conversion completed in {:.1}s", duration.as_secs_f64());
        Ok(())
    }

    /// `-i <input> -c:v libx264 -preset <preset> -c:a aac -b:a <bitrate> -y <output>`
    pub fn transcode_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
        for arg in [
            "-c:v",
            VIDEO_ENCODER,
            "-preset",
            self.preset.as_str(),
            "-c:a",
            AUDIO_ENCODER,
            "-b:a",
            self.audio_bitrate.as_str(),
            "-y",
        ] {
            args.push(arg.into());
        }
        args.push(output.into());
        args
    }
}

/// Output name suggested for a single-file conversion: `<stem>_converted.mp4`
/// next to the input
pub fn suggested_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_converted.mp4", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_args_match_contract() {
        let processor = VideoProcessor::new(None, &Config::default());
        let args = processor.transcode_args(Path::new("/in/a.mkv"), Path::new("/out/a_converted.mkv"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-i", "/in/a.mkv", "-c:v", "libx264", "-preset", "medium", "-c:a", "aac", "-b:a",
                "128k", "-y", "/out/a_converted.mkv"
            ]
        );
    }

    #[test]
    fn test_suggested_output_path() {
        assert_eq!(
            suggested_output_path(Path::new("/movies/film.avi")),
            PathBuf::from("/movies/film_converted.mp4")
        );
    }

    #[tokio::test]
    async fn test_missing_tool_returns_false() {
        let processor = VideoProcessor::new(None, &Config::default());
        assert!(!processor.transcode(Path::new("a.mkv"), Path::new("b.mkv")).await);

        let processor = VideoProcessor::new(Some(PathBuf::from("/nonexistent/ffmpeg_123")), &Config::default());
        assert!(!processor.transcode(Path::new("a.mkv"), Path::new("b.mkv")).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_decides_success() {
        use crate::test_support::fake_ffmpeg;
        let temp_dir = tempfile::TempDir::new().unwrap();
        let processor = VideoProcessor::new(Some(fake_ffmpeg(temp_dir.path())), &Config::default());

        let output = temp_dir.path().join("good_converted.mkv");
        assert!(processor.transcode(&temp_dir.path().join("good.mkv"), &output).await);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("-preset medium"));
        assert!(written.contains("-b:a 128k"));

        let failed = temp_dir.path().join("broken_converted.mkv");
        assert!(!processor.transcode(&temp_dir.path().join("broken.mkv"), &failed).await);
        assert!(!failed.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        use crate::test_support::write_script;
        let temp_dir = tempfile::TempDir::new().unwrap();
        let slow = write_script(temp_dir.path(), "ffmpeg", "exec sleep 5");
        let config = Config {
            transcode_timeout_secs: Some(1),
            ..Default::default()
        };
        let processor = VideoProcessor::new(Some(slow), &config);
        assert!(!processor.transcode(Path::new("a.mkv"), Path::new("b.mkv")).await);
    }
}
