//! # Tool Path Resolver
//!
//! This module finds the external media tools:
//! - explicit override paths (configuration, tests)
//! - the executable search path (`PATH`)
//! - well-known install directories per platform (ffprobe only), each
//!   verified with `-version` before being accepted
//!
//! Every lookup runs at most once per resolver; the binary keeps a single
//! resolver for the whole process and shares it by reference.

use crate::config::Config;
use crate::error::CompatError;
use crate::platform;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub const FFPROBE: &str = "ffprobe";
pub const FFMPEG: &str = "ffmpeg";

/// Resolves and memoizes the locations of ffprobe and ffmpeg
pub struct ToolPathResolver {
    ffprobe_override: Option<PathBuf>,
    ffmpeg_override: Option<PathBuf>,
    verify_timeout: Duration,
    ffprobe: OnceCell<Option<PathBuf>>,
    ffmpeg: OnceCell<Option<PathBuf>>,
}

impl ToolPathResolver {
    /// Create a resolver honouring the override paths from `config`
    pub fn new(config: &Config) -> Self {
        Self {
            ffprobe_override: config.ffprobe_path.clone(),
            ffmpeg_override: config.ffmpeg_path.clone(),
            verify_timeout: config.verify_timeout(),
            ffprobe: OnceCell::new(),
            ffmpeg: OnceCell::new(),
        }
    }

    /// Resolver with fixed locations; `None` means the tool is unavailable.
    /// No discovery ever happens.
    pub fn with_locations(ffprobe: Option<PathBuf>, ffmpeg: Option<PathBuf>) -> Self {
        Self {
            ffprobe_override: None,
            ffmpeg_override: None,
            verify_timeout: Duration::from_secs(3),
            ffprobe: OnceCell::new_with(Some(ffprobe)),
            ffmpeg: OnceCell::new_with(Some(ffmpeg)),
        }
    }

    /// Location of ffprobe, resolved on first use
    pub async fn ffprobe(&self) -> Result<PathBuf, CompatError> {
        self.ffprobe
            .get_or_init(|| self.locate_ffprobe())
            .await
            .clone()
            .ok_or_else(|| CompatError::ToolNotFound(FFPROBE.to_string()))
    }

    /// Location of ffmpeg, resolved on first use (search path only)
    pub async fn ffmpeg(&self) -> Result<PathBuf, CompatError> {
        self.ffmpeg
            .get_or_init(|| async { self.locate_ffmpeg() })
            .await
            .clone()
            .ok_or_else(|| CompatError::ToolNotFound(FFMPEG.to_string()))
    }

    async fn locate_ffprobe(&self) -> Option<PathBuf> {
        if let Some(path) = override_if_present(self.ffprobe_override.as_deref()) {
            info!("Using configured ffprobe: {}", path.display());
            return Some(path);
        }

        if let Ok(path) = which::which(FFPROBE) {
            info!("Found ffprobe in PATH: {}", path.display());
            return Some(path);
        }

        for candidate in platform::tool_candidates(FFPROBE) {
            debug!("Checking ffprobe candidate: {}", candidate.display());
            if verify_tool(&candidate, self.verify_timeout).await {
                info!("Found ffprobe at: {}", candidate.display());
                return Some(candidate);
            }
        }

        error!("ffprobe not found in PATH or common locations");
        None
    }

    fn locate_ffmpeg(&self) -> Option<PathBuf> {
        if let Some(path) = override_if_present(self.ffmpeg_override.as_deref()) {
            info!("Using configured ffmpeg: {}", path.display());
            return Some(path);
        }

        match which::which(FFMPEG) {
            Ok(path) => {
                info!("Found ffmpeg in PATH: {}", path.display());
                Some(path)
            }
            Err(_) => {
                error!("FFmpeg not found in PATH");
                None
            }
        }
    }

    /// Human readable availability report for both tools
    pub async fn tools_report(&self) -> String {
        let mut report = String::from("Tool availability:\n");

        for (tool, result) in [(FFPROBE, self.ffprobe().await), (FFMPEG, self.ffmpeg().await)] {
            match result {
                Ok(path) => report.push_str(&format!("  ✅ {} -> {}\n", tool, path.display())),
                Err(_) => report.push_str(&format!(
                    "  ❌ {} (install with: {})\n",
                    tool,
                    install_instructions()
                )),
            }
        }

        report.push_str(&format!("\nPlatform: {}\n", platform::system_info()));
        report
    }
}

fn override_if_present(path: Option<&Path>) -> Option<PathBuf> {
    let path = path?;
    if path.exists() {
        Some(path.to_path_buf())
    } else {
        debug!("Configured tool path does not exist: {}", path.display());
        None
    }
}

/// Accept a candidate only if `-version` exits with zero within `timeout`
async fn verify_tool(path: &Path, timeout: Duration) -> bool {
    let mut cmd = Command::new(path);
    cmd.arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.status()).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(e)) => {
            debug!("Candidate {} failed to start: {}", path.display(), e);
            false
        }
        Err(_) => {
            debug!("Candidate {} timed out", path.display());
            false
        }
    }
}

fn install_instructions() -> &'static str {
    if cfg!(windows) {
        "winget install ffmpeg"
    } else if cfg!(target_os = "macos") {
        "brew install ffmpeg"
    } else {
        "sudo apt-get install ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_script;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fixed_locations_skip_discovery() {
        let resolver = ToolPathResolver::with_locations(None, Some(PathBuf::from("/opt/ffmpeg")));

        let err = resolver.ffprobe().await.unwrap_err();
        assert!(matches!(err, CompatError::ToolNotFound(ref t) if t == "ffprobe"));
        assert_eq!(resolver.ffmpeg().await.unwrap(), PathBuf::from("/opt/ffmpeg"));
    }

    #[tokio::test]
    async fn test_override_path_is_used_and_memoized() {
        let temp_dir = TempDir::new().unwrap();
        let fake = temp_dir.path().join("my-ffprobe");
        std::fs::write(&fake, "").unwrap();

        let config = Config {
            ffprobe_path: Some(fake.clone()),
            ..Default::default()
        };
        let resolver = ToolPathResolver::new(&config);
        assert_eq!(resolver.ffprobe().await.unwrap(), fake);

        // il risultato resta valido anche se il file sparisce
        std::fs::remove_file(&fake).unwrap();
        assert_eq!(resolver.ffprobe().await.unwrap(), fake);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verify_tool_requires_zero_exit() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_script(temp_dir.path(), "good", "exit 0");
        let bad = write_script(temp_dir.path(), "bad", "exit 1");
        let slow = write_script(temp_dir.path(), "slow", "exec sleep 5");

        let timeout = Duration::from_millis(500);
        assert!(verify_tool(&good, timeout).await);
        assert!(!verify_tool(&bad, timeout).await);
        assert!(!verify_tool(&slow, timeout).await);
        assert!(!verify_tool(&temp_dir.path().join("missing"), timeout).await);
    }

    #[tokio::test]
    async fn test_tools_report_lists_both_tools() {
        let resolver = ToolPathResolver::with_locations(Some(PathBuf::from("/usr/bin/ffprobe")), None);
        let report = resolver.tools_report().await;
        assert!(report.contains("✅ ffprobe -> /usr/bin/ffprobe"));
        assert!(report.contains("❌ ffmpeg"));
    }
}
