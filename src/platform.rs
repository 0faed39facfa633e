//! # Platform-specific utilities
//!
//! Questo modulo centralizza la conoscenza specifica delle piattaforme:
//! dove cercare i tool esterni quando non sono nel PATH e quali radici
//! proporre per una scansione completa dei dischi.

use std::path::PathBuf;

/// Well-known install locations for `tool` on the current platform, in
/// priority order. Only consulted when the tool is not on `PATH`.
pub fn tool_candidates(tool: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        windows_candidates(tool, std::env::var_os("LOCALAPPDATA").map(PathBuf::from))
    } else if cfg!(target_os = "macos") {
        macos_candidates(tool)
    } else {
        linux_candidates(tool)
    }
}

fn windows_candidates(tool: &str, local_app_data: Option<PathBuf>) -> Vec<PathBuf> {
    let exe = format!("{}.exe", tool);
    let mut candidates = Vec::new();

    if let Some(local) = local_app_data {
        candidates.push(local.join("Microsoft").join("WinGet").join("Links").join(&exe));
    }

    for dir in [
        r"C:\Program Files\ffmpeg\bin",
        r"C:\Program Files (x86)\ffmpeg\bin",
        r"C:\FFmpeg\bin",
        r"C:\tools\ffmpeg\bin",
    ] {
        candidates.push(PathBuf::from(dir).join(&exe));
    }

    candidates
}

fn macos_candidates(tool: &str) -> Vec<PathBuf> {
    ["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin"]
        .iter()
        .map(|dir| PathBuf::from(dir).join(tool))
        .collect()
}

fn linux_candidates(tool: &str) -> Vec<PathBuf> {
    ["/usr/bin", "/usr/local/bin", "/bin"]
        .iter()
        .map(|dir| PathBuf::from(dir).join(tool))
        .collect()
}

/// Roots worth offering for a whole-drive scan: existing drive letters on
/// Windows, common mount points elsewhere.
pub fn available_scan_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        ('A'..='Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter)))
            .filter(|drive| drive.exists())
            .collect()
    } else {
        ["/", "/home", "/mnt", "/media", "/Volumes"]
            .iter()
            .map(PathBuf::from)
            .filter(|point| point.exists())
            .collect()
    }
}

/// System information for debugging
pub fn system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        family: std::env::consts::FAMILY,
    }
}

/// System information structure
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
}

impl std::fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.os, self.arch, self.family)
    }
}
