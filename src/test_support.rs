//! Fixtures shared by the unit tests: fake ffprobe/ffmpeg executables.

use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake ffprobe: codecs are chosen from the file name, files containing
/// `hang` never answer in time.
#[cfg(unix)]
pub fn fake_ffprobe(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ffprobe",
        r#"case "$1" in
  *hang*) exec sleep 5 ;;
  *h264_aac*)
    echo "ffprobe version 6.0" >&2
    echo "    Stream #0:0(und): Video: h264 (High) (avc1 / 0x31637661), yuv420p, 1920x1080" >&2
    echo "    Stream #0:1(und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo" >&2 ;;
  *hevc_vorbis*)
    echo "    Stream #0:0: Video: hevc (Main), yuv420p, 1280x960"
    echo "    Stream #0:1: Audio: vorbis, 48000 Hz, stereo" ;;
  *)
    echo "    Stream #0:0: Video: vp9 (Profile 0), yuv420p" >&2
    echo "    Stream #0:1: Audio: opus, 48000 Hz, stereo" >&2 ;;
esac"#,
    )
}

/// Fake ffmpeg: writes the last argument as output, fails for inputs
/// containing `broken`, takes a second for inputs containing `slow`.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ffmpeg",
        r#"case "$2" in
  *broken*) echo "Invalid data found when processing input" >&2; exit 1 ;;
  *slow*) sleep 1 ;;
esac
for last; do :; done
echo "$*" > "$last""#,
    )
}

/// Create an empty file, with parents
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}
