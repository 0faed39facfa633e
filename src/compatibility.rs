//! # Compatibility Policy Module
//!
//! Regole fisse di compatibilità per la riproduzione su TV.
//!
//! ## Responsabilità:
//! - Normalizzazione nomi codec (lowercase, alias degli encoder)
//! - Verdetto di compatibilità per una coppia (video, audio)
//! - Motivazione leggibile quando la coppia non è compatibile
//!
//! ## Regole:
//! - **Video**: compatibile se il nome normalizzato *contiene* una famiglia
//!   H.264/H.265 (`h264`, `avc`, `h.264`, `h265`, `hevc`, `h.265`)
//! - **Audio**: compatibile se il nome normalizzato è *esattamente* uno tra
//!   `aac`, `mp3`, `ac3`, `eac3`, `flac`, `pcm`
//!
//! Il match per sottostringa sul video tollera nomi qualificati dagli encoder;
//! gli identificativi audio sono token stabili e vanno confrontati esattamente.
//!
//! Nessun I/O: tutte le funzioni sono pure e deterministiche.

/// Video codec families playable by the target device
pub const COMPATIBLE_VIDEO_CODECS: &[&str] = &["h264", "avc", "h.264", "h265", "hevc", "h.265"];

/// Audio codecs playable by the target device
pub const COMPATIBLE_AUDIO_CODECS: &[&str] = &["aac", "mp3", "ac3", "eac3", "flac", "pcm"];

/// Encoder library names mapped to the codec they produce
const ENCODER_ALIASES: &[(&str, &str)] = &[
    ("mpeg2video", "mpeg2"),
    ("libx264", "h264"),
    ("libx265", "h265"),
    ("libfdk_aac", "aac"),
];

/// Result of evaluating a codec pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Compatible,
    Incompatible(String),
}

/// Lowercase, trim and rewrite a leading encoder alias to its codec name
pub fn normalize(codec: &str) -> String {
    let lower = codec.trim().to_lowercase();

    for (alias, canonical) in ENCODER_ALIASES {
        if let Some(suffix) = lower.strip_prefix(alias) {
            return format!("{canonical}{suffix}");
        }
    }

    lower
}

pub fn is_video_compatible(video_codec: &str) -> bool {
    let normalized = normalize(video_codec);
    COMPATIBLE_VIDEO_CODECS
        .iter()
        .any(|family| normalized.contains(family))
}

pub fn is_audio_compatible(audio_codec: &str) -> bool {
    let normalized = normalize(audio_codec);
    COMPATIBLE_AUDIO_CODECS.contains(&normalized.as_str())
}

/// Both tracks must be playable
pub fn is_compatible(video_codec: &str, audio_codec: &str) -> bool {
    is_video_compatible(video_codec) && is_audio_compatible(audio_codec)
}

/// One clause per failing track, joined with `; `
pub fn incompatibility_reason(video_codec: &str, audio_codec: &str) -> String {
    let mut reasons = Vec::new();

    if !is_video_compatible(video_codec) {
        reasons.push(format!("Video codec '{video_codec}' not compatible"));
    }
    if !is_audio_compatible(audio_codec) {
        reasons.push(format!("Audio codec '{audio_codec}' not compatible"));
    }

    if reasons.is_empty() {
        "Unknown issue".to_string()
    } else {
        reasons.join("; ")
    }
}

pub fn evaluate(video_codec: &str, audio_codec: &str) -> Verdict {
    if is_compatible(video_codec, audio_codec) {
        Verdict::Compatible
    } else {
        Verdict::Incompatible(incompatibility_reason(video_codec, audio_codec))
    }
}

/// ✓ for compatible, ✗ otherwise
pub fn compatibility_symbol(compatible: bool) -> &'static str {
    if compatible {
        "✓"
    } else {
        "✗"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rewrites_encoder_prefix() {
        assert_eq!(normalize("  LibX264 "), "h264");
        assert_eq!(normalize("libx265-main10"), "h265-main10");
        assert_eq!(normalize("mpeg2video"), "mpeg2");
        assert_eq!(normalize("libfdk_aac"), "aac");
        assert_eq!(normalize("VP9"), "vp9");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_encoder_alias_matches_codec_name() {
        assert!(is_compatible("libx264", "aac"));
        assert_eq!(is_compatible("libx264", "aac"), is_compatible("h264", "aac"));
        assert!(is_compatible("libx265", "libfdk_aac"));
    }

    #[test]
    fn test_video_uses_substring_match() {
        assert!(is_video_compatible("hevc_nvenc"));
        assert!(is_video_compatible("H.264"));
        assert!(is_video_compatible("avc1"));
        assert!(!is_video_compatible("mpeg4"));
        assert!(!is_video_compatible("Unknown"));
    }

    #[test]
    fn test_audio_uses_exact_match() {
        assert!(is_audio_compatible("AAC"));
        assert!(is_audio_compatible("eac3"));
        assert!(!is_audio_compatible("aac_latm"));
        assert!(!is_audio_compatible("pcm_s16le"));
        assert!(!is_audio_compatible("Unknown"));
    }

    #[test]
    fn test_reason_names_only_failing_audio() {
        assert!(!is_compatible("hevc", "vorbis"));
        let reason = incompatibility_reason("hevc", "vorbis");
        assert_eq!(reason, "Audio codec 'vorbis' not compatible");
    }

    #[test]
    fn test_reason_names_both_tracks() {
        assert!(!is_compatible("vp9", "opus"));
        let reason = incompatibility_reason("vp9", "opus");
        assert_eq!(
            reason,
            "Video codec 'vp9' not compatible; Audio codec 'opus' not compatible"
        );
    }

    #[test]
    fn test_reason_fallback_for_compatible_pair() {
        assert_eq!(incompatibility_reason("h264", "aac"), "Unknown issue");
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate("h264", "ac3"), Verdict::Compatible);
        assert_eq!(
            evaluate("av1", "aac"),
            Verdict::Incompatible("Video codec 'av1' not compatible".to_string())
        );
        assert_eq!(compatibility_symbol(true), "✓");
        assert_eq!(compatibility_symbol(false), "✗");
    }
}
