//! WebVTT caption I/O: the karaoke-tag parser and the curated-cue writer.

pub mod parser;
pub mod writer;

pub use parser::{parse_vtt, read_vtt};
pub use writer::{render_vtt, write_vtt};

/// Format time in seconds to WebVTT time format (HH:MM:SS.mmm)
pub fn format_vtt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` (comma separator accepted) into seconds.
pub fn parse_vtt_time(value: &str) -> Option<f64> {
    let value = value.trim().replace(',', ".");
    let mut parts = value.rsplit(':');
    let seconds: f64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let hours: u64 = match parts.next() {
        Some(h) => h.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || !(0.0..60.0).contains(&seconds) || minutes >= 60 {
        return None;
    }

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Escape the characters WebVTT cue text reserves for markup.
pub fn escape_cue_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Decode the entities `escape_cue_text` produces, plus `&nbsp;`.
pub fn unescape_cue_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
