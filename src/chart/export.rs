//! Text preparation for packaging a chart with its audio
//!
//! Nothing here writes files; callers get names and text to store however
//! they like.

use std::path::Path;

/// Fallback when a title sanitizes to nothing
pub const DEFAULT_TITLE: &str = "Chart";

/// Extension used when the audio file name has none
pub const DEFAULT_AUDIO_EXTENSION: &str = ".ogg";

/// Offsets with a larger magnitude are taken to be milliseconds
pub const OFFSET_MS_THRESHOLD: f64 = 20.0;

/// File-system safe title
///
/// Trims, replaces `/` and `\` with `-` and collapses runs of dots.
///
/// ```
/// use tja_autochart::chart::export::sanitize_title;
///
/// assert_eq!(sanitize_title(" ../a\\b "), ".-a-b");
/// assert_eq!(sanitize_title("   "), "Chart");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.trim().chars() {
        match ch {
            '/' | '\\' => out.push('-'),
            '.' if out.ends_with('.') => {}
            _ => out.push(ch),
        }
    }

    if out.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        out
    }
}

fn format_seconds(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Rewrite the first `OFFSET:` header in seconds
///
/// Values whose magnitude exceeds 20 are divided by 1000; every value is
/// written with at most three decimals and no trailing zeros. A missing or
/// non-numeric offset leaves the document as is. Line endings follow the
/// document (`\r\n` if it contains any).
pub fn normalize_offset_to_seconds(document: &str) -> String {
    let newline = if document.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = document
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();

    let Some(idx) = lines
        .iter()
        .position(|l| l.trim().to_ascii_uppercase().starts_with("OFFSET:"))
    else {
        return document.to_string();
    };

    let raw = lines[idx]
        .split_once(':')
        .map(|(_, value)| value.trim())
        .unwrap_or_default();
    let Some(value) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) else {
        return document.to_string();
    };

    let seconds = if value.abs() > OFFSET_MS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    lines[idx] = format!("OFFSET:{}", format_seconds(seconds));

    lines.join(newline)
}

/// Name for the packaged audio file: sanitized title plus the original
/// extension (`.ogg` when there is none)
pub fn audio_asset_name(title: &str, original_file_name: Option<&str>) -> String {
    let ext = original_file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_AUDIO_EXTENSION.to_string());
    format!("{}{}", sanitize_title(title), ext)
}

/// File names and text for a packaged chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPackage {
    /// `{title}.tja`
    pub chart_file_name: String,
    /// Chart text with the offset in seconds
    pub chart_text: String,
    /// Audio file name, when audio is included
    pub audio_file_name: Option<String>,
}

/// Prepare names and text for packaging
pub fn prepare_package(title: &str, document: &str, audio_file_name: Option<&str>) -> ChartPackage {
    let safe_title = sanitize_title(title);
    ChartPackage {
        chart_file_name: format!("{}.tja", safe_title),
        chart_text: normalize_offset_to_seconds(document),
        audio_file_name: audio_file_name.map(|name| audio_asset_name(title, Some(name))),
    }
}
