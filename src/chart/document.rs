//! Whole-document text operations
//!
//! These work on raw text so that lines the parser does not model survive
//! untouched.

use super::grid::build_notes_block;
use super::note::NoteEvent;
use super::{ChartMetadata, DEFAULT_TJA};

/// Set a header value
///
/// Replaces the first line starting (case-insensitively) with `KEY:` by
/// `KEY:value`, with the key upper-cased. Without a match the line is inserted
/// before the first `#START` line, or at the top when there is none.
///
/// # Example
///
/// ```
/// use tja_autochart::chart::document::set_header;
///
/// let doc = set_header("bpm:90\n#START\n#END", "BPM", "128");
/// assert_eq!(doc, "BPM:128\n#START\n#END");
///
/// let doc = set_header("TITLE:x\n#START\n#END", "wave", "song.ogg");
/// assert_eq!(doc, "TITLE:x\nWAVE:song.ogg\n#START\n#END");
/// ```
pub fn set_header(document: &str, key: &str, value: &str) -> String {
    let key = key.to_ascii_uppercase();
    let prefix = format!("{}:", key);
    let next_line = format!("{}{}", prefix, value);

    let mut lines: Vec<String> = document.split('\n').map(str::to_string).collect();

    match lines
        .iter()
        .position(|line| line.to_ascii_uppercase().starts_with(&prefix))
    {
        Some(idx) => lines[idx] = next_line,
        None => {
            let insert_at = lines
                .iter()
                .position(|line| line.trim().starts_with("#START"))
                .unwrap_or(0);
            lines.insert(insert_at, next_line);
        }
    }

    lines.join("\n")
}

/// Replace the body between the first `#START` and the first `#END`
///
/// When either marker is missing, or `#END` comes first, a fresh body is
/// appended after the trimmed document instead.
pub fn replace_notes_section(document: &str, notes_block: &str) -> String {
    match (document.find("#START"), document.find("#END")) {
        (Some(start), Some(end)) if end >= start => {
            let before = &document[..start];
            let after = &document[end + "#END".len()..];
            format!("{}#START\n{}\n#END{}", before, notes_block, after)
        }
        _ => format!("{}\n\n#START\n{}\n#END\n", document.trim(), notes_block),
    }
}

/// Render a single-tier document
///
/// Starts from [`DEFAULT_TJA`], sets every metadata header and replaces the
/// body with the serialized notes.
pub fn render_document(metadata: &ChartMetadata, notes: &[NoteEvent], divisions: usize) -> String {
    let mut doc = DEFAULT_TJA.to_string();
    doc = set_header(&doc, "TITLE", &metadata.title);
    doc = set_header(&doc, "BPM", &metadata.bpm.to_string());
    doc = set_header(&doc, "OFFSET", &metadata.offset_ms.to_string());
    doc = set_header(&doc, "COURSE", &metadata.course);
    doc = set_header(&doc, "LEVEL", &metadata.level.to_string());
    doc = set_header(&doc, "BALLOON", &metadata.balloon_list());
    doc = set_header(&doc, "WAVE", &metadata.wave);
    replace_notes_section(&doc, &build_notes_block(notes, divisions))
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim().to_ascii_uppercase().starts_with(marker)
}

/// Grid lines between the first `#START` and `#END` lines, trimmed
///
/// Empty when either marker is missing or out of order.
pub fn extract_notes_block(document: &str) -> String {
    let lines: Vec<&str> = document.lines().collect();
    let start = lines.iter().position(|l| is_marker(l, "#START"));
    let end = lines.iter().position(|l| is_marker(l, "#END"));

    match (start, end) {
        (Some(start), Some(end)) if end > start => {
            lines[start + 1..end].join("\n").trim().to_string()
        }
        _ => String::new(),
    }
}

const GLOBAL_KEYS: [&str; 4] = ["TITLE:", "BPM:", "OFFSET:", "WAVE:"];

/// Tier-specific header lines of a single-tier document
///
/// Non-blank lines before `#START` (or all lines without one), minus the
/// song-wide `TITLE`, `BPM`, `OFFSET` and `WAVE` keys.
pub fn extract_course_header_lines(document: &str) -> Vec<String> {
    let lines: Vec<&str> = document.lines().collect();
    let stop = lines
        .iter()
        .position(|l| is_marker(l, "#START"))
        .unwrap_or(lines.len());

    lines[..stop]
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            let upper = trimmed.to_ascii_uppercase();
            !trimmed.is_empty() && !GLOBAL_KEYS.iter().any(|k| upper.starts_with(k))
        })
        .map(|line| line.to_string())
        .collect()
}

/// Song-wide header lines
///
/// Non-blank lines before the first `COURSE:` or `#START` line.
pub fn extract_global_header_lines(document: &str) -> Vec<String> {
    let lines: Vec<&str> = document.lines().collect();
    let stop = lines
        .iter()
        .position(|l| is_marker(l, "COURSE:") || is_marker(l, "#START"))
        .unwrap_or(lines.len());

    lines[..stop]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::note::NoteKind;
    use crate::chart::parser::parse_document;

    #[test]
    fn test_set_header_inserts_at_top_without_start() {
        assert_eq!(set_header("TITLE:x", "bpm", "100"), "BPM:100\nTITLE:x");
    }

    #[test]
    fn test_set_header_replaces_first_match_only() {
        let doc = "LEVEL:3\nLEVEL:4\n#START\n#END";
        assert_eq!(set_header(doc, "level", "9"), "LEVEL:9\nLEVEL:4\n#START\n#END");
    }

    #[test]
    fn test_replace_notes_section_splices() {
        let doc = "TITLE:x\n#START\n1,\n#END\n// tail\n";
        assert_eq!(
            replace_notes_section(doc, "2,"),
            "TITLE:x\n#START\n2,\n#END\n// tail\n"
        );
    }

    #[test]
    fn test_replace_notes_section_appends_when_missing() {
        assert_eq!(
            replace_notes_section("TITLE:x\n\n", "0,"),
            "TITLE:x\n\n#START\n0,\n#END\n"
        );
        // #END before #START counts as missing
        assert_eq!(
            replace_notes_section("#END\n#START", "0,"),
            "#END\n#START\n\n#START\n0,\n#END\n"
        );
    }

    #[test]
    fn test_render_document() {
        let meta = ChartMetadata {
            title: "Song".to_string(),
            bpm: 128.5,
            offset_ms: -35.0,
            course: "Hard".to_string(),
            level: 6,
            balloon: vec![],
            wave: "song.ogg".to_string(),
        };
        let notes = vec![NoteEvent::new(0.0, NoteKind::Don), NoteEvent::new(1.0, NoteKind::KatsuBig)];
        let doc = render_document(&meta, &notes, 4);
        assert_eq!(
            doc,
            "TITLE:Song\nBPM:128.5\nOFFSET:-35\nCOURSE:Hard\nLEVEL:6\nBALLOON:\nWAVE:song.ogg\n\n#START\n1400,\n#END\n"
        );
    }

    #[test]
    fn test_render_parse_round_trip() {
        let meta = ChartMetadata::default();
        let notes = vec![
            NoteEvent::new(0.5, NoteKind::Don),
            NoteEvent::new(2.25, NoteKind::Katsu),
            NoteEvent::new(7.75, NoteKind::DonBig),
        ];
        let parsed = parse_document(&render_document(&meta, &notes, 16));
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.metadata, meta);
        let got: Vec<(f64, NoteKind)> = parsed.notes.iter().map(|n| (n.beat, n.kind)).collect();
        assert_eq!(
            got,
            vec![(0.5, NoteKind::Don), (2.25, NoteKind::Katsu), (7.75, NoteKind::DonBig)]
        );
    }

    #[test]
    fn test_extractors() {
        let doc = "TITLE:x\r\nBPM:120\r\nSUBTITLE:y\r\n\r\nCOURSE:Oni\r\nLEVEL:8\r\n#START\r\n 1,\r\n2,\r\n#END\r\n";
        assert_eq!(extract_notes_block(doc), "1,\n2,");
        assert_eq!(extract_course_header_lines(doc), vec!["SUBTITLE:y", "COURSE:Oni", "LEVEL:8"]);
        assert_eq!(extract_global_header_lines(doc), vec!["TITLE:x", "BPM:120", "SUBTITLE:y"]);
    }

    #[test]
    fn test_extract_notes_block_without_markers() {
        assert_eq!(extract_notes_block("TITLE:x\n#END\n#START\n"), "");
    }
}
