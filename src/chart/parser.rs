//! TJA document parser
//!
//! A line-oriented state machine:
//!
//! ```text
//! Header --COURSE:--> TierHeader --#START--> NotesBody --#END--> TierHeader
//!    \_____________________#START______________^
//! ```
//!
//! Parsing never fails. Malformed numeric headers are errors tied to their
//! line and leave the field unchanged; unsupported note characters are
//! warnings and count as empty slots; a missing `#START` or `#END` is a
//! document-level error (line 0). Everything gathered up to that point is
//! still returned.

use super::note::{NoteEvent, NoteKind};
use super::{ChartMetadata, Diagnostic};
use serde::{Deserialize, Serialize};

/// One `#START ... #END` body with the metadata in effect at its start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSection {
    /// Metadata in effect when the body started
    pub metadata: ChartMetadata,

    /// Notes of this body; measures are numbered from 0 per section
    pub notes: Vec<NoteEvent>,

    /// Unrecognized header lines before `#START`, verbatim (trimmed)
    pub header_lines: Vec<String>,

    /// Directives found inside the body (e.g. `#GOGOSTART`), verbatim
    pub directives: Vec<String>,
}

/// Result of parsing a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedChart {
    /// Metadata after all header lines (last write wins)
    pub metadata: ChartMetadata,

    /// Notes of the last section
    pub notes: Vec<NoteEvent>,

    /// Line-tagged errors
    pub errors: Vec<Diagnostic>,

    /// Line-tagged warnings
    pub warnings: Vec<Diagnostic>,

    /// Every body in document order
    pub sections: Vec<ChartSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    TierHeader,
    NotesBody,
}

#[derive(Debug, Clone, Copy)]
enum HeaderKey {
    Title,
    Bpm,
    Offset,
    Course,
    Level,
    Balloon,
    Wave,
}

impl HeaderKey {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TITLE" => Some(HeaderKey::Title),
            "BPM" => Some(HeaderKey::Bpm),
            "OFFSET" => Some(HeaderKey::Offset),
            "COURSE" => Some(HeaderKey::Course),
            "LEVEL" => Some(HeaderKey::Level),
            "BALLOON" => Some(HeaderKey::Balloon),
            "WAVE" => Some(HeaderKey::Wave),
            _ => None,
        }
    }
}

struct SectionBuilder {
    section: ChartSection,
    measure_index: usize,
    // Pending characters of the current measure with their line numbers
    buffer: Vec<(char, usize)>,
}

impl SectionBuilder {
    fn new(metadata: ChartMetadata, header_lines: Vec<String>) -> Self {
        Self {
            section: ChartSection {
                metadata,
                notes: Vec::new(),
                header_lines,
                directives: Vec::new(),
            },
            measure_index: 0,
            buffer: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str, line_no: usize, warnings: &mut Vec<Diagnostic>) {
        for ch in line.chars() {
            if ch.is_whitespace() {
                continue;
            }
            if ch == ',' {
                self.flush_measure(warnings);
            } else {
                self.buffer.push((ch, line_no));
            }
        }
    }

    fn flush_measure(&mut self, warnings: &mut Vec<Diagnostic>) {
        let len = self.buffer.len();
        for (idx, &(token, line_no)) in self.buffer.iter().enumerate() {
            if token == '0' {
                continue;
            }
            match NoteKind::from_token(token) {
                Some(kind) => {
                    let beat = self.measure_index as f64 * 4.0 + (idx as f64 / len as f64) * 4.0;
                    self.section.notes.push(NoteEvent {
                        id: format!("{}-{}", self.measure_index, idx),
                        beat,
                        kind,
                    });
                }
                None => warnings.push(Diagnostic::new(
                    line_no,
                    format!("Unsupported note token: {}", token),
                )),
            }
        }
        self.buffer.clear();
        self.measure_index += 1;
    }

    fn finish(mut self, warnings: &mut Vec<Diagnostic>) -> ChartSection {
        if !self.buffer.is_empty() {
            self.flush_measure(warnings);
        }
        self.section
    }
}

/// `KEY:value` for one of the recognized header keys
fn header_line(line: &str) -> Option<(HeaderKey, &str)> {
    let (name, value) = line.split_once(':')?;
    HeaderKey::parse(name).map(|key| (key, value))
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_level(value: &str) -> Option<i32> {
    let value = value.trim();
    value
        .parse::<i32>()
        .ok()
        .or_else(|| parse_number(value).map(|v| v.trunc() as i32))
}

fn apply_header(
    meta: &mut ChartMetadata,
    key: HeaderKey,
    value: &str,
    line_no: usize,
    errors: &mut Vec<Diagnostic>,
) {
    let text = value.trim();
    match key {
        HeaderKey::Title if !text.is_empty() => meta.title = text.to_string(),
        HeaderKey::Course if !text.is_empty() => meta.course = text.to_string(),
        HeaderKey::Wave if !text.is_empty() => meta.wave = text.to_string(),
        HeaderKey::Title | HeaderKey::Course | HeaderKey::Wave => {}
        HeaderKey::Bpm => match parse_number(text) {
            Some(bpm) => meta.bpm = bpm,
            None => errors.push(Diagnostic::new(line_no, "Invalid BPM value")),
        },
        HeaderKey::Offset => match parse_number(text) {
            Some(offset) => meta.offset_ms = offset,
            None => errors.push(Diagnostic::new(line_no, "Invalid OFFSET value")),
        },
        HeaderKey::Level => match parse_level(text) {
            Some(level) => meta.level = level,
            None => errors.push(Diagnostic::new(line_no, "Invalid LEVEL value")),
        },
        HeaderKey::Balloon => {
            meta.balloon = text
                .split(',')
                .filter_map(|v| v.trim().parse::<u32>().ok())
                .collect();
        }
    }
}

/// Parse a TJA document
///
/// # Example
///
/// ```
/// use tja_autochart::chart::parser::parse_document;
///
/// let parsed = parse_document("BPM:not-a-number\n#START\n0000,\n#END\n");
/// assert_eq!(parsed.errors.len(), 1);
/// assert_eq!(parsed.errors[0].line, 1);
/// assert_eq!(parsed.metadata.bpm, 120.0);
/// assert!(parsed.notes.is_empty());
/// ```
pub fn parse_document(text: &str) -> ParsedChart {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut metadata = ChartMetadata::default();
    let mut sections = Vec::new();

    let mut state = State::Header;
    let mut pending_lines: Vec<String> = Vec::new();
    let mut body: Option<SectionBuilder> = None;
    let mut saw_start = false;
    let mut saw_end = false;

    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let upper = trimmed.to_ascii_uppercase();

        if upper.starts_with("#MEASURE") {
            warnings.push(Diagnostic::new(
                line_no,
                "#MEASURE is not fully supported in visual editor",
            ));
            continue;
        }

        match state {
            State::NotesBody => {
                if upper.starts_with("#END") {
                    saw_end = true;
                    if let Some(builder) = body.take() {
                        sections.push(builder.finish(&mut warnings));
                    }
                    state = State::TierHeader;
                } else if let Some(builder) = body.as_mut() {
                    if trimmed.starts_with('#') {
                        builder.section.directives.push(trimmed.to_string());
                    } else if let Some((key, value)) = header_line(trimmed) {
                        // The section snapshot equals the running metadata
                        // while a body is open
                        apply_header(
                            &mut builder.section.metadata,
                            key,
                            value,
                            line_no,
                            &mut errors,
                        );
                        metadata = builder.section.metadata.clone();
                    } else {
                        builder.push_line(trimmed, line_no, &mut warnings);
                    }
                }
            }
            State::Header | State::TierHeader => {
                if upper.starts_with("#START") {
                    saw_start = true;
                    body = Some(SectionBuilder::new(
                        metadata.clone(),
                        std::mem::take(&mut pending_lines),
                    ));
                    state = State::NotesBody;
                    continue;
                }
                if upper.starts_with("#END") {
                    saw_end = true;
                    warnings.push(Diagnostic::new(line_no, "#END without a matching #START"));
                    continue;
                }

                match header_line(trimmed) {
                    Some((key, value)) => {
                        apply_header(&mut metadata, key, value, line_no, &mut errors);
                        if matches!(key, HeaderKey::Course) {
                            state = State::TierHeader;
                        }
                    }
                    None => pending_lines.push(trimmed.to_string()),
                }
            }
        }
    }

    if let Some(builder) = body.take() {
        log::warn!("Document ended inside a notes body");
        sections.push(builder.finish(&mut warnings));
    }

    if !saw_start {
        errors.push(Diagnostic::new(0, "Missing #START directive"));
    }
    if !saw_end {
        errors.push(Diagnostic::new(0, "Missing #END directive"));
    }

    let notes = sections.last().map(|s| s.notes.clone()).unwrap_or_default();

    log::debug!(
        "Parsed {} sections, {} notes in last, {} errors, {} warnings",
        sections.len(),
        notes.len(),
        errors.len(),
        warnings.len()
    );

    ParsedChart {
        metadata,
        notes,
        errors,
        warnings,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bpm_keeps_default() {
        let parsed = parse_document("BPM:not-a-number\n#START\n0000,\n#END\n");
        assert_eq!(parsed.errors, vec![Diagnostic::new(1, "Invalid BPM value")]);
        assert_eq!(parsed.metadata.bpm, 120.0);
        assert!(parsed.notes.is_empty());
        assert_eq!(parsed.sections.len(), 1);
    }

    #[test]
    fn test_two_measures_on_one_line() {
        let parsed = parse_document("#START\n1000,2000,\n#END\n");
        assert!(parsed.errors.is_empty());
        let notes: Vec<(f64, NoteKind)> = parsed.notes.iter().map(|n| (n.beat, n.kind)).collect();
        assert_eq!(notes, vec![(0.0, NoteKind::Don), (4.0, NoteKind::Katsu)]);
        assert_eq!(parsed.notes[1].id, "1-0");
    }

    #[test]
    fn test_measure_split_across_lines() {
        let parsed = parse_document("#START\n10\n02,\n3,\n#END");
        let notes: Vec<(f64, NoteKind)> = parsed.notes.iter().map(|n| (n.beat, n.kind)).collect();
        assert_eq!(
            notes,
            vec![(0.0, NoteKind::Don), (3.0, NoteKind::Katsu), (4.0, NoteKind::DonBig)]
        );
    }

    #[test]
    fn test_missing_end_is_document_error() {
        let parsed = parse_document("TITLE:x\n#START\n1,\n");
        assert_eq!(parsed.errors, vec![Diagnostic::new(0, "Missing #END directive")]);
        // Best-effort notes are still returned
        assert_eq!(parsed.notes.len(), 1);
    }

    #[test]
    fn test_missing_start() {
        let parsed = parse_document("TITLE:x\n");
        assert_eq!(
            parsed.errors,
            vec![
                Diagnostic::new(0, "Missing #START directive"),
                Diagnostic::new(0, "Missing #END directive"),
            ]
        );
        assert!(parsed.sections.is_empty());
    }

    #[test]
    fn test_unsupported_token_warns_with_line() {
        let parsed = parse_document("#START\n1x\n70,\n#END\n");
        let lines: Vec<usize> = parsed.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(parsed.warnings[0].message, "Unsupported note token: x");
        // Unsupported tokens still occupy a slot
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].beat, 0.0);
    }

    #[test]
    fn test_case_insensitive_keys_and_passthrough() {
        let text = "title: Song\nbpm:150\nSUBTITLE:--x\nCOURSE:Hard\nlevel:8\n#SCOREMODE 2\nballoon:5, 6,x\n#START\n#GOGOSTART\n1,\n#GOGOEND\n#END\n";
        let parsed = parse_document(text);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.metadata.title, "Song");
        assert_eq!(parsed.metadata.bpm, 150.0);
        assert_eq!(parsed.metadata.course, "Hard");
        assert_eq!(parsed.metadata.level, 8);
        assert_eq!(parsed.metadata.balloon, vec![5, 6]);

        let section = &parsed.sections[0];
        assert_eq!(section.header_lines, vec!["SUBTITLE:--x", "#SCOREMODE 2"]);
        assert_eq!(section.directives, vec!["#GOGOSTART", "#GOGOEND"]);
    }

    #[test]
    fn test_measure_directive_warns() {
        let parsed = parse_document("#START\n#MEASURE 3/4\n100,\n#END\n");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
        assert_eq!(parsed.notes.len(), 1);
    }

    #[test]
    fn test_multiple_sections() {
        let text = "TITLE:Multi\nBPM:140\n\nCOURSE:Easy\nLEVEL:3\n#START\n1,\n#END\n\nCOURSE:Oni\nLEVEL:9\n#START\n0,\n2,\n#END\n";
        let parsed = parse_document(text);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].metadata.course, "Easy");
        assert_eq!(parsed.sections[0].metadata.level, 3);
        assert_eq!(parsed.sections[1].metadata.course, "Oni");
        assert_eq!(parsed.sections[1].metadata.bpm, 140.0);
        // Top-level view is the last section
        assert_eq!(parsed.metadata.level, 9);
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].beat, 4.0);
    }

    #[test]
    fn test_crlf_and_comments() {
        let parsed = parse_document("// chart\r\nOFFSET:-1.5\r\n#START\r\n1,\r\n#END\r\n");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.metadata.offset_ms, -1.5);
        assert_eq!(parsed.notes.len(), 1);
    }

    #[test]
    fn test_body_without_trailing_comma_counts() {
        let parsed = parse_document("#START\n1000,\n0010\n#END\n");
        assert_eq!(parsed.notes.len(), 2);
        assert_eq!(parsed.notes[1].beat, 6.0);
    }

    #[test]
    fn test_header_inside_body() {
        let parsed = parse_document("#START\nBPM:140\n1000,\n#END\n");
        assert!(parsed.errors.is_empty());
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.metadata.bpm, 140.0);
        assert_eq!(parsed.sections[0].metadata.bpm, 140.0);
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].kind, NoteKind::Don);
        assert_eq!(parsed.notes[0].beat, 0.0);

        let parsed = parse_document("#START\nLEVEL:x\n1,\n#END\n");
        assert_eq!(parsed.errors, vec![Diagnostic::new(2, "Invalid LEVEL value")]);
        assert_eq!(parsed.notes.len(), 1);
    }
}
