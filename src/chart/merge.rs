//! Multi-tier document composition
//!
//! One song-wide header followed by one `#START ... #END` section per tier:
//!
//! ```text
//! TITLE:...        <- global header (base lines, TITLE/BPM/OFFSET/WAVE upserted)
//! BPM:...
//!
//! COURSE:Easy      <- synthesized only when the tier header lacks them
//! LEVEL:3
//! BALLOON:
//!
//! #START
//! ...
//! #END
//! ```

use super::difficulty::Tier;
use super::document::extract_global_header_lines;
use super::parser::parse_document;
use serde::{Deserialize, Serialize};

/// Song-wide header values; these override whatever the base lines say
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalHeader {
    /// Title
    pub title: String,
    /// Tempo in BPM
    pub bpm: f64,
    /// Offset
    pub offset_ms: f64,
    /// Audio file name
    pub wave: String,
    /// Other song-wide lines kept in order (e.g. `SUBTITLE:`, `DEMOSTART:`)
    pub base_lines: Vec<String>,
}

impl GlobalHeader {
    /// Header taken from an existing document
    pub fn from_document(document: &str) -> Self {
        let parsed = parse_document(document);
        Self {
            title: parsed.metadata.title,
            bpm: parsed.metadata.bpm,
            offset_ms: parsed.metadata.offset_ms,
            wave: parsed.metadata.wave,
            base_lines: extract_global_header_lines(document),
        }
    }
}

/// One tier's contribution to a merged document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSection {
    /// Tier
    pub tier: Tier,
    /// Level used when the header has no `LEVEL:`
    pub level: i32,
    /// Balloon counts used when the header has no `BALLOON:`
    pub balloon: Vec<u32>,
    /// Grid lines of the body; empty means an empty chart
    pub notes_block: String,
    /// Tier header lines, written after any synthesized ones
    pub header_lines: Vec<String>,
    /// The tier currently being edited wins over duplicates
    pub is_active: bool,
}

fn has_key(lines: &[String], key: &str) -> bool {
    let prefix = format!("{}:", key);
    lines
        .iter()
        .any(|line| line.trim().to_ascii_uppercase().starts_with(&prefix))
}

/// Replace every `key:` line with one `key:value` line at the first match's
/// position, or append it
fn upsert_line(lines: &mut Vec<String>, key: &str, value: &str) {
    let prefix = format!("{}:", key);
    let matches = |line: &String| line.trim().to_ascii_uppercase().starts_with(&prefix);

    let first = lines.iter().position(matches);
    lines.retain(|line| !matches(line));

    let next_line = format!("{}{}", prefix, value);
    match first {
        Some(idx) => lines.insert(idx.min(lines.len()), next_line),
        None => lines.push(next_line),
    }
}

/// One entry per tier; the active entry replaces a duplicate, otherwise the
/// first one is kept. Result is in canonical tier order.
fn unique_sections(sections: &[TierSection]) -> Vec<&TierSection> {
    let mut unique: Vec<&TierSection> = Vec::with_capacity(sections.len());
    for section in sections {
        match unique.iter().position(|s| s.tier == section.tier) {
            Some(idx) if section.is_active => unique[idx] = section,
            Some(_) => {}
            None => unique.push(section),
        }
    }
    unique.sort_by(|a, b| a.tier.canonical_cmp(&b.tier));
    unique
}

fn render_section(section: &TierSection) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(section.header_lines.len() + 3);
    if !has_key(&section.header_lines, "COURSE") {
        lines.push(format!("COURSE:{}", section.tier));
    }
    if !has_key(&section.header_lines, "LEVEL") {
        lines.push(format!("LEVEL:{}", section.level));
    }
    if !has_key(&section.header_lines, "BALLOON") {
        let balloon: Vec<String> = section.balloon.iter().map(|b| b.to_string()).collect();
        lines.push(format!("BALLOON:{}", balloon.join(",")));
    }
    lines.extend(section.header_lines.iter().cloned());

    let notes = if section.notes_block.is_empty() {
        "0,"
    } else {
        section.notes_block.as_str()
    };

    format!("{}\n\n#START\n{}\n#END", lines.join("\n"), notes)
}

/// Compose a multi-tier document
///
/// # Arguments
///
/// * `global` - Song-wide header; its values replace matching base lines
/// * `sections` - Tier sections in any order
///
/// # Returns
///
/// The merged document: header, a blank line, then each tier in canonical
/// order (Easy, Normal, Hard, Oni, Ura, then unknown tiers as first seen)
/// separated by blank lines, with a trailing newline.
pub fn merge_tiers(global: &GlobalHeader, sections: &[TierSection]) -> String {
    let mut header = global.base_lines.clone();
    upsert_line(&mut header, "TITLE", &global.title);
    upsert_line(&mut header, "BPM", &global.bpm.to_string());
    upsert_line(&mut header, "OFFSET", &global.offset_ms.to_string());
    upsert_line(&mut header, "WAVE", &global.wave);

    let unique = unique_sections(sections);
    log::debug!("Merging {} of {} tier sections", unique.len(), sections.len());

    let body: Vec<String> = unique.into_iter().map(render_section).collect();

    format!("{}\n\n{}\n", header.join("\n"), body.join("\n\n"))
}
