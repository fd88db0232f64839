//! Chart text model
//!
//! Everything between a list of timed notes and a TJA document:
//! - Note model ([`note`])
//! - Grid serializer and quantizer ([`grid`])
//! - Interactive note editing ([`edit`])
//! - Line-oriented parser ([`parser`])
//! - Header mutation and document rendering ([`document`])
//! - Difficulty tiers and derived variants ([`difficulty`])
//! - Multi-tier merge ([`merge`])
//! - Packaging text helpers ([`export`])

pub mod difficulty;
pub mod document;
pub mod edit;
pub mod export;
pub mod grid;
pub mod merge;
pub mod note;
pub mod parser;

use serde::{Deserialize, Serialize};

/// Template every rendered single-tier document starts from
pub const DEFAULT_TJA: &str = "TITLE:New Taiko Chart\nBPM:120\nOFFSET:0\nCOURSE:Oni\nLEVEL:7\nBALLOON:16,16\nWAVE:audio.ogg\n\n#START\n0010001000100010,\n0000000000000000,\n#END\n";

/// Metadata of one difficulty tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    /// Song title (`TITLE:`)
    pub title: String,

    /// Tempo in BPM (`BPM:`)
    pub bpm: f64,

    /// Grid offset (`OFFSET:`); milliseconds while editing
    pub offset_ms: f64,

    /// Difficulty tier name (`COURSE:`)
    pub course: String,

    /// Difficulty level (`LEVEL:`)
    pub level: i32,

    /// Hit counts of balloon notes (`BALLOON:`)
    pub balloon: Vec<u32>,

    /// Audio file name (`WAVE:`)
    pub wave: String,
}

impl Default for ChartMetadata {
    fn default() -> Self {
        Self {
            title: "New Taiko Chart".to_string(),
            bpm: 120.0,
            offset_ms: 0.0,
            course: "Oni".to_string(),
            level: 7,
            balloon: vec![16, 16],
            wave: "audio.ogg".to_string(),
        }
    }
}

impl ChartMetadata {
    /// Balloon counts as the comma list written after `BALLOON:`
    pub fn balloon_list(&self) -> String {
        self.balloon
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Problem found while parsing, tied to a 1-based line (0 for the document)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number, or 0 for document-level problems
    pub line: usize,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_matches_template() {
        let parsed = parser::parse_document(DEFAULT_TJA);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.metadata, ChartMetadata::default());
        assert_eq!(parsed.notes.len(), 4);
    }

    #[test]
    fn test_balloon_list() {
        assert_eq!(ChartMetadata::default().balloon_list(), "16,16");
        let meta = ChartMetadata {
            balloon: Vec::new(),
            ..ChartMetadata::default()
        };
        assert_eq!(meta.balloon_list(), "");
    }
}
