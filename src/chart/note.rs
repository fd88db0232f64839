//! Note events and their kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base hit category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Centre hit (tonal, sustained transients)
    Don,
    /// Rim hit (noisy, percussive transients)
    Katsu,
}

/// Note kind: a category plus an accent flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    /// Grid token `1`
    Don,
    /// Grid token `2`
    Katsu,
    /// Grid token `3`
    DonBig,
    /// Grid token `4`
    KatsuBig,
}

impl NoteKind {
    /// Kind for a category and accent flag
    pub fn new(category: Category, big: bool) -> Self {
        match (category, big) {
            (Category::Don, false) => NoteKind::Don,
            (Category::Katsu, false) => NoteKind::Katsu,
            (Category::Don, true) => NoteKind::DonBig,
            (Category::Katsu, true) => NoteKind::KatsuBig,
        }
    }

    /// Base category
    pub fn category(self) -> Category {
        match self {
            NoteKind::Don | NoteKind::DonBig => Category::Don,
            NoteKind::Katsu | NoteKind::KatsuBig => Category::Katsu,
        }
    }

    /// True for accented kinds
    pub fn is_big(self) -> bool {
        matches!(self, NoteKind::DonBig | NoteKind::KatsuBig)
    }

    /// True for either katsu kind
    pub fn is_katsu(self) -> bool {
        self.category() == Category::Katsu
    }

    /// Same category, accent flag replaced
    pub fn with_big(self, big: bool) -> Self {
        NoteKind::new(self.category(), big)
    }

    /// Grid character
    pub fn token(self) -> char {
        match self {
            NoteKind::Don => '1',
            NoteKind::Katsu => '2',
            NoteKind::DonBig => '3',
            NoteKind::KatsuBig => '4',
        }
    }

    /// Kind for a grid character; `None` for `0` and unsupported characters
    pub fn from_token(token: char) -> Option<Self> {
        match token {
            '1' => Some(NoteKind::Don),
            '2' => Some(NoteKind::Katsu),
            '3' => Some(NoteKind::DonBig),
            '4' => Some(NoteKind::KatsuBig),
            _ => None,
        }
    }

    /// Short name used in note ids
    pub fn name(self) -> &'static str {
        match self {
            NoteKind::Don => "don",
            NoteKind::Katsu => "katsu",
            NoteKind::DonBig => "don-big",
            NoteKind::KatsuBig => "katsu-big",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed note on the beat grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Derived identifier, not meaningful on its own
    pub id: String,

    /// Position in quarter-note beats from the chart start
    pub beat: f64,

    /// Note kind
    pub kind: NoteKind,
}

impl NoteEvent {
    /// Note with the generated id form `"{beat:.3}-{kind}"`
    pub fn new(beat: f64, kind: NoteKind) -> Self {
        Self {
            id: generated_id(beat, kind),
            beat,
            kind,
        }
    }

    /// Change the kind and refresh the id
    pub fn retype(&mut self, kind: NoteKind) {
        self.kind = kind;
        self.id = generated_id(self.beat, kind);
    }
}

fn generated_id(beat: f64, kind: NoteKind) -> String {
    format!("{:.3}-{}", beat, kind.name())
}

/// Sort notes by beat (stable)
pub fn sort_by_beat(notes: &mut [NoteEvent]) {
    notes.sort_by(|a, b| a.beat.partial_cmp(&b.beat).unwrap_or(std::cmp::Ordering::Equal));
}
