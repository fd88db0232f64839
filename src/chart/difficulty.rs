//! Difficulty tiers and auto-generated variants
//!
//! Four variants are derived from one note list by subsampling:
//!
//! | Tier   | Level            | Density |
//! |--------|------------------|---------|
//! | Easy   | `max(2, L - 4)`  | 0.35    |
//! | Normal | `max(3, L - 2)`  | 0.55    |
//! | Hard   | `max(5, L - 1)`  | 0.75    |
//! | Oni    | `max(7, L)`      | 1.0     |
//!
//! A density maps to a stride `max(1, round(1 / density))`. Stride 1 drops
//! every fourth note instead of keeping all, so Hard stays a little sparser
//! than Oni. Densities of 0.95 and above keep everything.
//!
//! Once a tier is edited by hand it stops following regeneration; see
//! [`ChartVariants`].

use super::document::{extract_course_header_lines, extract_notes_block, render_document};
use super::merge::TierSection;
use super::note::{Category, NoteEvent, NoteKind};
use super::parser::{parse_document, ParsedChart};
use super::ChartMetadata;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Difficulty tier (`COURSE:` value)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Lowest density
    Easy,
    /// Low-mid density
    Normal,
    /// Mid-high density
    Hard,
    /// Full density
    Oni,
    /// Alternate full-density chart
    Ura,
    /// Any other course name, kept as written
    Other(String),
}

impl Tier {
    /// Known tiers in canonical order
    pub const CANONICAL: [Tier; 5] = [Tier::Easy, Tier::Normal, Tier::Hard, Tier::Oni, Tier::Ura];

    /// Tier for a `COURSE:` value; known names match case-insensitively
    pub fn from_course(course: &str) -> Self {
        let course = course.trim();
        match course.to_ascii_lowercase().as_str() {
            "easy" => Tier::Easy,
            "normal" => Tier::Normal,
            "hard" => Tier::Hard,
            "oni" => Tier::Oni,
            "ura" => Tier::Ura,
            _ => Tier::Other(course.to_string()),
        }
    }

    /// Name written after `COURSE:`
    pub fn name(&self) -> &str {
        match self {
            Tier::Easy => "Easy",
            Tier::Normal => "Normal",
            Tier::Hard => "Hard",
            Tier::Oni => "Oni",
            Tier::Ura => "Ura",
            Tier::Other(name) => name,
        }
    }

    /// Position in canonical order; every unknown tier shares the last slot
    pub fn rank(&self) -> usize {
        Tier::CANONICAL
            .iter()
            .position(|t| t == self)
            .unwrap_or(Tier::CANONICAL.len())
    }

    /// Canonical ordering; unknown tiers compare equal so a stable sort keeps
    /// them in first-seen order
    pub fn canonical_cmp(&self, other: &Tier) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct VariantPlan {
    tier: Tier,
    min_level: i32,
    level_delta: i32,
    density: f64,
}

const VARIANT_PLANS: [VariantPlan; 4] = [
    VariantPlan { tier: Tier::Easy, min_level: 2, level_delta: -4, density: 0.35 },
    VariantPlan { tier: Tier::Normal, min_level: 3, level_delta: -2, density: 0.55 },
    VariantPlan { tier: Tier::Hard, min_level: 5, level_delta: -1, density: 0.75 },
    VariantPlan { tier: Tier::Oni, min_level: 7, level_delta: 0, density: 1.0 },
];

/// Auto-generated tier snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyVariant {
    /// Tier
    pub tier: Tier,
    /// Level written after `LEVEL:`
    pub level: i32,
    /// Balloon counts
    pub balloon: Vec<u32>,
    /// Subsampled notes
    pub notes: Vec<NoteEvent>,
    /// Rendered single-tier document
    pub document: String,
}

/// Keep roughly `density` of the notes
pub fn subsample(notes: &[NoteEvent], density: f64) -> Vec<NoteEvent> {
    if density >= 0.95 {
        return notes.to_vec();
    }

    let stride = if density > 0.0 {
        ((1.0 / density).round() as usize).max(1)
    } else {
        usize::MAX
    };

    notes
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            if stride == 1 {
                idx % 4 != 3
            } else {
                idx % stride == 0
            }
        })
        .map(|(_, note)| note.clone())
        .collect()
}

/// Smallest note list that gets the category steps of [`ensure_note_coverage`]
///
/// A single note cannot hold both categories; retyping it would only swap its
/// kind, so a lone note keeps its category and is only accented. This is
/// lower than the classifier's pool minimum because subsampled tiers are
/// already small.
pub const VARIANT_CATEGORY_MIN: usize = 2;

/// Make sure a note list carries each category and each accented kind
///
/// Notes carry no ratio or energy at this point, so positions decide:
/// 1. With at least [`VARIANT_CATEGORY_MIN`] notes, a missing don retypes
///    the first note and a missing katsu retypes the first note that is not
///    a plain don (or the first note)
/// 2. A missing accented don accents the first plain don; a missing accented
///    katsu accents the first plain katsu
pub fn ensure_note_coverage(notes: &mut [NoteEvent]) {
    if notes.len() >= VARIANT_CATEGORY_MIN {
        let has = |notes: &[NoteEvent], category: Category| {
            notes.iter().any(|n| n.kind.category() == category)
        };

        if !has(notes, Category::Don) {
            notes[0].retype(NoteKind::Don);
        }
        if !has(notes, Category::Katsu) {
            let idx = notes
                .iter()
                .position(|n| n.kind != NoteKind::Don)
                .unwrap_or(0);
            notes[idx].retype(NoteKind::Katsu);
        }
    }

    for (plain, big) in [(NoteKind::Don, NoteKind::DonBig), (NoteKind::Katsu, NoteKind::KatsuBig)] {
        if notes.iter().any(|n| n.kind == big) {
            continue;
        }
        if let Some(note) = notes.iter_mut().find(|n| n.kind == plain) {
            note.retype(big);
        }
    }
}

/// Derive the four auto-generated tiers
///
/// # Arguments
///
/// * `notes` - Full-density notes sorted by beat
/// * `bpm` - Tempo written to every variant
/// * `offset_ms` - Offset written to every variant
/// * `base` - Title, wave, balloon and the base level `L`
/// * `divisions` - Grid resolution of the rendered bodies
///
/// # Returns
///
/// Easy, Normal, Hard and Oni, in that order. An empty note list yields four
/// variants with empty bodies.
pub fn derive_variants(
    notes: &[NoteEvent],
    bpm: f64,
    offset_ms: f64,
    base: &ChartMetadata,
    divisions: usize,
) -> [DifficultyVariant; 4] {
    VARIANT_PLANS.map(|plan| {
        let mut variant_notes = subsample(notes, plan.density);
        ensure_note_coverage(&mut variant_notes);

        let level = (base.level + plan.level_delta).max(plan.min_level);
        let metadata = ChartMetadata {
            bpm,
            offset_ms,
            course: plan.tier.name().to_string(),
            level,
            ..base.clone()
        };

        log::debug!(
            "Variant {}: level {}, {} of {} notes",
            plan.tier,
            level,
            variant_notes.len(),
            notes.len()
        );

        DifficultyVariant {
            document: render_document(&metadata, &variant_notes, divisions),
            tier: plan.tier,
            level,
            balloon: base.balloon.clone(),
            notes: variant_notes,
        }
    })
}

/// A tier the user has edited by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditedTier {
    /// Current document text
    pub document: String,
    /// Metadata parsed from the document
    pub metadata: ChartMetadata,
    /// Notes parsed from the document
    pub notes: Vec<NoteEvent>,
}

/// Whether a tier still follows regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TierState {
    /// Snapshot from the last generation; replaced on regeneration
    Generated(DifficultyVariant),
    /// Diverged from generation; never overwritten
    Edited(EditedTier),
}

impl TierState {
    /// Document text of the tier
    pub fn document(&self) -> &str {
        match self {
            TierState::Generated(variant) => &variant.document,
            TierState::Edited(edited) => &edited.document,
        }
    }

    /// Level of the tier
    pub fn level(&self) -> i32 {
        match self {
            TierState::Generated(variant) => variant.level,
            TierState::Edited(edited) => edited.metadata.level,
        }
    }

    /// Balloon counts of the tier
    pub fn balloon(&self) -> &[u32] {
        match self {
            TierState::Generated(variant) => &variant.balloon,
            TierState::Edited(edited) => &edited.metadata.balloon,
        }
    }

    /// True once the tier has been edited
    pub fn is_edited(&self) -> bool {
        matches!(self, TierState::Edited(_))
    }
}

/// Per-tier state of one chart, kept in canonical tier order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartVariants {
    tiers: Vec<(Tier, TierState)>,
}

impl ChartVariants {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding freshly generated variants
    pub fn from_variants(variants: impl IntoIterator<Item = DifficultyVariant>) -> Self {
        let mut set = Self::new();
        set.regenerate(variants);
        set
    }

    /// Replace generated tiers with new variants
    ///
    /// Edited tiers are left alone. Returns how many tiers were written.
    pub fn regenerate(&mut self, variants: impl IntoIterator<Item = DifficultyVariant>) -> usize {
        let mut written = 0;
        for variant in variants {
            match self.tiers.iter_mut().find(|(tier, _)| *tier == variant.tier) {
                Some((tier, state)) => {
                    if state.is_edited() {
                        log::debug!("Keeping edited tier {}", tier);
                        continue;
                    }
                    *state = TierState::Generated(variant);
                }
                None => {
                    let tier = variant.tier.clone();
                    self.tiers.push((tier, TierState::Generated(variant)));
                }
            }
            written += 1;
        }
        self.tiers.sort_by(|a, b| a.0.canonical_cmp(&b.0));
        written
    }

    /// Replace a tier's document by hand
    ///
    /// The tier is frozen as edited. The parse result is returned so the
    /// caller can surface its diagnostics.
    pub fn edit(&mut self, tier: Tier, document: impl Into<String>) -> ParsedChart {
        let document = document.into();
        let parsed = parse_document(&document);
        let state = TierState::Edited(EditedTier {
            document,
            metadata: parsed.metadata.clone(),
            notes: parsed.notes.clone(),
        });

        match self.tiers.iter_mut().find(|(t, _)| *t == tier) {
            Some((_, existing)) => *existing = state,
            None => {
                self.tiers.push((tier, state));
                self.tiers.sort_by(|a, b| a.0.canonical_cmp(&b.0));
            }
        }
        parsed
    }

    /// State of one tier
    pub fn get(&self, tier: &Tier) -> Option<&TierState> {
        self.tiers.iter().find(|(t, _)| t == tier).map(|(_, s)| s)
    }

    /// All tiers in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&Tier, &TierState)> {
        self.tiers.iter().map(|(t, s)| (t, s))
    }

    /// Number of tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// True when no tier is present
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Merge input for every tier; `active` marks the tier being edited
    pub fn sections(&self, active: &Tier) -> Vec<TierSection> {
        self.tiers
            .iter()
            .map(|(tier, state)| {
                let document = state.document();
                TierSection {
                    tier: tier.clone(),
                    level: state.level(),
                    balloon: state.balloon().to_vec(),
                    notes_block: extract_notes_block(document),
                    header_lines: extract_course_header_lines(document),
                    is_active: tier == active,
                }
            })
            .collect()
    }
}
