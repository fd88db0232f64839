//! Coverage guarantees for classified events
//!
//! A chart without a katsu, or without any accented note, is treated as
//! incomplete. After thresholding, existing events are promoted (never
//! added) in a fixed order:
//!
//! 1. Pools of at least [`CATEGORY_COVERAGE_MIN`] events: no katsu at all
//!    promotes the highest-ratio event to katsu; all katsu demotes the
//!    lowest-ratio event to don. The accent flag is kept.
//! 2. Pools of at least [`ACCENT_COVERAGE_MIN`] events with no accent: the
//!    loudest event is accented.
//! 3. Any pool: no accented don accents the loudest don; no accented katsu
//!    accents the loudest katsu.
//!
//! The order is load-bearing. On pools of 4-7 events, step 3 can override a
//! legitimate classification; that is accepted as a convention.

use crate::chart::note::{Category, NoteEvent, NoteKind};

/// Smallest pool for which category coverage is enforced
pub const CATEGORY_COVERAGE_MIN: usize = 4;

/// Smallest pool for which overall accent coverage is enforced
pub const ACCENT_COVERAGE_MIN: usize = 8;

/// Snapped note plus the measurements that classified it
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    /// Note on the grid
    pub note: NoteEvent,
    /// Transient ratio of the onset
    pub ratio: f32,
    /// Envelope energy of the onset
    pub energy: f32,
}

impl ClassifiedEvent {
    fn kind(&self) -> NoteKind {
        self.note.kind
    }
}

/// Index of the first maximum; ties keep the earliest element
fn first_max<I: Iterator<Item = (usize, f32)>>(iter: I) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, value) in iter {
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Index of the first minimum; ties keep the earliest element
fn first_min<I: Iterator<Item = (usize, f32)>>(iter: I) -> Option<usize> {
    first_max(iter.map(|(idx, value)| (idx, -value)))
}

/// Promote events in place so every kind the pool size calls for is present
pub fn apply_coverage(events: &mut [ClassifiedEvent]) {
    if events.len() >= CATEGORY_COVERAGE_MIN {
        let katsu_count = events.iter().filter(|e| e.kind().is_katsu()).count();

        if katsu_count == 0 {
            if let Some(idx) = first_max(events.iter().map(|e| e.ratio).enumerate()) {
                let big = events[idx].kind().is_big();
                events[idx].note.retype(NoteKind::new(Category::Katsu, big));
                log::debug!("Coverage: promoted event {} to katsu", idx);
            }
        } else if katsu_count == events.len() {
            if let Some(idx) = first_min(events.iter().map(|e| e.ratio).enumerate()) {
                let big = events[idx].kind().is_big();
                events[idx].note.retype(NoteKind::new(Category::Don, big));
                log::debug!("Coverage: demoted event {} to don", idx);
            }
        }
    }

    let big_count = events.iter().filter(|e| e.kind().is_big()).count();
    if events.len() >= ACCENT_COVERAGE_MIN && big_count == 0 {
        if let Some(idx) = first_max(events.iter().map(|e| e.energy).enumerate()) {
            let kind = events[idx].kind().with_big(true);
            events[idx].note.retype(kind);
            log::debug!("Coverage: accented loudest event {}", idx);
        }
    }

    let has_big_don = events.iter().any(|e| e.kind() == NoteKind::DonBig);
    let has_big_katsu = events.iter().any(|e| e.kind() == NoteKind::KatsuBig);

    if !has_big_don {
        promote_loudest(events, Category::Don);
    }
    if !has_big_katsu {
        promote_loudest(events, Category::Katsu);
    }
}

fn promote_loudest(events: &mut [ClassifiedEvent], category: Category) {
    let candidates = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind().category() == category)
        .map(|(idx, e)| (idx, e.energy));

    if let Some(idx) = first_max(candidates) {
        events[idx].note.retype(NoteKind::new(category, true));
    }
}
