//! Event classification
//!
//! Turns onsets into typed notes on the beat grid:
//! 1. Thin onsets closer than one grid step, keeping the louder one
//! 2. Transient ratio per onset (percussive vs. tonal)
//! 3. Katsu threshold over all ratios, accent threshold over all energies
//! 4. Snap to the grid; colliding slots keep the louder onset; negative beats
//!    are dropped
//! 5. Coverage guarantees (see [`coverage`])

pub mod coverage;
pub mod thresholds;
pub mod transient;

use crate::chart::note::{Category, NoteEvent, NoteKind};
use crate::config::ChartOptions;
use crate::features::onset::Onset;
use crate::io::SampleBuffer;
use coverage::{apply_coverage, ClassifiedEvent};
use std::collections::BTreeMap;
use thresholds::{accent_threshold, katsu_threshold};
use transient::transient_ratio;

/// Greedy minimum-gap filter
///
/// Keeps the first onset; each later onset is kept if it is at least
/// `min_interval` seconds after the last kept one, otherwise it replaces the
/// last kept onset when it is louder.
pub fn filter_onsets(onsets: &[Onset], min_interval: f64) -> Vec<Onset> {
    let mut kept: Vec<Onset> = Vec::with_capacity(onsets.len());

    for &onset in onsets {
        match kept.last_mut() {
            None => kept.push(onset),
            Some(last) if onset.time - last.time >= min_interval => kept.push(onset),
            Some(last) => {
                if onset.energy > last.energy {
                    *last = onset;
                }
            }
        }
    }

    kept
}

/// Classify onsets into notes
///
/// # Arguments
///
/// * `onsets` - Onsets ordered by time
/// * `buffer` - The analysed mono samples
/// * `bpm` - Chart tempo
/// * `offset_ms` - Grid phase in milliseconds
/// * `options` - Grid resolution and katsu bias
/// * `window_size` - Window for the transient ratio, in samples
///
/// # Returns
///
/// Notes sorted by beat, at most one per grid slot. Empty when there are no
/// onsets or the tempo is not a positive finite number.
pub fn classify_onsets(
    onsets: &[Onset],
    buffer: &SampleBuffer<'_>,
    bpm: f64,
    offset_ms: f64,
    options: &ChartOptions,
    window_size: usize,
) -> Vec<NoteEvent> {
    if onsets.is_empty() || !(bpm.is_finite() && bpm > 0.0) {
        return Vec::new();
    }

    let beat_duration = 60.0 / bpm;
    let steps_per_beat = options.effective_divisions() as f64 / 4.0;
    let min_interval = beat_duration / steps_per_beat;

    let filtered = filter_onsets(onsets, min_interval);

    let ratios: Vec<f32> = filtered
        .iter()
        .map(|o| transient_ratio(buffer, o.time, window_size))
        .collect();
    let energies: Vec<f32> = filtered.iter().map(|o| o.energy).collect();

    let katsu_at = katsu_threshold(&ratios, options.katsu_bias);
    let big_at = accent_threshold(&energies, options.katsu_bias);

    log::debug!(
        "Classifying {} of {} onsets: katsu ratio >= {:.4}, accent energy >= {:.6}",
        filtered.len(),
        onsets.len(),
        katsu_at,
        big_at
    );

    let offset_seconds = offset_ms / 1000.0;
    let mut slots: BTreeMap<i64, ClassifiedEvent> = BTreeMap::new();

    for (onset, &ratio) in filtered.iter().zip(&ratios) {
        let beat = (onset.time - offset_seconds) / beat_duration;
        if beat < 0.0 {
            continue;
        }

        let slot = (beat * steps_per_beat).round() as i64;
        let category = if ratio >= katsu_at {
            Category::Katsu
        } else {
            Category::Don
        };
        let kind = NoteKind::new(category, onset.energy >= big_at);

        let replace = slots
            .get(&slot)
            .map_or(true, |existing| onset.energy > existing.energy);
        if replace {
            slots.insert(
                slot,
                ClassifiedEvent {
                    note: NoteEvent::new(slot as f64 / steps_per_beat, kind),
                    ratio,
                    energy: onset.energy,
                },
            );
        }
    }

    // Slots ascend with time, so map order is also first-insertion order
    let mut events: Vec<ClassifiedEvent> = slots.into_values().collect();
    apply_coverage(&mut events);

    log::debug!("Generated {} notes", events.len());

    events.into_iter().map(|e| e.note).collect()
}
