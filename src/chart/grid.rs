//! Note grid serialization and quantization
//!
//! A measure is four beats. Each measure is written as `divisions` characters
//! followed by a comma, one measure per line.

use super::note::{sort_by_beat, NoteEvent, NoteKind};
use std::collections::BTreeMap;

/// Upper bound on rendered measures; notes at or past it are skipped
pub const MAX_MEASURES: usize = 10_000;

/// Serialize notes into comma-terminated grid rows
///
/// Rows span measure 0 through the measure holding the last note. A note's
/// slot is its within-measure beat fraction rounded to the nearest division
/// and clamped to `[0, divisions - 1]`; a later note landing on an occupied
/// slot overwrites it. Non-finite beats and beats past [`MAX_MEASURES`] are
/// skipped. An empty list yields a single all-zero row.
///
/// # Example
///
/// ```
/// use tja_autochart::chart::grid::build_notes_block;
/// use tja_autochart::chart::note::{NoteEvent, NoteKind};
///
/// let notes = vec![
///     NoteEvent::new(0.0, NoteKind::Don),
///     NoteEvent::new(4.0, NoteKind::Katsu),
/// ];
/// assert_eq!(build_notes_block(&notes, 4), "1000,\n2000,");
/// assert_eq!(build_notes_block(&[], 4), "0000,");
/// ```
pub fn build_notes_block(notes: &[NoteEvent], divisions: usize) -> String {
    let divisions = divisions.max(1);

    let in_range = |beat: f64| beat.is_finite() && beat < MAX_MEASURES as f64 * 4.0;
    let skipped = notes.iter().filter(|n| !in_range(n.beat)).count();
    if skipped > 0 {
        log::warn!("Skipping {} notes outside the {}-measure grid", skipped, MAX_MEASURES);
    }

    let max_beat = match notes
        .iter()
        .map(|n| n.beat)
        .filter(|&beat| in_range(beat))
        .reduce(f64::max)
    {
        Some(beat) => beat,
        None => return format!("{},", "0".repeat(divisions)),
    };
    let measures = (((max_beat + 0.001) / 4.0).ceil().clamp(1.0, MAX_MEASURES as f64)) as usize;

    let mut rows: Vec<Vec<char>> = vec![vec!['0'; divisions]; measures];
    for note in notes {
        let measure = (note.beat / 4.0).floor();
        if !(measure >= 0.0 && (measure as usize) < measures) {
            continue;
        }
        let measure = measure as usize;
        let beat_in_measure = note.beat - measure as f64 * 4.0;
        let slot = ((beat_in_measure / 4.0) * divisions as f64)
            .round()
            .clamp(0.0, (divisions - 1) as f64) as usize;
        rows[measure][slot] = note.kind.token();
    }

    rows.into_iter()
        .map(|row| {
            let mut line: String = row.into_iter().collect();
            line.push(',');
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn merge_kinds(existing: NoteKind, incoming: NoteKind) -> NoteKind {
    if existing.is_katsu() != incoming.is_katsu() {
        return NoteKind::Katsu;
    }
    match (existing, incoming) {
        (NoteKind::Don, NoteKind::DonBig) => NoteKind::DonBig,
        (NoteKind::Katsu, NoteKind::KatsuBig) => NoteKind::KatsuBig,
        _ => existing,
    }
}

/// Snap notes to a `divisions`-per-measure grid
///
/// Notes that land on the same slot merge: a don/katsu conflict becomes a
/// plain katsu, and within one category the accented kind wins over the plain
/// one. Returned notes carry fresh ids and are sorted by beat.
pub fn quantize_notes(notes: &[NoteEvent], divisions: usize) -> Vec<NoteEvent> {
    let steps_per_beat = divisions.max(1) as f64 / 4.0;
    let mut slots: BTreeMap<i64, NoteKind> = BTreeMap::new();

    for note in notes {
        let slot = (note.beat * steps_per_beat).round() as i64;
        slots
            .entry(slot)
            .and_modify(|kind| *kind = merge_kinds(*kind, note.kind))
            .or_insert(note.kind);
    }

    let mut quantized: Vec<NoteEvent> = slots
        .into_iter()
        .map(|(slot, kind)| NoteEvent::new(slot as f64 / steps_per_beat, kind))
        .collect();
    sort_by_beat(&mut quantized);
    quantized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(beat: f64, kind: NoteKind) -> NoteEvent {
        NoteEvent::new(beat, kind)
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(build_notes_block(&[], 16), "0000000000000000,");
    }

    #[test]
    fn test_block_spans_to_last_measure() {
        let notes = vec![note(1.0, NoteKind::DonBig), note(9.5, NoteKind::KatsuBig)];
        let block = build_notes_block(&notes, 8);
        assert_eq!(block, "00300000,\n00000000,\n00040000,");
    }

    #[test]
    fn test_block_on_measure_boundary() {
        // Beat 4.0 starts the second measure
        let block = build_notes_block(&[note(4.0, NoteKind::Don)], 4);
        assert_eq!(block, "0000,\n1000,");
    }

    #[test]
    fn test_slot_clamped_to_last_division() {
        // 3.95 of 4 beats rounds to slot 4 of 4, clamped to 3
        let block = build_notes_block(&[note(3.95, NoteKind::Katsu)], 4);
        assert_eq!(block, "0002,");
    }

    #[test]
    fn test_out_of_range_beats_skipped() {
        let notes = vec![
            NoteEvent::new(0.0, NoteKind::Don),
            NoteEvent::new(f64::NAN, NoteKind::Katsu),
            NoteEvent::new(f64::INFINITY, NoteKind::Katsu),
            NoteEvent::new(1.0e12, NoteKind::DonBig),
        ];
        assert_eq!(build_notes_block(&notes, 4), "1000,");

        let only_garbage = vec![NoteEvent::new(1.0e12, NoteKind::Don)];
        assert_eq!(build_notes_block(&only_garbage, 4), "0000,");

        let last = NoteEvent::new((MAX_MEASURES * 4 - 1) as f64, NoteKind::Don);
        assert_eq!(build_notes_block(&[last], 4).lines().count(), MAX_MEASURES);
    }

    #[test]
    fn test_quantize_merges_conflicts() {
        let notes = vec![
            note(0.02, NoteKind::Don),
            note(0.01, NoteKind::Katsu),
            note(1.0, NoteKind::Don),
            note(1.04, NoteKind::DonBig),
            note(2.0, NoteKind::KatsuBig),
            note(2.01, NoteKind::Katsu),
        ];
        let quantized = quantize_notes(&notes, 16);
        let kinds: Vec<(f64, NoteKind)> = quantized.iter().map(|n| (n.beat, n.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0.0, NoteKind::Katsu),
                (1.0, NoteKind::DonBig),
                (2.0, NoteKind::KatsuBig),
            ]
        );
        assert_eq!(quantized[1].id, "1.000-don-big");
    }

    #[test]
    fn test_quantize_sorts_output() {
        let notes = vec![note(3.1, NoteKind::Don), note(0.9, NoteKind::Katsu)];
        let quantized = quantize_notes(&notes, 4);
        assert_eq!(quantized[0].beat, 1.0);
        assert_eq!(quantized[1].beat, 3.0);
    }
}
