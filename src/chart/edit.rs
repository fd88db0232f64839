//! Interactive note editing

use super::note::{NoteEvent, NoteKind};

/// Two beats closer than this address the same note
pub const TOGGLE_TOLERANCE_BEATS: f64 = 0.01;

/// What [`toggle_note`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No note was near the beat; one was appended
    Added,
    /// The note at the beat already had this kind and was removed
    Removed,
    /// The note at the beat was changed to this kind
    Retyped,
}

/// Toggle a note of `kind` at `beat`
///
/// The first note within [`TOGGLE_TOLERANCE_BEATS`] is removed when it already
/// has `kind`, otherwise it is retyped in place (keeping its id). Without a
/// nearby note a new one is appended.
pub fn toggle_note(notes: &mut Vec<NoteEvent>, beat: f64, kind: NoteKind) -> ToggleOutcome {
    match notes
        .iter()
        .position(|n| (n.beat - beat).abs() < TOGGLE_TOLERANCE_BEATS)
    {
        Some(idx) if notes[idx].kind == kind => {
            notes.remove(idx);
            ToggleOutcome::Removed
        }
        Some(idx) => {
            notes[idx].kind = kind;
            ToggleOutcome::Retyped
        }
        None => {
            notes.push(NoteEvent::new(beat, kind));
            ToggleOutcome::Added
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycle() {
        let mut notes = Vec::new();

        assert_eq!(toggle_note(&mut notes, 1.5, NoteKind::Don), ToggleOutcome::Added);
        assert_eq!(notes[0].id, "1.500-don");

        assert_eq!(
            toggle_note(&mut notes, 1.505, NoteKind::Katsu),
            ToggleOutcome::Retyped
        );
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoteKind::Katsu);
        assert_eq!(notes[0].beat, 1.5);

        assert_eq!(
            toggle_note(&mut notes, 1.5, NoteKind::Katsu),
            ToggleOutcome::Removed
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn test_toggle_outside_tolerance_adds() {
        let mut notes = vec![NoteEvent::new(2.0, NoteKind::Don)];
        assert_eq!(toggle_note(&mut notes, 2.02, NoteKind::Don), ToggleOutcome::Added);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_added_id_uses_generated_form() {
        let mut notes = Vec::new();
        toggle_note(&mut notes, 4.0 / 3.0, NoteKind::KatsuBig);
        assert_eq!(notes[0].id, "1.333-katsu-big");
        assert_eq!(notes[0].id, NoteEvent::new(4.0 / 3.0, NoteKind::KatsuBig).id);
    }
}
