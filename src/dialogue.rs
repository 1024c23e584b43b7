// Dialogue accumulation: tracks the active speaker and merges continuation lines.
// Explicit state object threaded through the parser; nothing here outlives one parse.

use crate::ids::IdGenerator;
use crate::types::DialogueLine;

/// Speaker state for the scene currently being assembled.
#[derive(Debug, Clone, Default)]
pub struct DialogueAccumulator {
    active_character: Option<String>,
    /// Whether the last dialogue line in the scene may absorb the next one.
    merge_open: bool,
    pending_parenthetical: Option<String>,
}

impl DialogueAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_character(&self) -> Option<&str> {
        self.active_character.as_deref()
    }

    /// A cue line was seen. The next dialogue line starts a fresh utterance.
    pub fn set_active_character(&mut self, name: String) {
        self.active_character = Some(name);
        self.merge_open = false;
        self.pending_parenthetical = None;
    }

    /// An action line or scene heading ended the speaker's run.
    pub fn clear_active_character(&mut self) {
        self.active_character = None;
        self.merge_open = false;
        self.pending_parenthetical = None;
    }

    /// Hold a stage direction for the next dialogue line of the active speaker.
    /// A direction in the middle of a run closes the current utterance.
    pub fn note_parenthetical(&mut self, text: String) {
        if self.active_character.is_none() {
            return;
        }
        self.merge_open = false;
        self.pending_parenthetical = (!text.is_empty()).then_some(text);
    }

    /// Append `text` to the last utterance if it belongs to the active speaker
    /// and is still open, otherwise start a new one. No-op without an active speaker.
    pub fn add_or_merge_line(
        &mut self,
        dialogue: &mut Vec<DialogueLine>,
        text: &str,
        ids: &mut dyn IdGenerator,
    ) {
        let Some(character) = self.active_character.as_deref() else {
            return;
        };

        if self.merge_open {
            if let Some(last) = dialogue.last_mut().filter(|l| l.character == character) {
                last.text.push(' ');
                last.text.push_str(text);
                return;
            }
        }

        dialogue.push(DialogueLine {
            id: ids.next_id(),
            character: character.to_string(),
            text: text.to_string(),
            parenthetical: self.pending_parenthetical.take(),
        });
        self.merge_open = true;
    }
}
