//! What started a resolution attempt.

use autosyntax_rules::EventKind;

/// Location of a text change, measured before the change was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditHint {
	pub row: u32,
	/// Char offset from the start of the document.
	pub offset: usize,
}

/// A host event asking for a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
	pub event: EventKind,
	/// Only act when the document currently has the plain-text syntax.
	pub must_plaintext: bool,
	/// Where the change happened, for `Modify` triggers.
	pub edit: Option<EditHint>,
}

impl Trigger {
	pub fn new(event: EventKind) -> Self {
		Self {
			event,
			must_plaintext: false,
			edit: None,
		}
	}

	pub fn must_plaintext(mut self, must_plaintext: bool) -> Self {
		self.must_plaintext = must_plaintext;
		self
	}

	/// Decides whether a text change is worth a `Modify` attempt.
	///
	/// Only single-selection edits on the first line or within the last two
	/// chars qualify; typing elsewhere in a document never re-resolves it.
	pub fn for_text_change(changes: &[EditHint], selection_count: usize, doc_chars: usize) -> Option<Self> {
		let first = *changes.first()?;
		let at_edge = first.row == 0 || first.offset.saturating_add(2) >= doc_chars;
		(selection_count <= 1 && at_edge).then(|| Self {
			event: EventKind::Modify,
			must_plaintext: true,
			edit: Some(first),
		})
	}

	/// Whether the edit that caused this trigger is on the first line.
	pub fn edits_first_line(&self) -> bool {
		self.edit.is_none_or(|edit| edit.row == 0)
	}
}

impl From<EventKind> for Trigger {
	fn from(event: EventKind) -> Self {
		Self::new(event)
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn edit(row: u32, offset: usize) -> EditHint {
		EditHint { row, offset }
	}

	#[rstest]
	#[case::first_line(edit(0, 5), 1, 100, true)]
	#[case::near_end(edit(9, 98), 1, 100, true)]
	#[case::middle(edit(4, 50), 1, 100, false)]
	#[case::multi_cursor(edit(0, 0), 2, 100, false)]
	#[case::no_selection(edit(3, 1), 0, 2, true)]
	fn test_text_change_gate(
		#[case] change: EditHint,
		#[case] selections: usize,
		#[case] doc_chars: usize,
		#[case] expected: bool,
	) {
		let trigger = Trigger::for_text_change(&[change], selections, doc_chars);
		assert_eq!(trigger.is_some(), expected);
		if let Some(trigger) = trigger {
			assert_eq!(trigger.event, EventKind::Modify);
			assert!(trigger.must_plaintext);
			assert_eq!(trigger.edit, Some(change));
		}
	}

	#[test]
	fn test_no_changes_no_trigger() {
		assert_eq!(Trigger::for_text_change(&[], 1, 10), None);
	}

	#[test]
	fn test_edits_first_line() {
		assert!(Trigger::new(EventKind::Load).edits_first_line());
		assert!(Trigger::for_text_change(&[edit(0, 3)], 1, 100).unwrap().edits_first_line());
		assert!(!Trigger::for_text_change(&[edit(2, 99)], 1, 100).unwrap().edits_first_line());
	}
}
