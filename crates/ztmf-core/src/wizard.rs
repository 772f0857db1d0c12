//! Guarded linear navigation through the questionnaire.
//!
//! The wizard sits on one position of a [`Sequence`]. Moving away from a
//! question whose answer or notes differ from what was last saved does not
//! move immediately: it parks the target and asks for a [`Decision`]. The
//! first position disables `Back`, the last disables `Next`, and nothing
//! wraps.

use crate::sequence::Sequence;

/// Navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Next,
    Back,
    /// Jump straight to a function, as when picking it from the sidebar.
    Jump(i64),
}

/// Answer to a pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stay,
    Discard,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Position changed; holds the new function id.
    Moved(i64),
    /// Unsaved edits; the move waits on [`Wizard::resolve`].
    Confirm { target: i64 },
    /// Already there, or the user chose to stay.
    Stay,
    /// No such target (boundary or unknown function).
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Answer {
    option: Option<i64>,
    notes: String,
}

/// Questionnaire position plus the saved and edited answer for it.
#[derive(Debug, Clone)]
pub struct Wizard {
    sequence: Sequence,
    position: usize,
    saved: Answer,
    current: Answer,
    pending: Option<usize>,
}

impl Wizard {
    /// Start at the first question.
    pub fn new(sequence: Sequence) -> Self {
        Self {
            sequence,
            position: 0,
            saved: Answer::default(),
            current: Answer::default(),
            pending: None,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Function id of the active question; `None` for an empty questionnaire.
    pub fn current(&self) -> Option<i64> {
        self.sequence.at(self.position)
    }

    /// Function id waiting on a confirmation.
    pub fn pending(&self) -> Option<i64> {
        self.pending.and_then(|p| self.sequence.at(p))
    }

    /// Install the answer last saved on the backend for the active question.
    pub fn load_answer(&mut self, option: Option<i64>, notes: &str) {
        self.saved = Answer {
            option,
            notes: notes.to_owned(),
        };
        self.current = self.saved.clone();
    }

    pub fn select(&mut self, option: i64) {
        self.current.option = Some(option);
    }

    pub fn set_notes(&mut self, notes: &str) {
        notes.clone_into(&mut self.current.notes);
    }

    pub fn selected(&self) -> Option<i64> {
        self.current.option
    }

    pub fn notes(&self) -> &str {
        &self.current.notes
    }

    /// True when the edits differ from the saved answer. Clearing a choice
    /// does not count as an edit.
    pub fn is_dirty(&self) -> bool {
        (self.current.option.is_some() && self.current.option != self.saved.option)
            || self.current.notes != self.saved.notes
    }

    pub fn can_go_back(&self) -> bool {
        self.position > 0 && !self.sequence.is_empty()
    }

    pub fn can_go_next(&self) -> bool {
        self.position + 1 < self.sequence.len()
    }

    /// Ask to move.
    pub fn request(&mut self, nav: Nav) -> Step {
        let target = match nav {
            Nav::Next if self.can_go_next() => self.position + 1,
            Nav::Back if self.can_go_back() => self.position - 1,
            Nav::Jump(function_id) => match self.sequence.position(function_id) {
                Some(p) if p == self.position => return Step::Stay,
                Some(p) => p,
                None => return Step::Disabled,
            },
            Nav::Next | Nav::Back => return Step::Disabled,
        };

        if self.is_dirty() {
            self.pending = Some(target);
            match self.sequence.at(target) {
                Some(target) => Step::Confirm { target },
                None => Step::Disabled,
            }
        } else {
            self.move_to(target)
        }
    }

    /// Settle a pending confirmation. Without one, this is a no-op.
    pub fn resolve(&mut self, decision: Decision) -> Step {
        let Some(target) = self.pending.take() else {
            return Step::Stay;
        };
        match decision {
            Decision::Stay => Step::Stay,
            Decision::Discard => self.move_to(target),
        }
    }

    /// Record that the current edits were persisted.
    pub fn mark_saved(&mut self) {
        self.saved = self.current.clone();
    }

    /// Persist-then-continue: mark saved, then step forward if possible.
    pub fn save_and_advance(&mut self) -> Step {
        self.mark_saved();
        self.request(Nav::Next)
    }

    fn move_to(&mut self, target: usize) -> Step {
        let Some(function_id) = self.sequence.at(target) else {
            return Step::Disabled;
        };
        self.position = target;
        self.pending = None;
        self.saved = Answer::default();
        self.current = Answer::default();
        Step::Moved(function_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::tests::question;

    fn wizard() -> Wizard {
        Wizard::new(Sequence::build(vec![
            question(1, "Identity", 1, "Authentication"),
            question(2, "Identity", 1, "IdentityStores"),
            question(3, "Devices", 2, "PolicyEnforcement"),
        ]))
    }

    #[test]
    fn back_is_disabled_at_start() {
        let mut w = wizard();
        assert!(!w.can_go_back());
        assert_eq!(w.request(Nav::Back), Step::Disabled);
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn next_is_disabled_at_end() {
        let mut w = wizard();
        assert_eq!(w.request(Nav::Next), Step::Moved(2));
        assert_eq!(w.request(Nav::Next), Step::Moved(3));
        assert!(!w.can_go_next());
        assert_eq!(w.request(Nav::Next), Step::Disabled);
        assert_eq!(w.current(), Some(3));
    }

    #[test]
    fn clean_wizard_moves_freely() {
        let mut w = wizard();
        w.load_answer(Some(11), "notes");
        assert!(!w.is_dirty());
        assert_eq!(w.request(Nav::Jump(3)), Step::Moved(3));
        assert_eq!(w.request(Nav::Back), Step::Moved(2));
    }

    #[test]
    fn changed_choice_requires_confirmation() {
        let mut w = wizard();
        w.load_answer(Some(11), "");
        w.select(12);
        assert!(w.is_dirty());

        assert_eq!(w.request(Nav::Next), Step::Confirm { target: 2 });
        assert_eq!(w.position(), 0);
        assert_eq!(w.pending(), Some(2));

        assert_eq!(w.resolve(Decision::Stay), Step::Stay);
        assert_eq!(w.position(), 0);
        assert_eq!(w.pending(), None);
        assert_eq!(w.selected(), Some(12));
    }

    #[test]
    fn discard_moves_to_pending_target() {
        let mut w = wizard();
        w.request(Nav::Jump(3));
        w.set_notes("draft");
        assert_eq!(w.request(Nav::Back), Step::Confirm { target: 2 });
        assert_eq!(w.resolve(Decision::Discard), Step::Moved(2));
        assert_eq!(w.notes(), "");
        assert!(!w.is_dirty());
    }

    #[test]
    fn first_answer_counts_as_edit() {
        let mut w = wizard();
        w.load_answer(None, "");
        w.select(5);
        assert!(w.is_dirty());
    }

    #[test]
    fn jump_to_current_or_unknown() {
        let mut w = wizard();
        assert_eq!(w.request(Nav::Jump(1)), Step::Stay);
        assert_eq!(w.request(Nav::Jump(42)), Step::Disabled);
    }

    #[test]
    fn save_and_advance_skips_confirmation() {
        let mut w = wizard();
        w.load_answer(None, "");
        w.select(7);
        w.set_notes("done");
        assert_eq!(w.save_and_advance(), Step::Moved(2));
    }

    #[test]
    fn resolve_without_pending_is_noop() {
        let mut w = wizard();
        assert_eq!(w.resolve(Decision::Discard), Step::Stay);
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn empty_questionnaire_disables_everything() {
        let mut w = Wizard::new(Sequence::default());
        assert_eq!(w.current(), None);
        assert_eq!(w.request(Nav::Next), Step::Disabled);
        assert_eq!(w.request(Nav::Back), Step::Disabled);
    }
}
