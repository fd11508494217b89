use crate::draft::DraftStore;
use crate::models::{Field, ResumeDraft};

/// The editable resume form. Every change is written through to the draft
/// store before returning.
pub struct FormState {
    draft: ResumeDraft,
    focus: Field,
    store: Box<dyn DraftStore>,
}

impl FormState {
    /// Restores the last saved draft from `store`.
    pub fn restore(store: Box<dyn DraftStore>) -> Self {
        let draft = store.load();
        Self {
            draft,
            focus: Field::Summary,
            store,
        }
    }

    pub fn draft(&self) -> &ResumeDraft {
        &self.draft
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn is_valid(&self) -> bool {
        self.draft.is_valid()
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        *self.draft.get_mut(field) = value;
        self.persist();
    }

    pub fn reset(&mut self) {
        self.replace(ResumeDraft::default());
    }

    pub fn prefill_sample(&mut self) {
        self.replace(ResumeDraft::sample());
    }

    fn replace(&mut self, draft: ResumeDraft) {
        self.draft = draft;
        self.persist();
    }

    fn persist(&self) {
        self.store.save(&self.draft);
    }

    // --- Focused-field editing ---

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn push_char(&mut self, c: char) {
        let mut value = self.draft.get(self.focus).to_string();
        value.push(c);
        self.set_field(self.focus, value);
    }

    pub fn pop_char(&mut self) {
        let mut value = self.draft.get(self.focus).to_string();
        if value.pop().is_some() {
            self.set_field(self.focus, value);
        }
    }

    pub fn clear_focused(&mut self) {
        if !self.draft.get(self.focus).is_empty() {
            self.set_field(self.focus, String::new());
        }
    }
}
