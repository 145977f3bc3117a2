use crate::model::ids::OptionId;
use crate::model::question::QuestionKind;

/// Options chosen for the current question, in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSelection {
    selected: Vec<OptionId>,
}

impl OptionSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on `option`.
    ///
    /// Multi-select toggles membership. Single-select replaces the selection,
    /// except that clicking the already-selected option clears it.
    pub fn toggle(&mut self, option: OptionId, kind: QuestionKind) {
        let already = self.selected.contains(&option);
        match kind {
            QuestionKind::MultiSelect => {
                if already {
                    self.selected.retain(|id| *id != option);
                } else {
                    self.selected.push(option);
                }
            }
            QuestionKind::SingleSelect => {
                if already {
                    self.selected.retain(|id| *id != option);
                } else {
                    self.selected.clear();
                    self.selected.push(option);
                }
            }
        }
    }

    #[must_use]
    pub fn contains(&self, option: OptionId) -> bool {
        self.selected.contains(&option)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[OptionId] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
