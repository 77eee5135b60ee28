use crate::hierarchy::{Hierarchy, LabelId};
use crate::state::TriState;

/// The preferences gathered for one content item, one [`TriState`] per label.
///
/// A record is created for a specific [`Hierarchy`], filled by one or more
/// calls to [`parse`](crate::parse), and then evaluated against any number of
/// usages. All labels start out [`TriState::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRecord {
    states: Vec<TriState>,
}

impl PreferenceRecord {
    /// Creates an empty record covering every label of `hierarchy`.
    pub fn new(hierarchy: &Hierarchy) -> Self {
        Self {
            states: vec![TriState::Unknown; hierarchy.len()],
        }
    }

    /// Returns the recorded state of a label.
    ///
    /// Labels the record does not cover read as [`TriState::Unknown`].
    pub fn get(&self, id: LabelId) -> TriState {
        self.states.get(id.index()).copied().unwrap_or_default()
    }

    /// Returns the recorded state of a label by name.
    ///
    /// Returns `None` if the label is unknown to `hierarchy`.
    pub fn state(&self, hierarchy: &Hierarchy, name: &str) -> Option<TriState> {
        hierarchy.id(name).map(|id| self.get(id))
    }

    /// Folds `value` into the state of a label.
    ///
    /// Returns `false` if the record does not cover the label.
    pub(crate) fn merge_label(&mut self, id: LabelId, value: TriState) -> bool {
        match self.states.get_mut(id.index()) {
            Some(state) => {
                *state = state.merge(value);
                true
            }
            None => false,
        }
    }

    /// Combines another record into this one, label by label.
    ///
    /// Both records must come from the same hierarchy; labels beyond the
    /// shorter record are left untouched.
    pub fn merge(&mut self, other: &Self) {
        for (state, theirs) in self.states.iter_mut().zip(&other.states) {
            *state = state.merge(*theirs);
        }
    }

    /// Forgets every recorded preference.
    pub fn reset(&mut self) {
        self.states.fill(TriState::Unknown);
    }

    /// Returns `true` if no preference is recorded for any label.
    pub fn is_empty(&self) -> bool {
        self.states.iter().all(|s| !s.is_concrete())
    }

    /// Iterates over every label and its state.
    pub fn iter(&self) -> impl Iterator<Item = (LabelId, TriState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, &s)| (LabelId::from_index(i), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_unknown() {
        let h = Hierarchy::standard();
        let record = PreferenceRecord::new(&h);
        assert!(record.is_empty());
        assert_eq!(record.iter().count(), h.len());
        assert!(record.iter().all(|(_, s)| s == TriState::Unknown));
        assert_eq!(record.state(&h, "tdm"), Some(TriState::Unknown));
        assert_eq!(record.state(&h, "nope"), None);
    }

    #[test]
    fn test_merge_label() {
        let h = Hierarchy::standard();
        let ai = h.id("ai").unwrap();
        let mut record = PreferenceRecord::new(&h);
        assert!(record.merge_label(ai, TriState::Yes));
        assert!(record.merge_label(ai, TriState::No));
        assert!(record.merge_label(ai, TriState::Yes));
        assert_eq!(record.get(ai), TriState::No);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_merge_label_out_of_range() {
        let small = Hierarchy::builder().label("a").build().unwrap();
        let large = Hierarchy::standard();
        let mut record = PreferenceRecord::new(&small);
        let search = large.id("search").unwrap();
        assert!(!record.merge_label(search, TriState::No));
        assert_eq!(record.get(search), TriState::Unknown);
    }

    #[test]
    fn test_merge_records() {
        let h = Hierarchy::standard();
        let (tdm, ai, search) = (
            h.id("tdm").unwrap(),
            h.id("ai").unwrap(),
            h.id("search").unwrap(),
        );
        let mut a = PreferenceRecord::new(&h);
        a.merge_label(tdm, TriState::Yes);
        a.merge_label(ai, TriState::Yes);
        let mut b = PreferenceRecord::new(&h);
        b.merge_label(ai, TriState::No);
        b.merge_label(search, TriState::Yes);

        a.merge(&b);
        assert_eq!(a.get(tdm), TriState::Yes);
        assert_eq!(a.get(ai), TriState::No);
        assert_eq!(a.get(search), TriState::Yes);
    }

    #[test]
    fn test_reset() {
        let h = Hierarchy::standard();
        let mut record = PreferenceRecord::new(&h);
        record.merge_label(h.id("genai").unwrap(), TriState::No);
        record.reset();
        assert!(record.is_empty());
    }
}
