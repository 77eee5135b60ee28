use crate::decision::Decision;

/// The preference recorded for a single label.
///
/// Values form a small lattice for merging: `No` dominates `Yes`, which
/// dominates `Unknown`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    /// No preference has been expressed.
    #[default]
    Unknown,
    /// The usage was explicitly permitted.
    Yes,
    /// The usage was explicitly refused.
    No,
}

impl TriState {
    /// Combines two states.
    ///
    /// The operation is commutative, associative and idempotent, so folding
    /// it over any sequence of values yields the same result regardless of
    /// order.
    ///
    /// # Example
    ///
    /// ```
    /// use usage_prefs::TriState;
    ///
    /// assert_eq!(TriState::Yes.merge(TriState::No), TriState::No);
    /// assert_eq!(TriState::Unknown.merge(TriState::Yes), TriState::Yes);
    /// ```
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (TriState::No, _) | (_, TriState::No) => TriState::No,
            (TriState::Yes, _) | (_, TriState::Yes) => TriState::Yes,
            (TriState::Unknown, TriState::Unknown) => TriState::Unknown,
        }
    }

    /// Returns `true` if a preference (either way) has been expressed.
    pub fn is_concrete(self) -> bool {
        !matches!(self, TriState::Unknown)
    }

    /// Maps a concrete state to a decision.
    pub fn decision(self) -> Option<Decision> {
        match self {
            TriState::Unknown => None,
            TriState::Yes => Some(Decision::Allowed),
            TriState::No => Some(Decision::Denied),
        }
    }

    /// Interprets a directive value. Only the exact strings `y` and `n`
    /// carry meaning.
    pub(crate) fn from_value(value: &[u8]) -> Option<Self> {
        match value {
            b"y" => Some(TriState::Yes),
            b"n" => Some(TriState::No),
            _ => None,
        }
    }
}

impl From<Decision> for TriState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allowed => TriState::Yes,
            Decision::Denied => TriState::No,
        }
    }
}
