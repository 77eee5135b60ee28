/// The verdict reached for one usage of one content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The automated usage is permitted.
    Allowed,
    /// The automated usage is forbidden.
    Denied,
}

impl Decision {
    /// Returns `true` for [`Decision::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Returns `true` for [`Decision::Denied`].
    pub fn is_denied(self) -> bool {
        matches!(self, Decision::Denied)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allowed => write!(f, "allowed"),
            Decision::Denied => write!(f, "denied"),
        }
    }
}
