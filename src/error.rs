use thiserror::Error;

/// A problem with a label hierarchy or policy, found while building it.
///
/// These errors only arise at construction time. Parsing and evaluating
/// expressions never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A label was declared with an empty name.
    #[error("label names cannot be empty")]
    EmptyLabel,

    /// A label name can never appear in an expression.
    #[error("invalid label `{label}`: {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    /// The same label was declared twice.
    #[error("duplicate label `{0}`")]
    DuplicateLabel(String),

    /// A label narrows a label that was never declared.
    #[error("label `{label}` narrows undeclared label `{broader}`")]
    UnknownBroader { label: String, broader: String },

    /// Following the narrows relation from this label leads back to it.
    #[error("label `{0}` is part of a narrows cycle")]
    Cycle(String),

    /// A policy names a label the hierarchy does not know.
    #[error("policy refers to unknown label `{0}`")]
    UnknownLabel(String),

    /// A policy has no default for a label.
    #[error("policy has no default for label `{0}`")]
    MissingDefault(String),
}
