//! Folding preference expressions into a [`PreferenceRecord`].
//!
//! Every token whose label the hierarchy knows and whose value is exactly `y`
//! or `n` is merged into the record: `n` always wins, `y` only fills a label
//! that is still unknown. Anything else is discounted without error, so the
//! outcome for a label never depends on the order of its directives and
//! parsing several expressions one after another equals parsing them joined
//! with commas.
//!
//! # Example
//!
//! ```
//! use usage_prefs::{parse, Hierarchy, PreferenceRecord, TriState};
//!
//! let hierarchy = Hierarchy::standard();
//! let mut record = PreferenceRecord::new(&hierarchy);
//!
//! parse("ai=y, ai=n, ai=y, unknown=y", &mut record, &hierarchy, None);
//! assert_eq!(record.state(&hierarchy, "ai"), Some(TriState::No));
//! ```

use crate::hierarchy::{Hierarchy, LabelSet};
use crate::record::PreferenceRecord;
use crate::state::TriState;
use crate::tokenizer::{Tokenizer, DEFAULT_BUDGET};

/// Counts of what happened to the directives of one expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Tokens merged into the record.
    pub applied: usize,
    /// Tokens naming a label the hierarchy does not know.
    pub unknown_label: usize,
    /// Tokens skipped by the interest filter.
    pub filtered: usize,
    /// Tokens with a value other than `y` or `n`.
    pub invalid_value: usize,
    /// Whether the budget cut the expression short.
    pub truncated: bool,
}

impl std::ops::AddAssign for ParseSummary {
    /// Accumulates the counts of another expression; `truncated` is set if
    /// either was cut short.
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.unknown_label += other.unknown_label;
        self.filtered += other.filtered;
        self.invalid_value += other.invalid_value;
        self.truncated |= other.truncated;
    }
}

/// A reusable parser bound to one hierarchy.
///
/// The parser holds the processing budget and an optional interest filter.
/// The free function [`parse`] covers the common case.
#[derive(Debug, Clone)]
pub struct Parser<'h> {
    hierarchy: &'h Hierarchy,
    interest: Option<&'h LabelSet>,
    budget: Option<usize>,
}

impl<'h> Parser<'h> {
    /// Creates a parser with the default budget and no interest filter.
    pub fn new(hierarchy: &'h Hierarchy) -> Self {
        Self {
            hierarchy,
            interest: None,
            budget: Some(DEFAULT_BUDGET),
        }
    }

    /// Sets the processing budget in bytes; `None` removes the limit.
    pub fn with_budget(mut self, budget: Option<usize>) -> Self {
        self.budget = budget;
        self
    }

    /// Restricts parsing to the labels in `interest`.
    ///
    /// Labels outside the filter are left untouched, so the record only
    /// answers correctly for usages whose closure lies within the filter.
    pub fn with_interest(mut self, interest: &'h LabelSet) -> Self {
        self.interest = Some(interest);
        self
    }

    /// Returns the hierarchy this parser resolves labels against.
    pub fn hierarchy(&self) -> &'h Hierarchy {
        self.hierarchy
    }

    /// Parses one expression into `record`.
    ///
    /// `record` must have been created from this parser's hierarchy.
    pub fn parse(
        &self,
        expression: impl AsRef<[u8]>,
        record: &mut PreferenceRecord,
    ) -> ParseSummary {
        let mut summary = ParseSummary::default();
        let mut tokens = Tokenizer::new(expression.as_ref()).with_budget(self.budget);

        for token in tokens.by_ref() {
            let Some(id) = self.hierarchy.lookup(token.label()) else {
                tracing::trace!(
                    label = %String::from_utf8_lossy(token.label()),
                    "ignoring unknown label"
                );
                summary.unknown_label += 1;
                continue;
            };
            if self.interest.is_some_and(|interest| !interest.contains(id)) {
                summary.filtered += 1;
                continue;
            }
            let Some(value) = TriState::from_value(token.value()) else {
                tracing::trace!(
                    label = self.hierarchy.name(id),
                    value = %String::from_utf8_lossy(token.value()),
                    "ignoring invalid value"
                );
                summary.invalid_value += 1;
                continue;
            };
            if record.merge_label(id, value) {
                summary.applied += 1;
            }
        }

        if tokens.exhausted_budget() {
            tracing::debug!(budget = ?self.budget, "expression exceeded processing budget");
            summary.truncated = true;
        }
        summary
    }
}

/// Parses `expression` into `record` with the default budget.
///
/// When `interest` is given, only those labels are updated. Malformed
/// directives are ignored; this function never fails.
pub fn parse(
    expression: impl AsRef<[u8]>,
    record: &mut PreferenceRecord,
    hierarchy: &Hierarchy,
    interest: Option<&LabelSet>,
) -> ParseSummary {
    let parser = Parser::new(hierarchy);
    match interest {
        Some(interest) => parser.with_interest(interest).parse(expression, record),
        None => parser.parse(expression, record),
    }
}
