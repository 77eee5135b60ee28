//! Turning a [`PreferenceRecord`] into a [`Decision`] for a usage.
//!
//! Resolution walks the usage's closure from the most general label to the
//! most specific one. A label without a preference of its own inherits the
//! preference of its nearest ancestor in the closure that has one; a label
//! with its own preference keeps it, so the most specific preference wins.
//! Labels that are still unknown afterwards take the policy default. The
//! usage is denied if any of the most specific labels of the closure ends up
//! refused, and allowed otherwise.
//!
//! # Example
//!
//! ```
//! use usage_prefs::{evaluate, parse, Decision, Hierarchy, Policy, PreferenceRecord};
//!
//! let hierarchy = Hierarchy::standard();
//! let policy = Policy::uniform(&hierarchy, Decision::Allowed);
//! let mut record = PreferenceRecord::new(&hierarchy);
//! parse("genai=y, ai=n", &mut record, &hierarchy, None);
//!
//! assert_eq!(evaluate(&record, "genai", &hierarchy, &policy), Some(Decision::Allowed));
//! assert_eq!(evaluate(&record, "ai", &hierarchy, &policy), Some(Decision::Denied));
//! assert_eq!(evaluate(&record, "crawl", &hierarchy, &policy), None);
//! ```

use crate::decision::Decision;
use crate::hierarchy::{Closure, Hierarchy, LabelId};
use crate::policy::Policy;
use crate::record::PreferenceRecord;
use crate::state::TriState;

/// The full outcome of resolving one closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    effective: Vec<(LabelId, TriState)>,
    deciding: Vec<LabelId>,
    decision: Decision,
}

impl Resolution {
    /// Returns the final decision.
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// Returns every closure label with its state after propagation and
    /// policy defaults, most general first. No entry is `Unknown`.
    pub fn effective(&self) -> &[(LabelId, TriState)] {
        &self.effective
    }

    /// Returns the most specific labels of the closure, whose effective
    /// states determine the decision.
    pub fn deciding(&self) -> &[LabelId] {
        &self.deciding
    }
}

/// Resolves a closure to a decision.
///
/// `record`, `closure` and `policy` must all belong to `hierarchy`.
pub fn resolve(
    record: &PreferenceRecord,
    closure: &Closure,
    hierarchy: &Hierarchy,
    policy: &Policy,
) -> Decision {
    let effective = effective_states(record, closure, hierarchy, policy);
    let labels = closure.labels();
    for (i, &id) in labels.iter().enumerate() {
        if is_deciding(id, labels, hierarchy) && effective[i] == TriState::No {
            return Decision::Denied;
        }
    }
    Decision::Allowed
}

/// Resolves a closure and keeps the intermediate states, for auditing.
pub fn resolve_detailed(
    record: &PreferenceRecord,
    closure: &Closure,
    hierarchy: &Hierarchy,
    policy: &Policy,
) -> Resolution {
    let effective = effective_states(record, closure, hierarchy, policy);
    let labels = closure.labels();
    let deciding: Vec<_> = labels
        .iter()
        .copied()
        .filter(|&id| is_deciding(id, labels, hierarchy))
        .collect();
    let denied = labels
        .iter()
        .zip(&effective)
        .any(|(id, &state)| state == TriState::No && deciding.contains(id));

    Resolution {
        effective: labels.iter().copied().zip(effective).collect(),
        deciding,
        decision: if denied {
            Decision::Denied
        } else {
            Decision::Allowed
        },
    }
}

/// Evaluates a record for a single usage label.
///
/// Returns `None` if `usage` is not a label of `hierarchy`.
pub fn evaluate(
    record: &PreferenceRecord,
    usage: &str,
    hierarchy: &Hierarchy,
    policy: &Policy,
) -> Option<Decision> {
    let closure = hierarchy.closure_for(usage)?;
    let decision = resolve(record, &closure, hierarchy, policy);
    tracing::debug!(usage, %decision, "evaluated usage");
    Some(decision)
}

/// Evaluates a record for a use that falls under several usage labels at
/// once. Each label is resolved on its own and the use is denied if any of
/// them is, even when one label narrows another.
///
/// Returns `None` if no usage is given or any of them is unknown.
pub fn evaluate_all<I, S>(
    record: &PreferenceRecord,
    usages: I,
    hierarchy: &Hierarchy,
    policy: &Policy,
) -> Option<Decision>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = None;
    for usage in usages {
        let decision = evaluate(record, usage.as_ref(), hierarchy, policy)?;
        if result != Some(Decision::Denied) {
            result = Some(decision);
        }
    }
    result
}

/// Computes the state of every closure label after propagation and policy
/// defaults, in closure order.
fn effective_states(
    record: &PreferenceRecord,
    closure: &Closure,
    hierarchy: &Hierarchy,
    policy: &Policy,
) -> Vec<TriState> {
    let labels = closure.labels();
    let mut propagated: Vec<TriState> = Vec::with_capacity(labels.len());

    // Ancestors precede their descendants in `labels`, so the nearest
    // ancestor's value is already final when a label is reached.
    for &id in labels {
        let own = record.get(id);
        let state = if own.is_concrete() {
            own
        } else {
            hierarchy
                .ancestors(id)
                .find_map(|a| labels.iter().position(|&l| l == a))
                .map_or(TriState::Unknown, |i| propagated[i])
        };
        propagated.push(state);
    }

    // Defaults only apply once propagation is complete.
    labels
        .iter()
        .zip(propagated)
        .map(|(&id, state)| match state {
            TriState::Unknown => policy.default_for(id).into(),
            concrete => concrete,
        })
        .collect()
}

/// A label decides when no other closure label narrows it.
fn is_deciding(id: LabelId, labels: &[LabelId], hierarchy: &Hierarchy) -> bool {
    !labels.iter().any(|&other| hierarchy.is_ancestor(id, other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn record(hierarchy: &Hierarchy, expression: &str) -> PreferenceRecord {
        let mut record = PreferenceRecord::new(hierarchy);
        parse(expression, &mut record, hierarchy, None);
        record
    }

    fn eval(expression: &str, usage: &str, default: Decision) -> Decision {
        let h = Hierarchy::standard();
        let policy = Policy::uniform(&h, default);
        evaluate(&record(&h, expression), usage, &h, &policy).unwrap()
    }

    const USAGES: [&str; 4] = ["tdm", "ai", "genai", "search"];

    #[test]
    fn test_allow_everything() {
        for usage in USAGES {
            assert_eq!(eval("tdm=y", usage, Decision::Denied), Decision::Allowed);
        }
    }

    #[test]
    fn test_deny_everything() {
        for usage in USAGES {
            assert_eq!(eval("tdm=n", usage, Decision::Allowed), Decision::Denied);
        }
    }

    #[test]
    fn test_allow_ai_only() {
        let expr = "ai=y";
        assert_eq!(eval(expr, "tdm", Decision::Denied), Decision::Denied);
        assert_eq!(eval(expr, "ai", Decision::Denied), Decision::Allowed);
        assert_eq!(eval(expr, "genai", Decision::Denied), Decision::Allowed);
        assert_eq!(eval(expr, "search", Decision::Denied), Decision::Denied);
    }

    #[test]
    fn test_deny_search_only() {
        let expr = "search=n";
        assert_eq!(eval(expr, "tdm", Decision::Allowed), Decision::Allowed);
        assert_eq!(eval(expr, "ai", Decision::Allowed), Decision::Allowed);
        assert_eq!(eval(expr, "genai", Decision::Allowed), Decision::Allowed);
        assert_eq!(eval(expr, "search", Decision::Allowed), Decision::Denied);
    }

    #[test]
    fn test_specific_beats_general() {
        let expr = "genai=y,ai=n";
        assert_eq!(eval(expr, "genai", Decision::Denied), Decision::Allowed);
        assert_eq!(eval(expr, "ai", Decision::Allowed), Decision::Denied);

        let expr = "tdm=n,search=y";
        assert_eq!(eval(expr, "search", Decision::Denied), Decision::Allowed);
        assert_eq!(eval(expr, "ai", Decision::Allowed), Decision::Denied);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        // genai has no preference; ai is nearer than tdm.
        let expr = "tdm=y,ai=n";
        assert_eq!(eval(expr, "genai", Decision::Allowed), Decision::Denied);
        let expr = "tdm=n,ai=y";
        assert_eq!(eval(expr, "genai", Decision::Denied), Decision::Allowed);
    }

    #[test]
    fn test_policy_applies_after_propagation() {
        let h = Hierarchy::standard();
        let policy = Policy::builder(&h)
            .deny("genai")
            .fallback(Decision::Allowed)
            .build()
            .unwrap();
        // The inherited `y` wins over genai's own default.
        assert_eq!(
            evaluate(&record(&h, "ai=y"), "genai", &h, &policy),
            Some(Decision::Allowed)
        );
        // With nothing to inherit the default applies.
        assert_eq!(
            evaluate(&record(&h, "search=y"), "genai", &h, &policy),
            Some(Decision::Denied)
        );
    }

    #[test]
    fn test_general_default_does_not_override_specific() {
        let h = Hierarchy::standard();
        let policy = Policy::builder(&h)
            .deny("tdm")
            .fallback(Decision::Allowed)
            .build()
            .unwrap();
        assert_eq!(
            evaluate(&record(&h, "genai=y"), "genai", &h, &policy),
            Some(Decision::Allowed)
        );
        assert_eq!(
            evaluate(&record(&h, ""), "genai", &h, &policy),
            Some(Decision::Allowed)
        );
        assert_eq!(
            evaluate(&record(&h, ""), "tdm", &h, &policy),
            Some(Decision::Denied)
        );
    }

    #[test]
    fn test_unknown_usage() {
        let h = Hierarchy::standard();
        let policy = Policy::uniform(&h, Decision::Allowed);
        assert_eq!(evaluate(&record(&h, "tdm=y"), "train-ai", &h, &policy), None);
    }

    #[test]
    fn test_any_label_denies() {
        let h = Hierarchy::standard();
        let policy = Policy::uniform(&h, Decision::Allowed);
        let r = record(&h, "genai=y,search=n");
        assert_eq!(
            evaluate_all(&r, ["genai", "search"], &h, &policy),
            Some(Decision::Denied)
        );
        let r = record(&h, "genai=y,search=y,tdm=n");
        assert_eq!(
            evaluate_all(&r, ["genai", "search"], &h, &policy),
            Some(Decision::Allowed)
        );
        assert_eq!(evaluate_all(&r, ["genai", "nope"], &h, &policy), None);
        assert_eq!(evaluate_all(&r, Vec::<&str>::new(), &h, &policy), None);

        // A refused broader label still denies a use also classified under a
        // permitted narrower one.
        let r = record(&h, "genai=y,ai=n");
        assert_eq!(
            evaluate_all(&r, ["genai", "ai"], &h, &policy),
            Some(Decision::Denied)
        );
    }

    #[test]
    fn test_detailed() {
        let h = Hierarchy::standard();
        let policy = Policy::uniform(&h, Decision::Denied);
        let closure = h.closure_for("genai").unwrap();
        let resolution = resolve_detailed(&record(&h, "ai=y"), &closure, &h, &policy);

        assert_eq!(resolution.decision(), Decision::Allowed);
        let states: Vec<_> = resolution
            .effective()
            .iter()
            .map(|&(id, s)| (h.name(id), s))
            .collect();
        assert_eq!(
            states,
            vec![
                ("tdm", TriState::No),
                ("ai", TriState::Yes),
                ("genai", TriState::Yes),
            ]
        );
        assert_eq!(resolution.deciding(), &[h.id("genai").unwrap()]);
    }

    #[test]
    fn test_detailed_agrees_with_resolve() {
        let h = Hierarchy::standard();
        let policy = Policy::builder(&h)
            .allow("search")
            .fallback(Decision::Denied)
            .build()
            .unwrap();
        for expr in ["", "tdm=y", "ai=n", "genai=y,tdm=n", "search=n,ai=y"] {
            let r = record(&h, expr);
            for usages in [&["genai"][..], &["search"][..], &["ai", "search"][..], &["tdm"][..]] {
                let closure = h.closure_for_all(usages).unwrap();
                assert_eq!(
                    resolve(&r, &closure, &h, &policy),
                    resolve_detailed(&r, &closure, &h, &policy).decision(),
                    "{expr} / {usages:?}"
                );
            }
        }
    }

    #[test]
    fn test_record_reused_across_usages() {
        let h = Hierarchy::standard();
        let policy = Policy::uniform(&h, Decision::Allowed);
        let r = record(&h, "tdm=y,ai=n,search=y");
        let verdicts: Vec<_> = USAGES
            .iter()
            .map(|usage| evaluate(&r, usage, &h, &policy).unwrap())
            .collect();
        assert_eq!(
            verdicts,
            vec![
                Decision::Allowed,
                Decision::Denied,
                Decision::Denied,
                Decision::Allowed,
            ]
        );
    }
}
