use crate::decision::Decision;
use crate::error::ConfigurationError;
use crate::hierarchy::{Hierarchy, LabelId};

/// The decision an automaton falls back to, per label, when the content
/// expresses no applicable preference.
///
/// A policy is total over the labels of the hierarchy it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    defaults: Vec<Decision>,
}

impl Policy {
    /// Creates a policy with the same default for every label.
    ///
    /// # Example
    ///
    /// ```
    /// use usage_prefs::{Decision, Hierarchy, Policy};
    ///
    /// let hierarchy = Hierarchy::standard();
    /// let policy = Policy::uniform(&hierarchy, Decision::Allowed);
    /// let genai = hierarchy.id("genai").unwrap();
    /// assert_eq!(policy.default_for(genai), Decision::Allowed);
    /// ```
    pub fn uniform(hierarchy: &Hierarchy, decision: Decision) -> Self {
        Self {
            defaults: vec![decision; hierarchy.len()],
        }
    }

    /// Starts building a policy with per-label defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use usage_prefs::{Decision, Hierarchy, Policy};
    ///
    /// let hierarchy = Hierarchy::standard();
    /// let policy = Policy::builder(&hierarchy)
    ///     .allow("search")
    ///     .fallback(Decision::Denied)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(policy.default_for(hierarchy.id("search").unwrap()), Decision::Allowed);
    /// assert_eq!(policy.default_for(hierarchy.id("ai").unwrap()), Decision::Denied);
    /// ```
    pub fn builder(hierarchy: &Hierarchy) -> PolicyBuilder<'_> {
        PolicyBuilder {
            hierarchy,
            defaults: Vec::new(),
            fallback: None,
        }
    }

    /// Returns the default decision for a label.
    ///
    /// Labels outside the policy's hierarchy are denied.
    pub fn default_for(&self, id: LabelId) -> Decision {
        self.defaults
            .get(id.index())
            .copied()
            .unwrap_or(Decision::Denied)
    }
}

/// Builder for [`Policy`], see [`Policy::builder`].
#[derive(Debug, Clone)]
pub struct PolicyBuilder<'h> {
    hierarchy: &'h Hierarchy,
    defaults: Vec<(String, Decision)>,
    fallback: Option<Decision>,
}

impl PolicyBuilder<'_> {
    /// Sets the default for a label. Later settings for the same label win.
    pub fn default_for(mut self, label: impl Into<String>, decision: Decision) -> Self {
        self.defaults.push((label.into(), decision));
        self
    }

    /// Allows a label by default.
    pub fn allow(self, label: impl Into<String>) -> Self {
        self.default_for(label, Decision::Allowed)
    }

    /// Denies a label by default.
    pub fn deny(self, label: impl Into<String>) -> Self {
        self.default_for(label, Decision::Denied)
    }

    /// Sets the default for every label not configured explicitly.
    pub fn fallback(mut self, decision: Decision) -> Self {
        self.fallback = Some(decision);
        self
    }

    /// Checks that every label has a default and builds the policy.
    pub fn build(self) -> Result<Policy, ConfigurationError> {
        let mut defaults = vec![self.fallback; self.hierarchy.len()];
        for (label, decision) in self.defaults {
            let id = self
                .hierarchy
                .id(&label)
                .ok_or(ConfigurationError::UnknownLabel(label))?;
            defaults[id.index()] = Some(decision);
        }

        let defaults = defaults
            .into_iter()
            .zip(self.hierarchy.labels())
            .map(|(decision, (_, name))| {
                decision.ok_or_else(|| ConfigurationError::MissingDefault(name.to_string()))
            })
            .collect::<Result<_, _>>()?;

        Ok(Policy { defaults })
    }
}
