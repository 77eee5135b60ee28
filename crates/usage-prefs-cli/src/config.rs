//! Optional TOML configuration: a custom label vocabulary and per-label
//! defaults.
//!
//! ```toml
//! fallback = "deny"
//!
//! [[label]]
//! name = "tdm"
//!
//! [[label]]
//! name = "example"
//! narrows = "tdm"
//!
//! [defaults]
//! example = "allow"
//! ```
//!
//! Without any `[[label]]` entries the standard vocabulary is used.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use usage_prefs::{Decision, Hierarchy, Policy};

/// A default decision as written in the config file or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDecision {
    Allow,
    Deny,
}

impl From<DefaultDecision> for Decision {
    fn from(value: DefaultDecision) -> Self {
        match value {
            DefaultDecision::Allow => Decision::Allowed,
            DefaultDecision::Deny => Decision::Denied,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
    pub name: String,
    #[serde(default)]
    pub narrows: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, rename = "label")]
    pub labels: Vec<LabelConfig>,
    #[serde(default)]
    pub defaults: BTreeMap<String, DefaultDecision>,
    #[serde(default)]
    pub fallback: Option<DefaultDecision>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing TOML")
    }

    pub fn hierarchy(&self) -> Result<Hierarchy> {
        if self.labels.is_empty() {
            return Ok(Hierarchy::standard());
        }
        let builder = self
            .labels
            .iter()
            .fold(Hierarchy::builder(), |builder, label| match &label.narrows {
                Some(broader) => builder.narrows(&label.name, broader),
                None => builder.label(&label.name),
            });
        builder.build().context("invalid label hierarchy")
    }

    /// Builds the policy. `fallback` from the command line overrides the
    /// config file; with neither, unconfigured labels are denied.
    pub fn policy(
        &self,
        hierarchy: &Hierarchy,
        fallback: Option<DefaultDecision>,
    ) -> Result<Policy> {
        let fallback = fallback.or(self.fallback).unwrap_or(DefaultDecision::Deny);
        let builder = self
            .defaults
            .iter()
            .fold(Policy::builder(hierarchy), |builder, (label, &decision)| {
                builder.default_for(label, decision.into())
            })
            .fallback(fallback.into());
        builder.build().context("invalid default policy")
    }
}
