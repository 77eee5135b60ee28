//! usage-prefs: parsing and resolution of content usage preferences.
//!
//! A content owner states how automated systems may use their content with a
//! short expression such as `tdm=y, genai=n`. This crate parses such
//! expressions into a [`PreferenceRecord`] and resolves the record, through a
//! [`Hierarchy`] of usage labels and a default [`Policy`], into a
//! [`Decision`] for a given usage.
//!
//! # Example
//!
//! ```
//! use usage_prefs::{evaluate, parse, Decision, Hierarchy, Policy, PreferenceRecord};
//!
//! let hierarchy = Hierarchy::standard();
//! let policy = Policy::uniform(&hierarchy, Decision::Allowed);
//!
//! let mut record = PreferenceRecord::new(&hierarchy);
//! // Preferences may arrive from several sources for the same content.
//! parse("tdm=y, ai=n", &mut record, &hierarchy, None);
//! parse("genai=y", &mut record, &hierarchy, None);
//!
//! assert_eq!(evaluate(&record, "search", &hierarchy, &policy), Some(Decision::Allowed));
//! assert_eq!(evaluate(&record, "ai", &hierarchy, &policy), Some(Decision::Denied));
//! assert_eq!(evaluate(&record, "genai", &hierarchy, &policy), Some(Decision::Allowed));
//! ```
//!
//! Parsing never fails: malformed directives, unknown labels and values other
//! than `y` and `n` are ignored. The only errors are [`ConfigurationError`]s,
//! raised while building a hierarchy or policy.

mod decision;
mod error;
pub mod hierarchy;
mod parser;
mod policy;
mod record;
mod resolver;
mod state;
pub mod tokenizer;

#[cfg(feature = "header")]
pub mod header;
#[cfg(feature = "robots")]
pub mod robots;

pub use decision::Decision;
pub use error::ConfigurationError;
pub use hierarchy::{labels, Closure, Hierarchy, HierarchyBuilder, LabelId, LabelSet};
pub use parser::{parse, ParseSummary, Parser};
pub use policy::{Policy, PolicyBuilder};
pub use record::PreferenceRecord;
pub use resolver::{evaluate, evaluate_all, resolve, resolve_detailed, Resolution};
pub use state::TriState;
