//! Usage labels and the narrows relation between them.
//!
//! A [`Hierarchy`] is an arena of labels, each with at most one broader
//! label. It is built once through [`HierarchyBuilder`], which rejects
//! malformed names, duplicates, dangling references and cycles, and is
//! immutable afterwards.
//!
//! # Example
//!
//! ```
//! use usage_prefs::Hierarchy;
//!
//! let hierarchy = Hierarchy::builder()
//!     .label("tdm")
//!     .narrows("ai", "tdm")
//!     .narrows("genai", "ai")
//!     .build()
//!     .unwrap();
//!
//! let genai = hierarchy.id("genai").unwrap();
//! let names: Vec<_> = hierarchy
//!     .ancestors(genai)
//!     .map(|id| hierarchy.name(id))
//!     .collect();
//! assert_eq!(names, ["ai", "tdm"]);
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::error::ConfigurationError;

/// Names of the labels in the standard vocabulary.
pub mod labels {
    /// Text and data mining: any automated processing that analyses content
    /// to generate information such as patterns, trends and correlations.
    pub const TDM: &str = "tdm";
    /// Training or using artificial intelligence models.
    pub const AI: &str = "ai";
    /// Training or using generative AI models.
    pub const GENAI: &str = "genai";
    /// Search applications that direct users back to the content.
    pub const SEARCH: &str = "search";
}

/// Index of a label within the [`Hierarchy`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u32);

impl LabelId {
    /// Returns the position of this label in its hierarchy.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        LabelId(index as u32)
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    broader: Option<LabelId>,
    depth: usize,
}

/// An immutable forest of usage labels.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    by_name: HashMap<Vec<u8>, LabelId>,
}

impl Hierarchy {
    /// Starts declaring a custom hierarchy.
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::default()
    }

    /// The standard vocabulary: `tdm`, with `ai` and `search` narrowing it
    /// and `genai` narrowing `ai`.
    pub fn standard() -> Self {
        Self::builder()
            .label(labels::TDM)
            .narrows(labels::AI, labels::TDM)
            .narrows(labels::GENAI, labels::AI)
            .narrows(labels::SEARCH, labels::TDM)
            .build()
            .expect("the standard vocabulary is well formed")
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no labels are declared.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `name` is a label of this hierarchy.
    pub fn is_known(&self, name: &str) -> bool {
        self.by_name.contains_key(name.as_bytes())
    }

    /// Looks up a label by name.
    pub fn id(&self, name: &str) -> Option<LabelId> {
        self.lookup(name.as_bytes())
    }

    /// Looks up a label from raw directive bytes.
    pub(crate) fn lookup(&self, name: &[u8]) -> Option<LabelId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a label.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different, larger hierarchy.
    pub fn name(&self, id: LabelId) -> &str {
        &self.nodes[id.index()].name
    }

    /// Returns the label that `id` narrows, if any.
    pub fn broader_of(&self, id: LabelId) -> Option<LabelId> {
        self.nodes.get(id.index()).and_then(|n| n.broader)
    }

    /// Returns the number of ancestors of a label (zero for a root).
    pub fn depth(&self, id: LabelId) -> usize {
        self.nodes.get(id.index()).map_or(0, |n| n.depth)
    }

    /// Iterates over the ancestors of a label, nearest first.
    pub fn ancestors(&self, id: LabelId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.broader_of(id),
        }
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `label`.
    pub fn is_ancestor(&self, ancestor: LabelId, label: LabelId) -> bool {
        self.ancestors(label).any(|a| a == ancestor)
    }

    /// Iterates over all labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = (LabelId, &str)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (LabelId::from_index(i), n.name.as_str()))
    }

    /// Returns the labels relevant to a usage: the usage's own label and all
    /// of its ancestors.
    ///
    /// Returns `None` if the usage is not a known label; how to treat such a
    /// usage is up to the caller.
    pub fn closure_for(&self, usage: &str) -> Option<Closure> {
        self.closure_for_all([usage])
    }

    /// Returns the union of the closures of several usage labels, for a use
    /// that falls under more than one category.
    ///
    /// Returns `None` if no usage is given or any of them is unknown.
    pub fn closure_for_all<I, S>(&self, usages: I) -> Option<Closure>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for usage in usages {
            let id = self.id(usage.as_ref())?;
            set.insert(id);
            set.extend(self.ancestors(id));
        }
        if set.is_empty() {
            return None;
        }
        let mut labels: Vec<_> = set.into_iter().collect();
        labels.sort_by_key(|&id| (self.depth(id), id));
        Some(Closure { labels })
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Iterator over the ancestors of a label, see [`Hierarchy::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'h> {
    hierarchy: &'h Hierarchy,
    next: Option<LabelId>,
}

impl Iterator for Ancestors<'_> {
    type Item = LabelId;

    fn next(&mut self) -> Option<LabelId> {
        let current = self.next?;
        self.next = self.hierarchy.broader_of(current);
        Some(current)
    }
}

/// The labels that apply to a usage, ordered from most general to most
/// specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    labels: Vec<LabelId>,
}

impl Closure {
    /// Returns the labels, most general first.
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }

    /// Returns `true` if `id` is part of this closure.
    pub fn contains(&self, id: LabelId) -> bool {
        self.labels.contains(&id)
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the closure holds no label.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the closure as an interest filter for the parser.
    pub fn interest(&self) -> LabelSet {
        self.labels.iter().copied().collect()
    }
}

/// An unordered set of labels, used to restrict parsing to the labels a
/// caller cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    members: BTreeSet<LabelId>,
}

impl LabelSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label.
    pub fn insert(&mut self, id: LabelId) -> bool {
        self.members.insert(id)
    }

    /// Returns `true` if `id` is in the set.
    pub fn contains(&self, id: LabelId) -> bool {
        self.members.contains(&id)
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the set holds no label.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<LabelId> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// Collects label declarations and validates them into a [`Hierarchy`].
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    decls: Vec<(String, Option<String>)>,
}

impl HierarchyBuilder {
    /// Declares a label with no broader label.
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.decls.push((name.into(), None));
        self
    }

    /// Declares a label that narrows `broader`.
    ///
    /// `broader` may be declared before or after this call.
    pub fn narrows(mut self, name: impl Into<String>, broader: impl Into<String>) -> Self {
        self.decls.push((name.into(), Some(broader.into())));
        self
    }

    /// Validates the declarations and builds the hierarchy.
    pub fn build(self) -> Result<Hierarchy, ConfigurationError> {
        let mut by_name = HashMap::with_capacity(self.decls.len());
        for (i, (name, _)) in self.decls.iter().enumerate() {
            validate_name(name)?;
            if by_name
                .insert(name.as_bytes().to_vec(), LabelId::from_index(i))
                .is_some()
            {
                return Err(ConfigurationError::DuplicateLabel(name.clone()));
            }
        }

        let mut nodes = Vec::with_capacity(self.decls.len());
        for (name, broader) in self.decls {
            let broader = match broader {
                Some(b) => match by_name.get(b.as_bytes()) {
                    Some(&id) => Some(id),
                    None => {
                        return Err(ConfigurationError::UnknownBroader {
                            label: name,
                            broader: b,
                        });
                    }
                },
                None => None,
            };
            nodes.push(Node {
                name,
                broader,
                depth: 0,
            });
        }

        // With a single parent per label, any chain longer than the number of
        // labels has entered a cycle, and the label reached at that point is
        // on it.
        for i in 0..nodes.len() {
            let mut depth = 0;
            let mut cursor = nodes[i].broader;
            while let Some(parent) = cursor {
                depth += 1;
                if depth > nodes.len() {
                    return Err(ConfigurationError::Cycle(
                        nodes[parent.index()].name.clone(),
                    ));
                }
                cursor = nodes[parent.index()].broader;
            }
            nodes[i].depth = depth;
        }

        Ok(Hierarchy { nodes, by_name })
    }
}

fn validate_name(name: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: &'static str| ConfigurationError::InvalidLabel {
        label: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(ConfigurationError::EmptyLabel);
    }
    if name.contains(',') {
        return Err(invalid("contains a comma"));
    }
    if name.contains('=') {
        return Err(invalid("contains an equals sign"));
    }
    if name.starts_with([' ', '\t']) || name.ends_with([' ', '\t']) {
        return Err(invalid("has leading or trailing whitespace"));
    }
    Ok(())
}
