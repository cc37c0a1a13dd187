use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub type Attrs = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Doc,
    Block,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildConstraint {
    None,
    BlockOnly,
    InlineOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkConstraint {
    All,
    None,
    Only(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub role: NodeRole,
    pub children: ChildConstraint,
    #[serde(default = "MarkConstraint::default_all")]
    pub marks: MarkConstraint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl MarkConstraint {
    fn default_all() -> MarkConstraint {
        MarkConstraint::All
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

/// Ordered collection of named node and mark specs. Registration order is
/// meaningful: it decides the top node, the default block, and mark rank.
#[derive(Debug, Clone, Default)]
pub struct SchemaSpec {
    nodes: Vec<(String, NodeSpec)>,
    marks: Vec<(String, MarkSpec)>,
}

impl SchemaSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, spec: NodeSpec) {
        self.nodes.push((name.into(), spec));
    }

    pub fn add_mark(&mut self, name: impl Into<String>, spec: MarkSpec) {
        self.marks.push((name.into(), spec));
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|(n, _)| n == name)
    }

    pub fn contains_mark(&self, name: &str) -> bool {
        self.marks.iter().any(|(n, _)| n == name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(n, _)| n.as_str())
    }

    pub fn mark_names(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().map(|(n, _)| n.as_str())
    }
}

#[derive(Debug)]
struct NodeTypeInner {
    name: String,
    spec: NodeSpec,
}

#[derive(Debug, Clone)]
pub struct NodeType {
    inner: Arc<NodeTypeInner>,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.inner.spec
    }

    pub fn inline_content(&self) -> bool {
        self.inner.spec.children == ChildConstraint::InlineOnly
    }

    pub fn allows_mark(&self, mark: &MarkType) -> bool {
        match &self.inner.spec.marks {
            MarkConstraint::All => true,
            MarkConstraint::None => false,
            MarkConstraint::Only(names) => names.iter().any(|n| n == mark.name()),
        }
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

#[derive(Debug)]
struct MarkTypeInner {
    name: String,
    spec: MarkSpec,
}

#[derive(Debug, Clone)]
pub struct MarkType {
    inner: Arc<MarkTypeInner>,
}

impl MarkType {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn spec(&self) -> &MarkSpec {
        &self.inner.spec
    }

    pub fn create(&self, attrs: Option<Attrs>) -> Mark {
        Mark {
            name: self.inner.name.clone(),
            attrs: attrs.unwrap_or_default(),
        }
    }
}

impl PartialEq for MarkType {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub name: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Mark {
            name: name.into(),
            attrs: Attrs::default(),
        }
    }
}

struct SchemaInner {
    nodes: Vec<NodeType>,
    marks: Vec<MarkType>,
    node_index: HashMap<String, usize>,
    mark_index: HashMap<String, usize>,
}

/// Immutable type registry. Built exactly once from a `SchemaSpec`; every
/// clone shares the same inner tables.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    pub fn new(spec: SchemaSpec) -> Schema {
        let mut nodes = Vec::with_capacity(spec.nodes.len());
        let mut node_index = HashMap::new();
        for (name, node_spec) in spec.nodes {
            node_index.insert(name.clone(), nodes.len());
            nodes.push(NodeType {
                inner: Arc::new(NodeTypeInner {
                    name,
                    spec: node_spec,
                }),
            });
        }
        let mut marks = Vec::with_capacity(spec.marks.len());
        let mut mark_index = HashMap::new();
        for (name, mark_spec) in spec.marks {
            mark_index.insert(name.clone(), marks.len());
            marks.push(MarkType {
                inner: Arc::new(MarkTypeInner {
                    name,
                    spec: mark_spec,
                }),
            });
        }
        log::debug!(
            "schema built: {} node types, {} mark types",
            nodes.len(),
            marks.len()
        );
        Schema {
            inner: Arc::new(SchemaInner {
                nodes,
                marks,
                node_index,
                mark_index,
            }),
        }
    }

    pub fn node(&self, name: &str) -> Option<NodeType> {
        let ix = *self.inner.node_index.get(name)?;
        Some(self.inner.nodes[ix].clone())
    }

    pub fn mark(&self, name: &str) -> Option<MarkType> {
        let ix = *self.inner.mark_index.get(name)?;
        Some(self.inner.marks[ix].clone())
    }

    pub fn nodes(&self) -> &[NodeType] {
        &self.inner.nodes
    }

    pub fn marks(&self) -> &[MarkType] {
        &self.inner.marks
    }

    /// The root node type: the first registered `Doc`-role node, falling back
    /// to the first registered node.
    pub fn top_node(&self) -> Option<NodeType> {
        self.inner
            .nodes
            .iter()
            .find(|n| n.spec().role == NodeRole::Doc)
            .or_else(|| self.inner.nodes.first())
            .cloned()
    }

    /// The first registered `Block`-role node, used to seed empty documents.
    pub fn default_block(&self) -> Option<NodeType> {
        self.inner
            .nodes
            .iter()
            .find(|n| n.spec().role == NodeRole::Block)
            .cloned()
    }

    fn mark_rank(&self, name: &str) -> usize {
        match self.inner.mark_index.get(name) {
            Some(ix) => *ix,
            None => usize::MAX,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("nodes", &self.inner.nodes.len())
            .field("marks", &self.inner.marks.len())
            .finish()
    }
}

/// Inserts `mark` into a rank-sorted mark set. A mark of the same name is
/// replaced in place, so toggling attrs never duplicates an entry.
pub fn add_to_set(schema: &Schema, mark: Mark, set: &[Mark]) -> Vec<Mark> {
    let mut out = Vec::with_capacity(set.len() + 1);
    let rank = schema.mark_rank(&mark.name);
    let mut placed = false;
    for existing in set {
        if existing.name == mark.name {
            if !placed {
                out.push(mark.clone());
                placed = true;
            }
            continue;
        }
        if !placed && schema.mark_rank(&existing.name) > rank {
            out.push(mark.clone());
            placed = true;
        }
        out.push(existing.clone());
    }
    if !placed {
        out.push(mark);
    }
    out
}

pub fn remove_from_set(set: &[Mark], name: &str) -> Vec<Mark> {
    set.iter().filter(|m| m.name != name).cloned().collect()
}

pub fn is_in_set(set: &[Mark], name: &str) -> bool {
    set.iter().any(|m| m.name == name)
}
