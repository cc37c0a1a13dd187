use std::sync::Arc;

use thiserror::Error;

use prose_engine::{
    ChildConstraint, MarkConstraint, MarkSpec, NodeRole, NodeSpec, Schema, SchemaSpec,
};

use crate::extension::{Extension, ExtensionType};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate node type name {0:?}")]
    DuplicateNodeName(String),
    #[error("duplicate mark type name {0:?}")]
    DuplicateMarkName(String),
    #[error("extension {0:?} is already bound to a schema")]
    AlreadyBound(String),
}

/// The baseline document shape: a root holding blocks, a paragraph, and the
/// inline text leaf.
pub fn default_node_specs() -> Vec<(String, NodeSpec)> {
    vec![
        (
            "doc".to_string(),
            NodeSpec {
                role: NodeRole::Doc,
                children: ChildConstraint::BlockOnly,
                marks: MarkConstraint::All,
                tag: None,
            },
        ),
        (
            "paragraph".to_string(),
            NodeSpec {
                role: NodeRole::Block,
                children: ChildConstraint::InlineOnly,
                marks: MarkConstraint::All,
                tag: Some("p".to_string()),
            },
        ),
        (
            "text".to_string(),
            NodeSpec {
                role: NodeRole::Inline,
                children: ChildConstraint::None,
                marks: MarkConstraint::All,
                tag: None,
            },
        ),
    ]
}

pub fn default_mark_specs() -> Vec<(String, MarkSpec)> {
    Vec::new()
}

/// The specs every schema starts from, ahead of any extension.
pub struct SchemaDefaults {
    pub nodes: Vec<(String, NodeSpec)>,
    pub marks: Vec<(String, MarkSpec)>,
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        SchemaDefaults {
            nodes: default_node_specs(),
            marks: default_mark_specs(),
        }
    }
}

/// Folds the default specs and every extension's declarations into one
/// spec. An extension's name is checked against both namespaces no matter
/// which capability it declares, and the first collision rejects the whole
/// batch.
pub fn collect_specs(
    extensions: &[Arc<dyn Extension>],
    defaults: &SchemaDefaults,
) -> Result<SchemaSpec, SchemaError> {
    let mut spec = SchemaSpec::new();
    for (name, node) in &defaults.nodes {
        spec.add_node(name.clone(), node.clone());
    }
    for (name, mark) in &defaults.marks {
        spec.add_mark(name.clone(), mark.clone());
    }
    for ext in extensions {
        let name = ext.name();
        if spec.contains_node(name) {
            return Err(SchemaError::DuplicateNodeName(name.to_string()));
        }
        if spec.contains_mark(name) {
            return Err(SchemaError::DuplicateMarkName(name.to_string()));
        }
        let types = ext.types();
        if types.contains(&ExtensionType::Node) {
            if let Some(node) = ext.node_spec() {
                spec.add_node(name, node);
            }
        }
        if types.contains(&ExtensionType::Mark) {
            if let Some(mark) = ext.mark_spec() {
                spec.add_mark(name, mark);
            }
        }
    }
    Ok(spec)
}

pub fn build_schema(spec: SchemaSpec) -> Schema {
    Schema::new(spec)
}

/// Hands every extension its schema back-reference. Binding an extension a
/// second time is refused rather than silently rebound.
pub fn bind_schema(extensions: &[Arc<dyn Extension>], schema: &Schema) -> Result<(), SchemaError> {
    for ext in extensions {
        if !ext.schema_slot().bind(schema.clone()) {
            return Err(SchemaError::AlreadyBound(ext.name().to_string()));
        }
    }
    Ok(())
}

/// Collect, build, bind. Nothing is constructed when any phase fails.
pub fn assemble_schema(
    extensions: &[Arc<dyn Extension>],
    defaults: &SchemaDefaults,
) -> Result<Schema, SchemaError> {
    let spec = collect_specs(extensions, defaults)?;
    let schema = build_schema(spec);
    bind_schema(extensions, &schema)?;
    log::debug!("assembled schema from {} extensions", extensions.len());
    Ok(schema)
}
