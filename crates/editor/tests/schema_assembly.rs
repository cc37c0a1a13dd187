use std::sync::Arc;

use prose_engine::{ChildConstraint, MarkConstraint, MarkSpec, NodeRole, NodeSpec};
use simple_prose::{
    assemble_schema, EmphasisExtension, Extension, ExtensionError, ExtensionType, SchemaDefaults,
    SchemaError, SchemaSlot, StrongExtension,
};

struct SpecExt {
    name: &'static str,
    types: Vec<ExtensionType>,
    node: Option<NodeSpec>,
    mark: Option<MarkSpec>,
    slot: SchemaSlot,
}

impl SpecExt {
    fn mark(name: &'static str) -> SpecExt {
        SpecExt {
            name,
            types: vec![ExtensionType::Mark],
            node: None,
            mark: Some(MarkSpec {
                tag: "span".to_string(),
                markdown: None,
            }),
            slot: SchemaSlot::new(),
        }
    }

    fn node(name: &'static str) -> SpecExt {
        SpecExt {
            name,
            types: vec![ExtensionType::Node],
            node: Some(NodeSpec {
                role: NodeRole::Block,
                children: ChildConstraint::InlineOnly,
                marks: MarkConstraint::All,
                tag: Some("div".to_string()),
            }),
            mark: None,
            slot: SchemaSlot::new(),
        }
    }
}

impl Extension for SpecExt {
    fn name(&self) -> &str {
        self.name
    }

    fn types(&self) -> Vec<ExtensionType> {
        self.types.clone()
    }

    fn schema_slot(&self) -> &SchemaSlot {
        &self.slot
    }

    fn mark_spec(&self) -> Option<MarkSpec> {
        self.mark.clone()
    }

    fn node_spec(&self) -> Option<NodeSpec> {
        self.node.clone()
    }
}

#[test]
fn extensions_assemble_next_to_the_builtin_specs() {
    let extensions: Vec<Arc<dyn Extension>> = vec![
        Arc::new(StrongExtension::new()),
        Arc::new(EmphasisExtension::new()),
    ];
    let schema = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    let nodes: Vec<&str> = schema.nodes().iter().map(|n| n.name()).collect();
    assert_eq!(nodes, vec!["doc", "paragraph", "text"]);
    let marks: Vec<&str> = schema.marks().iter().map(|m| m.name()).collect();
    assert_eq!(marks, vec!["Strong", "Emphasis"]);
    assert_eq!(schema.top_node().unwrap().name(), "doc");
    assert_eq!(schema.default_block().unwrap().name(), "paragraph");
}

#[test]
fn binding_fills_the_extension_backrefs() {
    let strong = Arc::new(StrongExtension::new());
    assert!(matches!(
        strong.mark_type(),
        Err(ExtensionError::UnboundSchema(_))
    ));
    assert!(!strong.schema_slot().is_bound());

    let extensions: Vec<Arc<dyn Extension>> = vec![strong.clone()];
    assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    assert!(strong.schema_slot().is_bound());
    let mark = strong.mark_type().unwrap();
    assert_eq!(mark.name(), "Strong");
    assert_eq!(mark.spec().tag, "strong");
}

#[test]
fn node_extensions_register_their_specs() {
    let callout = Arc::new(SpecExt::node("callout"));
    let extensions: Vec<Arc<dyn Extension>> = vec![callout.clone()];
    let schema = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    let ty = schema.node("callout").unwrap();
    assert_eq!(ty.spec().tag.as_deref(), Some("div"));
    assert_eq!(callout.node_type().unwrap().name(), "callout");
}

#[test]
fn rebinding_an_extension_fails() {
    let strong = Arc::new(StrongExtension::new());
    let extensions: Vec<Arc<dyn Extension>> = vec![strong];
    assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();
    let err = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap_err();
    assert!(matches!(err, SchemaError::AlreadyBound(name) if name == "Strong"));
}

#[test]
fn duplicate_mark_names_collide() {
    let extensions: Vec<Arc<dyn Extension>> =
        vec![Arc::new(SpecExt::mark("Width")), Arc::new(SpecExt::mark("Width"))];
    let err = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateMarkName(name) if name == "Width"));
}

#[test]
fn node_names_collide_with_builtins() {
    let extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(SpecExt::node("paragraph"))];
    let err = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateNodeName(name) if name == "paragraph"));
}

#[test]
fn the_collision_error_names_the_occupied_namespace() {
    // A node extension reusing a mark name is reported as a mark collision,
    // and the other way around.
    let extensions: Vec<Arc<dyn Extension>> =
        vec![Arc::new(SpecExt::mark("Width")), Arc::new(SpecExt::node("Width"))];
    let err = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateMarkName(name) if name == "Width"));

    let extensions: Vec<Arc<dyn Extension>> =
        vec![Arc::new(SpecExt::node("Depth")), Arc::new(SpecExt::mark("Depth"))];
    let err = assemble_schema(&extensions, &SchemaDefaults::default()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateNodeName(name) if name == "Depth"));
}

#[test]
fn nothing_binds_when_collection_fails() {
    let strong = Arc::new(StrongExtension::new());
    let extensions: Vec<Arc<dyn Extension>> =
        vec![strong.clone(), Arc::new(SpecExt::node("paragraph"))];
    assert!(assemble_schema(&extensions, &SchemaDefaults::default()).is_err());
    assert!(!strong.schema_slot().is_bound());
}
