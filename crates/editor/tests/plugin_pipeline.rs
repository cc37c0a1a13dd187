use std::sync::Arc;

use prose_engine::{MarkSpec, Plugin};
use simple_prose::{
    assemble_plugins, assemble_schema, EmphasisExtension, Extension, ExtensionError,
    ExtensionType, SchemaDefaults, SchemaSlot, StrongExtension,
};

struct BareMarkExt {
    slot: SchemaSlot,
}

impl BareMarkExt {
    fn new() -> BareMarkExt {
        BareMarkExt {
            slot: SchemaSlot::new(),
        }
    }
}

impl Extension for BareMarkExt {
    fn name(&self) -> &str {
        "Plain"
    }

    fn types(&self) -> Vec<ExtensionType> {
        vec![ExtensionType::Mark]
    }

    fn schema_slot(&self) -> &SchemaSlot {
        &self.slot
    }

    fn mark_spec(&self) -> Option<MarkSpec> {
        Some(MarkSpec {
            tag: "span".to_string(),
            markdown: None,
        })
    }
}

fn names(plugins: &[Plugin]) -> Vec<&str> {
    plugins.iter().map(|p| p.name()).collect()
}

#[test]
fn the_pipeline_orders_defaults_callers_and_extensions() {
    let extensions: Vec<Arc<dyn Extension>> = vec![
        Arc::new(StrongExtension::new()),
        Arc::new(EmphasisExtension::new()),
    ];
    assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    let caller = vec![Plugin::new("caller:extra")];
    let plugins = assemble_plugins(&extensions, caller).unwrap();

    assert_eq!(
        names(&plugins),
        vec![
            "history",
            "keymap:base",
            "keymap:history",
            "caller:extra",
            "keymap:Strong",
            "keymap:Emphasis",
            "menu",
            "input_rules",
        ]
    );
}

#[test]
fn a_contribution_free_extension_adds_no_plugins() {
    let extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(BareMarkExt::new())];
    assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    let plugins = assemble_plugins(&extensions, Vec::new()).unwrap();
    assert_eq!(
        names(&plugins),
        vec!["history", "keymap:base", "keymap:history", "input_rules"]
    );

    // The merged rule plugin is appended even when no extension has rules.
    let last = plugins.last().unwrap();
    assert_eq!(last.input_rules().unwrap().len(), 0);
}

#[test]
fn extension_keymaps_carry_their_bindings() {
    let extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(StrongExtension::new())];
    assemble_schema(&extensions, &SchemaDefaults::default()).unwrap();

    let plugins = assemble_plugins(&extensions, Vec::new()).unwrap();
    let strong = plugins
        .iter()
        .find(|p| p.name() == "keymap:Strong")
        .unwrap();
    let keys: Vec<&str> = strong
        .keymap()
        .unwrap()
        .iter()
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(keys, vec!["Mod-b", "Mod-B"]);
}

#[test]
fn assembly_fails_for_unbound_extensions() {
    let extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(StrongExtension::new())];
    let err = assemble_plugins(&extensions, Vec::new()).unwrap_err();
    assert!(matches!(err, ExtensionError::UnboundSchema(name) if name == "Strong"));
}
