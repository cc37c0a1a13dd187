use std::sync::Arc;

use prose_engine::{
    base_keymap, history, input_rules, keymap, HistoryConfig, HistoryHandle, Plugin,
};

use crate::extension::{Extension, ExtensionError};
use crate::menu::menu_plugin;

/// The builtin plugin set: history recording, the base editing keymap, and
/// undo/redo bindings on Mod-z / Mod-y.
pub fn default_plugins(history: &HistoryHandle) -> Vec<Plugin> {
    vec![
        history.plugin(),
        base_keymap(),
        keymap(
            "keymap:history",
            vec![
                ("Mod-z".to_string(), history.undo_command()),
                ("Mod-y".to_string(), history.redo_command()),
            ],
        ),
    ]
}

/// Builds the full pipeline, in order: defaults, the caller's plugins
/// verbatim, one keymap plugin per extension that has bindings, one toolbar
/// plugin when any extension contributes menu entries, and the single
/// merged input-rule plugin, which is appended even when no rules exist.
pub fn assemble_plugins(
    extensions: &[Arc<dyn Extension>],
    caller_plugins: Vec<Plugin>,
) -> Result<Vec<Plugin>, ExtensionError> {
    let handle = history(HistoryConfig::default());
    let mut plugins = default_plugins(&handle);
    plugins.extend(caller_plugins);
    for ext in extensions {
        let bindings = ext.keymap()?;
        if bindings.is_empty() {
            continue;
        }
        plugins.push(keymap(format!("keymap:{}", ext.name()), bindings));
    }
    let mut entries = Vec::new();
    for ext in extensions {
        entries.extend(ext.menu()?);
    }
    if !entries.is_empty() {
        plugins.push(menu_plugin(entries));
    }
    let mut rules = Vec::new();
    for ext in extensions {
        rules.extend(ext.input_rules()?);
    }
    plugins.push(input_rules(rules));
    log::debug!(
        "assembled {} plugins from {} extensions",
        plugins.len(),
        extensions.len()
    );
    Ok(plugins)
}
